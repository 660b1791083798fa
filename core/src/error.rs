use thiserror::Error;

/// Failures of the offer policy engine. The engine performs no I/O,
/// so these are the only two ways a decision can fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Churn data is missing or malformed: {reason}")]
    MissingChurnData { reason: String },
}

pub type PolicyResult<T> = Result<T, PolicyError>;

#[derive(Error, Debug)]
pub enum RetentionError {
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Customer '{customer_id}' not found")]
    CustomerNotFound { customer_id: String },

    #[error("Malformed record for customer '{customer_id}': {reason}")]
    MalformedRecord { customer_id: String, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type RetentionResult<T> = Result<T, RetentionError>;
