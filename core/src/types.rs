//! Shared primitive types used across the crate.

/// Identifier of a customer as issued by the billing system.
pub type CustomerId = String;

/// A churn probability in [0.0, 1.0].
pub type RiskScore = f64;

/// Whole percentage points, e.g. 25 for 25%.
pub type Percent = u32;
