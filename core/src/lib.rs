//! Retention offer policy for the customer-retention assistant.
//!
//! The conversational agent asks the churn lookup for a ChurnReport,
//! then asks the OfferPolicy what to put in front of the customer.
//! Everything here is synchronous and free of network I/O; the only
//! database is the local customer store read by the churn lookup.

pub mod churn_report;
pub mod config;
pub mod customer;
pub mod error;
pub mod memory;
pub mod offer;
pub mod offer_policy;
pub mod risk;
pub mod rng;
pub mod store;
pub mod types;

pub use churn_report::ChurnReport;
pub use customer::{ChurnAnalysis, ContractType, CustomerProfile, CustomerRecord};
pub use error::{PolicyError, PolicyResult, RetentionError, RetentionResult};
pub use offer::{Offer, OfferDecision, OfferType, Priority, ServiceAddon};
pub use offer_policy::{generate_offers, OfferPolicy};
pub use risk::{RiskTier, Urgency};
pub use rng::OfferRng;
pub use store::CustomerStore;
