//! Customer-side decision inputs: the profile snapshot, the churn
//! analysis, and the raw record the churn lookup reads them from.

use crate::{
    error::{PolicyError, PolicyResult},
    risk::RiskTier,
    types::{CustomerId, RiskScore},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    #[serde(alias = "Month-to-month")]
    MonthToMonth,
    #[serde(alias = "One year")]
    OneYear,
    #[serde(alias = "Two year")]
    TwoYear,
}

impl ContractType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MonthToMonth => "month_to_month",
            Self::OneYear => "one_year",
            Self::TwoYear => "two_year",
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractType {
    type Err = String;

    /// Accepts both the snake_case form and the billing-export labels
    /// ("Month-to-month", "One year", "Two year").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "month_to_month" => Ok(Self::MonthToMonth),
            "one_year" => Ok(Self::OneYear),
            "two_year" => Ok(Self::TwoYear),
            _ => Err(format!("unknown contract type '{s}'")),
        }
    }
}

/// Subscribed services as exported by billing ("Yes", "No",
/// "No internet service", or an internet kind such as "Fiber optic").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceFlags {
    pub phone_service:    String,
    pub internet_service: String,
    pub online_security:  String,
    pub tech_support:     String,
    pub streaming_tv:     String,
    pub streaming_movies: String,
}

/// Immutable snapshot used only as decision input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub monthly_charges: f64,
    pub tenure_months:   u32,
    pub contract_type:   ContractType,
    #[serde(default)]
    pub total_charges:     f64,
    #[serde(default)]
    pub payment_method:    String,
    #[serde(default)]
    pub paperless_billing: bool,
    #[serde(default)]
    pub services:          ServiceFlags,
}

impl CustomerProfile {
    pub fn new(monthly_charges: f64, tenure_months: u32, contract_type: ContractType) -> Self {
        Self {
            monthly_charges,
            tenure_months,
            contract_type,
            total_charges: 0.0,
            payment_method: String::new(),
            paperless_billing: false,
            services: ServiceFlags::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnAnalysis {
    pub risk_score:    RiskScore,
    pub risk_tier:     RiskTier,
    pub cancel_intent: bool,
    #[serde(default)]
    pub churned:       bool,
}

impl ChurnAnalysis {
    /// Build an analysis whose tier is derived from the score.
    pub fn from_score(risk_score: RiskScore, cancel_intent: bool) -> Self {
        Self {
            risk_score,
            risk_tier: RiskTier::from_score(risk_score),
            cancel_intent,
            churned: false,
        }
    }

    /// An analysis is usable when its score is a probability and its
    /// tier is the one the classifier assigns to that score.
    pub fn validate(&self) -> PolicyResult<()> {
        if !self.risk_score.is_finite() || !(0.0..=1.0).contains(&self.risk_score) {
            return Err(PolicyError::MissingChurnData {
                reason: format!("risk_score {} is outside [0, 1]", self.risk_score),
            });
        }
        let expected = RiskTier::from_score(self.risk_score);
        if self.risk_tier != expected {
            return Err(PolicyError::MissingChurnData {
                reason: format!(
                    "risk_tier {} disagrees with risk_score {} (expected {expected})",
                    self.risk_tier, self.risk_score
                ),
            });
        }
        Ok(())
    }
}

/// One row of the customer analytics view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub customer_id:       CustomerId,
    pub gender:            String,
    pub senior_citizen:    bool,
    pub partner:           bool,
    pub dependents:        bool,
    pub tenure_months:     u32,
    pub phone_service:     String,
    pub multiple_lines:    String,
    pub internet_service:  String,
    pub online_security:   String,
    pub online_backup:     String,
    pub device_protection: String,
    pub tech_support:      String,
    pub streaming_tv:      String,
    pub streaming_movies:  String,
    pub paperless_billing: bool,
    pub payment_method:    String,
    pub monthly_charges:   f64,
    pub total_charges:     f64,
    pub churned:           bool,
    pub contract:          String,
    pub status:            String, // active | suspended | cancelled
    pub churn_risk_score:  RiskScore,
    pub cancel_intent:     bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_type_parses_export_labels() {
        assert_eq!("Month-to-month".parse::<ContractType>(), Ok(ContractType::MonthToMonth));
        assert_eq!("One year".parse::<ContractType>(), Ok(ContractType::OneYear));
        assert_eq!("two_year".parse::<ContractType>(), Ok(ContractType::TwoYear));
        assert!("weekly".parse::<ContractType>().is_err());
    }

    #[test]
    fn contract_type_deserializes_both_spellings() {
        let a: ContractType = serde_json::from_str("\"Month-to-month\"").unwrap();
        let b: ContractType = serde_json::from_str("\"month_to_month\"").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn validate_rejects_out_of_range_and_mismatched_tier() {
        assert!(ChurnAnalysis::from_score(0.5, false).validate().is_ok());

        let nan = ChurnAnalysis::from_score(f64::NAN, false);
        assert!(matches!(nan.validate(), Err(PolicyError::MissingChurnData { .. })));

        let too_big = ChurnAnalysis::from_score(1.2, false);
        assert!(matches!(too_big.validate(), Err(PolicyError::MissingChurnData { .. })));

        let mut mismatched = ChurnAnalysis::from_score(0.9, true);
        mismatched.risk_tier = RiskTier::Low;
        assert!(matches!(mismatched.validate(), Err(PolicyError::MissingChurnData { .. })));
    }
}
