//! Churn report: what the churn lookup hands to the offer policy.
//!
//! Turns one raw analytics row into:
//!   1. a ChurnAnalysis (score, derived tier, cancel intent)
//!   2. a CustomerProfile snapshot
//!   3. retention insights: the risk factors present on the account and
//!      one talking point per factor that has a standard response

use crate::{
    customer::{ChurnAnalysis, ContractType, CustomerProfile, CustomerRecord, ServiceFlags},
    error::{RetentionError, RetentionResult},
    risk::RiskTier,
    types::CustomerId,
};
use serde::{Deserialize, Serialize};

pub const LOW_TENURE_MONTHS: u32 = 3;
pub const HIGH_CHARGES_ABOVE: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    MonthToMonthContract,
    LowTenure,
    NoOnlineSecurity,
    NoTechSupport,
    HighMonthlyCharges,
}

impl RiskFactor {
    pub fn label(&self) -> &'static str {
        match self {
            Self::MonthToMonthContract => "Month-to-month contract",
            Self::LowTenure => "Low tenure (≤3 months)",
            Self::NoOnlineSecurity => "No online security",
            Self::NoTechSupport => "No tech support",
            Self::HighMonthlyCharges => "High monthly charges",
        }
    }

    /// Missing tech support has no canned response.
    ///
    /// Low tenure does get the onboarding recommendation. Older churn
    /// reports matched the factor by its label text and never emitted it.
    pub fn recommendation(&self) -> Option<&'static str> {
        match self {
            Self::MonthToMonthContract => Some("Offer annual contract discount"),
            Self::LowTenure => Some("Provide onboarding support and welcome offers"),
            Self::NoOnlineSecurity => Some("Promote online security add-on"),
            Self::NoTechSupport => None,
            Self::HighMonthlyCharges => Some("Review service bundle and offer discounts"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetentionInsights {
    pub key_risk_factors: Vec<RiskFactor>,
    pub recommendations:  Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnReport {
    pub customer_id: CustomerId,
    pub analysis:    ChurnAnalysis,
    pub profile:     CustomerProfile,
    #[serde(default)]
    pub insights:    RetentionInsights,
}

impl ChurnReport {
    pub fn from_record(record: &CustomerRecord) -> RetentionResult<Self> {
        let malformed = |reason: String| RetentionError::MalformedRecord {
            customer_id: record.customer_id.clone(),
            reason,
        };

        let contract_type: ContractType = record.contract.parse().map_err(malformed)?;

        let score = record.churn_risk_score;
        if !score.is_finite() || !(0.0..=1.0).contains(&score) {
            return Err(malformed(format!("churn_risk_score {score} is outside [0, 1]")));
        }

        let analysis = ChurnAnalysis {
            risk_score:    score,
            risk_tier:     RiskTier::from_score(score),
            cancel_intent: record.cancel_intent,
            churned:       record.churned,
        };

        let profile = CustomerProfile {
            monthly_charges:   record.monthly_charges,
            tenure_months:     record.tenure_months,
            contract_type,
            total_charges:     record.total_charges,
            payment_method:    record.payment_method.clone(),
            paperless_billing: record.paperless_billing,
            services: ServiceFlags {
                phone_service:    record.phone_service.clone(),
                internet_service: record.internet_service.clone(),
                online_security:  record.online_security.clone(),
                tech_support:     record.tech_support.clone(),
                streaming_tv:     record.streaming_tv.clone(),
                streaming_movies: record.streaming_movies.clone(),
            },
        };

        let insights = insights_for(&profile);
        log::debug!(
            "churn: report for {} (tier={}, factors={})",
            record.customer_id,
            analysis.risk_tier,
            insights.key_risk_factors.len()
        );

        Ok(Self {
            customer_id: record.customer_id.clone(),
            analysis,
            profile,
            insights,
        })
    }
}

/// Risk factors in a fixed order, with their recommendations.
pub fn insights_for(profile: &CustomerProfile) -> RetentionInsights {
    let checks = [
        (RiskFactor::MonthToMonthContract, profile.contract_type == ContractType::MonthToMonth),
        (RiskFactor::LowTenure,            profile.tenure_months <= LOW_TENURE_MONTHS),
        (RiskFactor::NoOnlineSecurity,     profile.services.online_security == "No"),
        (RiskFactor::NoTechSupport,        profile.services.tech_support == "No"),
        (RiskFactor::HighMonthlyCharges,   profile.monthly_charges > HIGH_CHARGES_ABOVE),
    ];

    let key_risk_factors: Vec<RiskFactor> = checks
        .iter()
        .filter(|(_, present)| *present)
        .map(|(factor, _)| *factor)
        .collect();

    let recommendations = key_risk_factors
        .iter()
        .filter_map(|f| f.recommendation())
        .map(str::to_string)
        .collect();

    RetentionInsights { key_risk_factors, recommendations }
}
