//! Risk-tier classification and urgency bands.
//!
//! The tier thresholds are a frozen contract with the churn lookup:
//! the offer policy branches on the tier, never on the raw score.
//! Urgency is the one exception and reads the raw score against its
//! own, different thresholds.

use crate::types::RiskScore;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const RISK_TIER_HIGH: RiskScore = 0.7;
pub const RISK_TIER_MEDIUM: RiskScore = 0.4;

pub const URGENCY_IMMEDIATE_ABOVE: RiskScore = 0.8;
pub const URGENCY_HIGH_ABOVE: RiskScore = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// Lower bounds are inclusive: 0.7 is HIGH, 0.4 is MEDIUM.
    pub fn from_score(score: RiskScore) -> Self {
        if score >= RISK_TIER_HIGH {
            Self::High
        } else if score >= RISK_TIER_MEDIUM {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation urgency, independent of an offer's priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Immediate,
    High,
    Normal,
}

impl Urgency {
    /// Upper bounds are inclusive: 0.8 is HIGH, 0.6 is NORMAL.
    pub fn for_score(score: RiskScore) -> Self {
        if score > URGENCY_IMMEDIATE_ABOVE {
            Self::Immediate
        } else if score > URGENCY_HIGH_ABOVE {
            Self::High
        } else {
            Self::Normal
        }
    }
}
