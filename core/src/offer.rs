//! Retention offers and the decision record that carries them.
//!
//! An Offer is a value object: the policy engine builds it, annotates
//! it once with urgency, and hands it out. Nothing outside this crate
//! can change an offer after that; read it through the accessors.

use crate::{
    risk::{RiskTier, Urgency},
    types::{CustomerId, Percent, RiskScore},
};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const LIMITED_TIME_SUFFIX: &str = " - Limited time offer!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferType {
    DiscountCoupon,
    ContractDiscount,
    ServiceUpgrade,
}

impl OfferType {
    pub fn is_discount(&self) -> bool {
        matches!(self, Self::DiscountCoupon | Self::ContractDiscount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceAddon {
    OnlineSecurity,
    TechSupport,
    StreamingTv,
}

impl ServiceAddon {
    pub fn key(&self) -> &'static str {
        match self {
            Self::OnlineSecurity => "online_security",
            Self::TechSupport => "tech_support",
            Self::StreamingTv => "streaming_tv",
        }
    }

    /// Redemption code: "FREE" + the first six characters of the
    /// upper-cased service key.
    pub fn code(&self) -> String {
        let upper = self.key().to_ascii_uppercase();
        format!("FREE{}", &upper[..upper.len().min(6)])
    }
}

/// A free add-on trial in the fixed upgrade catalog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceCatalogEntry {
    pub service:       ServiceAddon,
    pub title:         &'static str,
    pub description:   &'static str,
    pub value:         f64,
    pub validity_days: u32,
}

pub static SERVICE_CATALOG: [ServiceCatalogEntry; 3] = [
    ServiceCatalogEntry {
        service:       ServiceAddon::OnlineSecurity,
        title:         "Free Online Security",
        description:   "3 months free online security add-on",
        value:         15.0,
        validity_days: 90,
    },
    ServiceCatalogEntry {
        service:       ServiceAddon::TechSupport,
        title:         "Free Premium Tech Support",
        description:   "6 months free premium tech support",
        value:         20.0,
        validity_days: 180,
    },
    ServiceCatalogEntry {
        service:       ServiceAddon::StreamingTv,
        title:         "Free Streaming TV",
        description:   "2 months free streaming TV service",
        value:         25.0,
        validity_days: 60,
    },
];

/// What the customer actually gets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OfferTerms {
    Discount {
        discount_percentage: Percent,
    },
    Service {
        service:       ServiceAddon,
        service_value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    offer_type:    OfferType,
    code:          String,
    title:         String,
    description:   String,
    #[serde(flatten)]
    terms:         OfferTerms,
    validity_days: u32,
    priority:      Priority,
    urgency:       Urgency,
}

impl Offer {
    pub(crate) fn discount(
        offer_type: OfferType,
        code: String,
        title: String,
        description: String,
        discount_percentage: Percent,
        validity_days: u32,
        priority: Priority,
    ) -> Self {
        Self {
            offer_type,
            code,
            title,
            description,
            terms: OfferTerms::Discount { discount_percentage },
            validity_days,
            priority,
            urgency: Urgency::Normal,
        }
    }

    pub(crate) fn service_upgrade(entry: &ServiceCatalogEntry) -> Self {
        Self {
            offer_type:    OfferType::ServiceUpgrade,
            code:          entry.service.code(),
            title:         entry.title.to_string(),
            description:   entry.description.to_string(),
            terms:         OfferTerms::Service {
                service:       entry.service,
                service_value: entry.value,
            },
            validity_days: entry.validity_days,
            priority:      Priority::Medium,
            urgency:       Urgency::Normal,
        }
    }

    /// Final step before an offer leaves the engine.
    pub(crate) fn with_urgency(mut self, urgency: Urgency) -> Self {
        if urgency == Urgency::Immediate {
            self.description.push_str(LIMITED_TIME_SUFFIX);
        }
        self.urgency = urgency;
        self
    }

    pub fn offer_type(&self) -> OfferType { self.offer_type }
    pub fn code(&self) -> &str { &self.code }
    pub fn title(&self) -> &str { &self.title }
    pub fn description(&self) -> &str { &self.description }
    pub fn terms(&self) -> &OfferTerms { &self.terms }
    pub fn validity_days(&self) -> u32 { self.validity_days }
    pub fn priority(&self) -> Priority { self.priority }
    pub fn urgency(&self) -> Urgency { self.urgency }

    pub fn discount_percentage(&self) -> Option<Percent> {
        match self.terms {
            OfferTerms::Discount { discount_percentage } => Some(discount_percentage),
            OfferTerms::Service { .. } => None,
        }
    }

    pub fn service(&self) -> Option<ServiceAddon> {
        match self.terms {
            OfferTerms::Service { service, .. } => Some(service),
            OfferTerms::Discount { .. } => None,
        }
    }

    pub fn service_value(&self) -> Option<f64> {
        match self.terms {
            OfferTerms::Service { service_value, .. } => Some(service_value),
            OfferTerms::Discount { .. } => None,
        }
    }

    /// Last calendar day the offer can be redeemed when issued on
    /// `issued_on`. Saturates at the far end of the calendar.
    pub fn expires_on(&self, issued_on: NaiveDate) -> NaiveDate {
        issued_on
            .checked_add_days(Days::new(u64::from(self.validity_days)))
            .unwrap_or(NaiveDate::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferDecision {
    pub decision_id:        Uuid,
    pub customer_id:        CustomerId,
    pub risk_tier:          RiskTier,
    pub risk_score:         RiskScore,
    pub offers:             Vec<Offer>,
    pub recommended_action: String,
    pub strategy:           String,
}

impl OfferDecision {
    pub fn total_offers(&self) -> usize {
        self.offers.len()
    }
}
