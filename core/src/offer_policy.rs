//! Offer policy engine: churn risk in, ranked retention offers out.
//!
//! Decision table (by risk tier):
//!   HIGH    bill discount coupon, plus an annual-contract discount
//!           when the customer is month-to-month
//!   MEDIUM  one bill discount coupon + one service upgrade
//!   LOW     service upgrades from the fixed catalog (at most two)
//!
//! The tier picks the offer categories deterministically; the RNG only
//! picks magnitudes within a band and which catalog entries appear.
//! Urgency is stamped last, from the raw score, on every offer alike.
//!
//! RULES:
//!   - No I/O and no shared state. Callers own the RNG.
//!   - One draw per discount offer: code, title, description and
//!     percentage all quote the same number.

use crate::{
    config::{DiscountBand, PolicyConfig},
    customer::{ChurnAnalysis, ContractType, CustomerProfile},
    error::{PolicyError, PolicyResult},
    offer::{Offer, OfferDecision, OfferType, SERVICE_CATALOG},
    risk::{RiskTier, Urgency},
    rng::OfferRng,
};
use uuid::Builder;

pub const MAX_SERVICE_OFFERS: usize = 2;

pub const ACTION_HIGH: &str =
    "Present discount offers immediately - customer is at high risk of churning";
pub const ACTION_MEDIUM: &str =
    "Present mixed offers - customer shows moderate churn risk";
pub const ACTION_LOW: &str =
    "Present service upgrades - customer is stable but could benefit from additional services";

#[derive(Debug, Clone, Default)]
pub struct OfferPolicy {
    config: PolicyConfig,
}

impl OfferPolicy {
    /// Rejects configs whose bands could not be drawn from.
    pub fn new(config: PolicyConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn standard() -> Self {
        Self { config: PolicyConfig::standard() }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Build the offer set for one customer.
    ///
    /// Fails with `InvalidInput` for a blank customer id and with
    /// `MissingChurnData` when `analysis` is absent or fails
    /// `ChurnAnalysis::validate`.
    pub fn generate_offers(
        &self,
        customer_id: &str,
        profile: &CustomerProfile,
        analysis: Option<&ChurnAnalysis>,
        rng: &mut OfferRng,
    ) -> PolicyResult<OfferDecision> {
        let customer_id = validate_customer_id(customer_id)?;
        let analysis = analysis.ok_or_else(|| PolicyError::MissingChurnData {
            reason: "no churn analysis supplied".into(),
        })?;
        analysis.validate()?;

        let tier = analysis.risk_tier;
        log::info!("offer: generating for {customer_id} (tier={tier}, score={:.3})", analysis.risk_score);

        let (offers, action) = match tier {
            RiskTier::High => {
                let mut offers = vec![self.bill_discount(profile, rng)];
                if profile.contract_type == ContractType::MonthToMonth {
                    offers.push(self.contract_discount(rng));
                }
                (offers, ACTION_HIGH)
            }
            RiskTier::Medium => {
                let mut offers = vec![self.bill_discount(profile, rng)];
                offers.extend(self.service_upgrades(1, rng));
                (offers, ACTION_MEDIUM)
            }
            RiskTier::Low => (self.service_upgrades(MAX_SERVICE_OFFERS, rng), ACTION_LOW),
        };

        let urgency = Urgency::for_score(analysis.risk_score);
        let offers: Vec<Offer> = offers.into_iter().map(|o| o.with_urgency(urgency)).collect();

        let decision = OfferDecision {
            decision_id:        Builder::from_random_bytes(rng.next_bytes_16()).into_uuid(),
            customer_id:        customer_id.to_string(),
            risk_tier:          tier,
            risk_score:         analysis.risk_score,
            offers,
            recommended_action: action.to_string(),
            strategy:           format!("Risk-based strategy for {tier} risk customer"),
        };

        log::info!(
            "offer: {} offers for {customer_id} (urgency={urgency:?}, decision={})",
            decision.total_offers(),
            decision.decision_id
        );
        Ok(decision)
    }

    /// Percentage coupon on the monthly bill. Big spenders get the
    /// larger, longer band.
    fn bill_discount(&self, profile: &CustomerProfile, rng: &mut OfferRng) -> Offer {
        let band = if profile.monthly_charges > self.config.high_spend_threshold {
            &self.config.high_spend_discount
        } else {
            &self.config.standard_discount
        };
        let pct = draw_pct(band, rng);
        let months = band.months();

        Offer::discount(
            OfferType::DiscountCoupon,
            format!("SAVE{pct}"),
            format!("{pct}% Off Next {months} Months"),
            format!("Save {pct}% on your monthly bill for the next {months} months"),
            pct,
            band.validity_days,
            band.priority,
        )
    }

    fn contract_discount(&self, rng: &mut OfferRng) -> Offer {
        let band = &self.config.contract_discount;
        let pct = draw_pct(band, rng);

        Offer::discount(
            OfferType::ContractDiscount,
            format!("ANNUAL{pct}"),
            format!("{pct}% Off Annual Contract"),
            format!("Switch to annual contract and save {pct}%"),
            pct,
            band.validity_days,
            band.priority,
        )
    }

    /// Up to `limit` distinct catalog entries, capped at MAX_SERVICE_OFFERS.
    fn service_upgrades(&self, limit: usize, rng: &mut OfferRng) -> Vec<Offer> {
        rng.sample_indices(SERVICE_CATALOG.len(), limit.min(MAX_SERVICE_OFFERS))
            .into_iter()
            .map(|i| Offer::service_upgrade(&SERVICE_CATALOG[i]))
            .collect()
    }
}

/// Build an offer set with the standard decision table.
pub fn generate_offers(
    customer_id: &str,
    profile: &CustomerProfile,
    analysis: Option<&ChurnAnalysis>,
    rng: &mut OfferRng,
) -> PolicyResult<OfferDecision> {
    OfferPolicy::standard().generate_offers(customer_id, profile, analysis, rng)
}

/// Trimmed, non-empty customer id or `InvalidInput`.
pub fn validate_customer_id(customer_id: &str) -> PolicyResult<&str> {
    let trimmed = customer_id.trim();
    if trimmed.is_empty() {
        return Err(PolicyError::InvalidInput {
            reason: "Customer ID is required".into(),
        });
    }
    Ok(trimmed)
}

fn draw_pct(band: &DiscountBand, rng: &mut OfferRng) -> u32 {
    rng.range_inclusive(band.min_pct, band.max_pct)
}
