use crate::{offer::Priority, types::Percent};
use serde::{Deserialize, Serialize};

// ── Discount bands ─────────────────────────────────────────────────

/// Range a discount percentage is drawn from, plus the terms that go
/// with it. Titles quote the validity in whole months (days / 30).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountBand {
    pub min_pct:       Percent,
    pub max_pct:       Percent,
    pub validity_days: u32,
    pub priority:      Priority,
}

impl DiscountBand {
    pub fn months(&self) -> u32 {
        (self.validity_days / 30).max(1)
    }

    fn validate(&self, name: &str) -> anyhow::Result<()> {
        if self.min_pct > self.max_pct {
            anyhow::bail!("{name}: min_pct {} > max_pct {}", self.min_pct, self.max_pct);
        }
        if self.max_pct > 100 {
            anyhow::bail!("{name}: max_pct {} exceeds 100", self.max_pct);
        }
        if self.validity_days == 0 {
            anyhow::bail!("{name}: validity_days must be positive");
        }
        Ok(())
    }
}

// ── Policy ─────────────────────────────────────────────────────────

/// Tunable magnitudes of the offer policy. The tier thresholds and
/// the service catalog are fixed and deliberately absent here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Bills strictly above this get the larger coupon.
    pub high_spend_threshold: f64,
    pub high_spend_discount:  DiscountBand,
    pub standard_discount:    DiscountBand,
    /// Offered to month-to-month customers on top of the coupon.
    pub contract_discount:    DiscountBand,
}

impl PolicyConfig {
    /// Load from `<data_dir>/offers/offer_policy.json`.
    /// Without a data directory, use PolicyConfig::standard().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/offers/offer_policy.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: PolicyConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        log::debug!("loaded offer policy from {path}");
        Ok(config)
    }

    /// The production decision table.
    pub fn standard() -> Self {
        Self {
            high_spend_threshold: 70.0,
            high_spend_discount: DiscountBand {
                min_pct:       20,
                max_pct:       30,
                validity_days: 90,
                priority:      Priority::High,
            },
            standard_discount: DiscountBand {
                min_pct:       15,
                max_pct:       25,
                validity_days: 60,
                priority:      Priority::Medium,
            },
            contract_discount: DiscountBand {
                min_pct:       40,
                max_pct:       50,
                validity_days: 30,
                priority:      Priority::High,
            },
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.high_spend_threshold.is_finite() || self.high_spend_threshold < 0.0 {
            anyhow::bail!(
                "high_spend_threshold must be a non-negative amount, got {}",
                self.high_spend_threshold
            );
        }
        self.high_spend_discount.validate("high_spend_discount")?;
        self.standard_discount.validate("standard_discount")?;
        self.contract_discount.validate("contract_discount")?;
        Ok(())
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("retention-config-{name}-{}", std::process::id()));
        fs::create_dir_all(dir.join("offers")).unwrap();
        dir
    }

    #[test]
    fn standard_config_is_valid() {
        PolicyConfig::standard().validate().unwrap();
        assert_eq!(PolicyConfig::standard().high_spend_discount.months(), 3);
        assert_eq!(PolicyConfig::standard().standard_discount.months(), 2);
    }

    #[test]
    fn load_round_trips_standard_file() {
        let dir = scratch_dir("roundtrip");
        let json = serde_json::to_string_pretty(&PolicyConfig::standard()).unwrap();
        fs::write(dir.join("offers/offer_policy.json"), json).unwrap();

        let loaded = PolicyConfig::load(dir.to_str().unwrap()).unwrap();
        assert_eq!(loaded, PolicyConfig::standard());

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn load_rejects_inverted_band() {
        let dir = scratch_dir("inverted");
        let mut config = PolicyConfig::standard();
        config.contract_discount.min_pct = 60;
        fs::write(
            dir.join("offers/offer_policy.json"),
            serde_json::to_string(&config).unwrap(),
        )
        .unwrap();

        let err = PolicyConfig::load(dir.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("contract_discount"), "unexpected error: {err}");

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn load_reports_missing_file() {
        let err = PolicyConfig::load("/nonexistent/retention").unwrap_err();
        assert!(err.to_string().contains("Cannot read"), "unexpected error: {err}");
    }
}
