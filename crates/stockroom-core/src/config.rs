//! # Pricing Defaults
//!
//! Values the product form starts from before the user edits them.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`STOCKROOM_*`)
//! 2. Defaults (this file)
//!
//! Price categories themselves are managed on the settings screen and
//! stored by stockroom-db; the list here only seeds an empty database.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::pricing::CostInput;
use crate::types::PriceCategory;
use crate::validation::{validate_percentage, validate_price_categories, ValidationResult};

/// Defaults for the cost fields and the initial category list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingDefaults {
    /// USD → IDR rate used when the form has none.
    pub exchange_rate: f64,

    /// Adjustment applied to hb_real, in percent.
    pub adjustment_percentage: f64,

    /// Customer tiers created on first run.
    pub categories: Vec<PriceCategory>,
}

impl Default for PricingDefaults {
    /// ## Default Values
    /// - Exchange rate: 15,000
    /// - Adjustment: 10%
    /// - Tiers: Platinum 5%, Gold 10%, Silver 15%, Bronze 20%
    fn default() -> Self {
        PricingDefaults {
            exchange_rate: 15000.0,
            adjustment_percentage: 10.0,
            categories: vec![
                PriceCategory::new("Platinum", 5.0),
                PriceCategory::new("Gold", 10.0),
                PriceCategory::new("Silver", 15.0),
                PriceCategory::new("Bronze", 20.0),
            ],
        }
    }
}

impl PricingDefaults {
    /// Loads defaults with environment overrides.
    ///
    /// ## Environment Variables
    /// - `STOCKROOM_EXCHANGE_RATE`: e.g. "16250"
    /// - `STOCKROOM_ADJUSTMENT_PERCENTAGE`: e.g. "12.5"
    pub fn from_env() -> ValidationResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads defaults, reading overrides through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> ValidationResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = PricingDefaults::default();

        if let Some(rate) = lookup("STOCKROOM_EXCHANGE_RATE") {
            config.exchange_rate = parse_number("STOCKROOM_EXCHANGE_RATE", &rate)?;
        }

        if let Some(adjustment) = lookup("STOCKROOM_ADJUSTMENT_PERCENTAGE") {
            config.adjustment_percentage =
                parse_number("STOCKROOM_ADJUSTMENT_PERCENTAGE", &adjustment)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks rates are usable and tier names are distinct.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_percentage("exchange rate", self.exchange_rate)?;
        if !self.adjustment_percentage.is_finite() {
            return Err(ValidationError::InvalidFormat {
                field: "adjustment percentage".to_string(),
                reason: "must be a number".to_string(),
            });
        }
        validate_price_categories(&self.categories)
    }

    /// Cost fields for a new product form priced at `usd_price`.
    pub fn cost_input(&self, usd_price: f64) -> CostInput {
        CostInput {
            usd_price: Some(usd_price),
            exchange_rate: Some(self.exchange_rate),
            adjustment_percentage: self.adjustment_percentage,
        }
    }
}

fn parse_number(field: &str, raw: &str) -> ValidationResult<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("'{}' is not a number", raw),
        })
}
