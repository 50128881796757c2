//! # Pricing Module
//!
//! Converts a single upstream cost figure into a tax-inclusive price per
//! customer category.
//!
//! ## The Price Cascade
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  usd_price × exchange_rate ─────────────► hb_real   (no rounding)      │
//! │                                              │                          │
//! │  × (1 + adjustment / 100), round ──────────► hb_naik  (integer)        │
//! │                                              │                          │
//! │            ┌─────────────────┬───────────────┼───────────────┐          │
//! │            ▼                 ▼               ▼               ▼          │
//! │        Platinum            Gold           Silver          Bronze        │
//! │  × (1 + markup / 100), round ──────────► base_price                     │
//! │  × (1 + Σ active tax / 100), round ────► tax_inclusive_price            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Worked Example
//! ```rust
//! use stockroom_core::pricing::{compute_customer_prices, compute_hb_naik, compute_hb_real};
//! use stockroom_core::{PriceCategory, Tax};
//!
//! let hb_real = compute_hb_real(Some(10.0), Some(15000.0));
//! assert_eq!(hb_real, 150000.0);
//!
//! let hb_naik = compute_hb_naik(hb_real, 10.0);
//! assert_eq!(hb_naik, 165000);
//!
//! let prices = compute_customer_prices(
//!     hb_naik,
//!     &[PriceCategory::new("Gold", 5.0)],
//!     &[Tax::active(11.0)],
//! );
//! assert_eq!(prices["gold"].base_price, 173250);
//! assert_eq!(prices["gold"].tax_inclusive_price, 192308);
//! ```
//!
//! ## No Sanitization
//! Nothing here validates input. Negative adjustments and markups are
//! legal and simply propagate. NaN propagates through the float stages and
//! saturates to 0 when narrowed to an integer price. The form layer calls
//! [`crate::validation`] before invoking these functions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::types::{PriceBreakdown, PriceCategory, Tax};

/// Rounds halves toward positive infinity, like JavaScript `Math.round`.
///
/// Every rounding step of the cascade goes through this function, so
/// `2.5 → 3` and `-2.5 → -2`. The fraction is compared against 0.5
/// directly; adding 0.5 first rounds `0.49999999999999994` up.
#[inline]
pub fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Narrows a rounded float to an integer price. Saturates; NaN becomes 0.
#[inline]
fn to_price(value: f64) -> i64 {
    round_half_up(value) as i64
}

/// Converts the foreign-currency cost to local currency.
///
/// A missing input counts as 0. No rounding is applied.
pub fn compute_hb_real(usd_price: Option<f64>, exchange_rate: Option<f64>) -> f64 {
    usd_price.unwrap_or(0.0) * exchange_rate.unwrap_or(0.0)
}

/// Applies the adjustment percentage to hb_real and rounds.
///
/// A negative adjustment is a markdown; the result is not floored at zero.
pub fn compute_hb_naik(hb_real: f64, adjustment_percentage: f64) -> i64 {
    to_price(hb_real * (1.0 + adjustment_percentage / 100.0))
}

/// Sums the percentages of all active taxes.
pub fn total_active_tax_percentage(taxes: &[Tax]) -> f64 {
    taxes
        .iter()
        .filter(|tax| tax.is_active())
        .map(|tax| tax.percentage)
        .sum()
}

/// Computes the price breakdown for a single category.
pub fn compute_category_price(
    hb_naik: i64,
    category: &PriceCategory,
    total_tax_percentage: f64,
) -> PriceBreakdown {
    let base_price = to_price(hb_naik as f64 * (1.0 + category.markup_percentage / 100.0));
    let tax_inclusive_price = to_price(base_price as f64 * (1.0 + total_tax_percentage / 100.0));

    PriceBreakdown {
        base_price,
        tax_inclusive_price,
        applied_tax_percentage: total_tax_percentage,
    }
}

/// Computes a breakdown for every category, keyed by lowercased name.
///
/// Categories whose names collide case-insensitively overwrite each other;
/// the last one in `categories` wins. An empty slice yields an empty map.
pub fn compute_customer_prices(
    hb_naik: i64,
    categories: &[PriceCategory],
    taxes: &[Tax],
) -> BTreeMap<String, PriceBreakdown> {
    let total_tax = total_active_tax_percentage(taxes);

    let mut prices = BTreeMap::new();
    for category in categories {
        prices.insert(
            category.key(),
            compute_category_price(hb_naik, category, total_tax),
        );
    }
    prices
}

// =============================================================================
// Price Sheet
// =============================================================================

/// The cost fields of the product form.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CostInput {
    #[serde(default)]
    pub usd_price: Option<f64>,
    #[serde(default)]
    pub exchange_rate: Option<f64>,
    #[serde(default)]
    pub adjustment_percentage: f64,
}

/// The full cascade for one product form, as shown in the price table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceSheet {
    pub hb_real: f64,
    #[ts(type = "number")]
    pub hb_naik: i64,
    pub prices: BTreeMap<String, PriceBreakdown>,
}

impl PriceSheet {
    /// Runs all three stages of the cascade.
    pub fn compute(input: &CostInput, categories: &[PriceCategory], taxes: &[Tax]) -> Self {
        let hb_real = compute_hb_real(input.usd_price, input.exchange_rate);
        let hb_naik = compute_hb_naik(hb_real, input.adjustment_percentage);
        let prices = compute_customer_prices(hb_naik, categories, taxes);

        PriceSheet {
            hb_real,
            hb_naik,
            prices,
        }
    }

    /// Breakdown for a category name, compared case-insensitively.
    pub fn price_for(&self, category: &str) -> Option<&PriceBreakdown> {
        self.prices.get(&category.to_lowercase())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(2.4999), 2.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.6), -3.0);
        assert_eq!(round_half_up(0.49999999999999994), 0.0);
        assert_eq!(round_half_up(-0.5), 0.0);
        assert_eq!(compute_hb_naik(0.49999999999999994, 0.0), 0);
        assert!(round_half_up(f64::NAN).is_nan());
    }

    #[test]
    fn test_hb_real_treats_missing_as_zero() {
        assert_eq!(compute_hb_real(Some(10.0), Some(15000.0)), 150000.0);
        assert_eq!(compute_hb_real(None, Some(15000.0)), 0.0);
        assert_eq!(compute_hb_real(Some(10.0), None), 0.0);
        assert_eq!(compute_hb_real(Some(1.25), Some(3.0)), 3.75);
    }

    #[test]
    fn test_hb_naik_negative_adjustment_propagates() {
        assert_eq!(compute_hb_naik(150000.0, 10.0), 165000);
        assert_eq!(compute_hb_naik(1000.0, -10.0), 900);
        assert_eq!(compute_hb_naik(1000.0, -150.0), -500);
    }

    #[test]
    fn test_nan_saturates_to_zero() {
        assert_eq!(compute_hb_naik(f64::NAN, 10.0), 0);

        let prices = compute_customer_prices(100, &[PriceCategory::new("Gold", f64::NAN)], &[]);
        assert_eq!(prices["gold"].base_price, 0);
    }

    #[test]
    fn test_full_cascade_scenario() {
        let hb_real = compute_hb_real(Some(10.0), Some(15000.0));
        let hb_naik = compute_hb_naik(hb_real, 10.0);
        let prices = compute_customer_prices(
            hb_naik,
            &[PriceCategory::new("Gold", 5.0)],
            &[Tax::active(11.0)],
        );

        assert_eq!(prices.len(), 1);
        assert_eq!(
            prices["gold"],
            PriceBreakdown {
                base_price: 173250,
                tax_inclusive_price: 192308,
                applied_tax_percentage: 11.0,
            }
        );
    }

    #[test]
    fn test_inactive_taxes_are_ignored() {
        let taxes = [Tax::active(11.0), Tax::inactive(5.0), Tax::active(1.0)];
        assert_eq!(total_active_tax_percentage(&taxes), 12.0);

        let prices = compute_customer_prices(1000, &[PriceCategory::new("Silver", 0.0)], &taxes);
        assert_eq!(prices["silver"].base_price, 1000);
        assert_eq!(prices["silver"].tax_inclusive_price, 1120);
        assert_eq!(prices["silver"].applied_tax_percentage, 12.0);
    }

    #[test]
    fn test_empty_categories_yield_empty_map() {
        let prices = compute_customer_prices(165000, &[], &[Tax::active(11.0)]);
        assert!(prices.is_empty());
    }

    #[test]
    fn test_duplicate_names_last_write_wins() {
        let categories = [PriceCategory::new("Gold", 5.0), PriceCategory::new("GOLD", 20.0)];
        let prices = compute_customer_prices(1000, &categories, &[]);

        assert_eq!(prices.len(), 1);
        assert_eq!(prices["gold"].base_price, 1200);
    }

    #[test]
    fn test_customer_prices_are_idempotent() {
        let categories = [
            PriceCategory::new("Platinum", 5.0),
            PriceCategory::new("Gold", 10.0),
            PriceCategory::new("Silver", 15.0),
        ];
        let taxes = [Tax::active(11.0), Tax::inactive(2.0)];

        let first = compute_customer_prices(98765, &categories, &taxes);
        let second = compute_customer_prices(98765, &categories, &taxes);
        assert_eq!(first, second);
    }

    #[test]
    fn test_base_price_rounding_bound() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..2000 {
            let hb_naik: i64 = rng.gen_range(0..10_000_000);
            let markup: f64 = rng.gen_range(0.0..200.0);
            let category = PriceCategory::new("Tier", markup);

            let breakdown = compute_category_price(hb_naik, &category, 0.0);
            let exact = hb_naik as f64 * (1.0 + markup / 100.0);

            assert!(breakdown.base_price >= hb_naik);
            assert!((breakdown.base_price as f64 - exact).abs() <= 0.5 + 1e-6);
        }
    }

    #[test]
    fn test_price_sheet_chains_all_stages() {
        let input = CostInput {
            usd_price: Some(10.0),
            exchange_rate: Some(15000.0),
            adjustment_percentage: 10.0,
        };
        let sheet = PriceSheet::compute(
            &input,
            &[PriceCategory::new("Gold", 5.0), PriceCategory::new("Bronze", 20.0)],
            &[Tax::active(11.0)],
        );

        assert_eq!(sheet.hb_real, 150000.0);
        assert_eq!(sheet.hb_naik, 165000);
        assert_eq!(sheet.price_for("GOLD").map(|p| p.base_price), Some(173250));
        assert_eq!(sheet.price_for("bronze").map(|p| p.base_price), Some(198000));
        assert!(sheet.price_for("platinum").is_none());
    }
}
