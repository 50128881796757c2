//! # Domain Types
//!
//! Records exchanged between the admin dashboard, the calculators in this
//! crate, and the storage layer.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Pricing                         Catalog / identifiers                  │
//! │  ┌─────────────────┐            ┌─────────────────┐                    │
//! │  │ PriceCategory   │            │ Brand           │──┐                 │
//! │  │  name (key)     │            │ ProductType     │──┼──► generate_sku │
//! │  │  markup %       │            │ VariantType     │──┘                 │
//! │  └────────┬────────┘            │ VariantSelection│                    │
//! │           │                     └─────────────────┘                    │
//! │  ┌────────┴────────┐            ┌─────────────────┐                    │
//! │  │ Tax             │            │ VariantCode     │                    │
//! │  │  percentage     │            │  main_sku       │                    │
//! │  │  status         │            │  unique_code    │ "0042"             │
//! │  └────────┬────────┘            └─────────────────┘                    │
//! │           ▼                                                             │
//! │  PriceBreakdown (derived, never persisted)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All wire names are camelCase because the consumer is a TypeScript
//! dashboard; bindings are emitted by `ts-rs`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Pricing
// =============================================================================

/// One customer-facing pricing tier (e.g. "Platinum").
///
/// `name` is the key, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceCategory {
    pub name: String,
    /// Markup applied on top of hb_naik, in percent (5.0 = 5%).
    #[serde(alias = "percentage")]
    pub markup_percentage: f64,
}

impl PriceCategory {
    pub fn new(name: impl Into<String>, markup_percentage: f64) -> Self {
        PriceCategory {
            name: name.into(),
            markup_percentage,
        }
    }

    /// Lowercased name, the key used in price breakdown maps.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}

/// Whether a tax currently applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TaxStatus {
    #[default]
    Active,
    Inactive,
}

impl TaxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxStatus::Active => "active",
            TaxStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for TaxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaxStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(TaxStatus::Active),
            "inactive" => Ok(TaxStatus::Inactive),
            other => Err(ValidationError::InvalidFormat {
                field: "tax status".to_string(),
                reason: format!("unknown status '{}'", other),
            }),
        }
    }
}

/// A tax rate. Only active taxes contribute to tax-inclusive prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Tax {
    /// Display name ("PPN"). Not used in calculations.
    #[serde(default)]
    pub name: String,
    /// Rate in percent (11.0 = 11%).
    pub percentage: f64,
    #[serde(default)]
    pub status: TaxStatus,
}

impl Tax {
    pub fn active(percentage: f64) -> Self {
        Tax {
            name: String::new(),
            percentage,
            status: TaxStatus::Active,
        }
    }

    pub fn inactive(percentage: f64) -> Self {
        Tax {
            name: String::new(),
            percentage,
            status: TaxStatus::Inactive,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == TaxStatus::Active
    }
}

/// Derived prices for one category. Recomputed from scratch on every call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    /// `round(hb_naik × (1 + markup / 100))`
    #[ts(type = "number")]
    pub base_price: i64,
    /// `round(base_price × (1 + applied_tax_percentage / 100))`
    #[ts(type = "number")]
    pub tax_inclusive_price: i64,
    /// Sum of all active tax percentages.
    pub applied_tax_percentage: f64,
}

// =============================================================================
// Catalog
// =============================================================================

/// A brand as supplied by the brand settings screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    /// Short code used in SKUs ("NIK"). Falls back to the name when absent.
    #[serde(default)]
    pub code: Option<String>,
    pub name: String,
}

impl Brand {
    pub fn new(name: impl Into<String>) -> Self {
        Brand {
            code: None,
            name: name.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// A product type ("Shoes", "Shirt").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductType {
    #[serde(default)]
    pub code: Option<String>,
    pub name: String,
}

impl ProductType {
    pub fn new(name: impl Into<String>) -> Self {
        ProductType {
            code: None,
            name: name.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// One selectable value of a variant type, e.g. `{ id: "c1", name: "Red" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VariantValue {
    pub id: String,
    pub name: String,
}

impl VariantValue {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        VariantValue {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A variant dimension ("Color", "Size") and its values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VariantType {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub values: Vec<VariantValue>,
}

impl VariantType {
    /// Looks up a value by id.
    pub fn value(&self, value_id: &str) -> Option<&VariantValue> {
        self.values.iter().find(|v| v.id == value_id)
    }
}

/// The values picked for one variant type on the product form.
///
/// `values` holds value ids, resolved against [`VariantType::values`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VariantSelection {
    pub type_id: String,
    pub values: Vec<String>,
}

/// A concrete variant of a product: one value per variant type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductVariant {
    pub values: Vec<VariantValue>,
}

/// A persisted product.
///
/// ## Dual-Key Identity
/// - `id`: UUID v4, used for relations
/// - `sku`: human-readable, immutable once assigned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub brand_name: String,
    pub type_name: String,
    /// Cost basis the customer prices derive from.
    #[ts(type = "number")]
    pub hb_naik: i64,
    #[ts(type = "number")]
    pub current_stock: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Variant Codes
// =============================================================================

/// A variant identifier: the product's main SKU plus a 4-digit code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VariantCode {
    pub main_sku: String,
    pub unique_code: String,
}

impl fmt::Display for VariantCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.main_sku, self.unique_code)
    }
}

/// An already persisted variant, as listed by the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExistingVariant {
    pub sku: String,
}

impl ExistingVariant {
    pub fn new(sku: impl Into<String>) -> Self {
        ExistingVariant { sku: sku.into() }
    }
}
