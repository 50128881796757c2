//! # Validation Module
//!
//! Business rule validation run before anything is persisted.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Dashboard forms (TypeScript)                                 │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Business rules (names, percentages, quantities)                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE(sku), UNIQUE(main_sku, unique_code)                        │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The price calculators in [`crate::pricing`] deliberately do not call
//! into this module.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::PriceCategory;
use crate::{MAX_SKU_LENGTH, MAX_STOCK_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only letters, digits, hyphens and underscores
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_sku;
///
/// assert!(validate_sku("NIK-SHO-4821").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("NIK SHO").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > MAX_SKU_LENGTH {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: MAX_SKU_LENGTH,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a brand or product type code (2–5 ASCII letters or digits).
pub fn validate_brand_code(code: &str) -> ValidationResult<()> {
    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if !(2..=5).contains(&code.len()) || !code.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must be 2 to 5 letters or digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a price category name.
pub fn validate_category_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "category name".to_string(),
        });
    }

    if name.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "category name".to_string(),
            max: 50,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a markup, adjustment or tax percentage: finite and ≥ 0.
///
/// ```rust
/// use stockroom_core::validation::validate_percentage;
///
/// assert!(validate_percentage("markup", 5.0).is_ok());
/// assert!(validate_percentage("markup", -1.0).is_err());
/// assert!(validate_percentage("markup", f64::NAN).is_err());
/// ```
pub fn validate_percentage(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a number".to_string(),
        });
    }

    if value < 0.0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a stock transaction quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_STOCK_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_STOCK_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_STOCK_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates a full category list for the settings screen.
///
/// Rejects names that collide case-insensitively. The price calculator
/// tolerates such collisions (last one wins); persisting them is refused.
pub fn validate_price_categories(categories: &[PriceCategory]) -> ValidationResult<()> {
    let mut seen = HashSet::new();

    for category in categories {
        validate_category_name(&category.name)?;
        validate_percentage("markup percentage", category.markup_percentage)?;

        if !seen.insert(category.key()) {
            return Err(ValidationError::Duplicate {
                field: "category".to_string(),
                value: category.name.clone(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
