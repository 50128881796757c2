//! # SKU Module
//!
//! Derives short, human-legible product and variant identifiers without a
//! central sequence.
//!
//! ## Identifier Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Product SKU      NIK - SHO - RL - 4821                                │
//! │                   ─┬─   ─┬─   ─┬   ──┬─                                │
//! │                    │     │     │     └─ last 4 digits of clock millis  │
//! │                    │     │     └─ 1st letter of each selected variant  │
//! │                    │     └─ product type code (or first 3 of name)     │
//! │                    └─ brand code (or first 3 of name)                  │
//! │                                                                         │
//! │  Variant SKU      ABC-123 - 0042                                       │
//! │                   ───┬───   ──┬─                                       │
//! │                      │        └─ 4 random digits, unique per main SKU  │
//! │                      └─ main SKU                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Uniqueness Is Advisory
//! Two calls within the same millisecond window produce the same product
//! suffix, and variant codes are only checked against the snapshot the
//! caller passes in. The `variant_codes` and `products` tables in
//! stockroom-db hold the unique constraints that actually arbitrate.

use chrono::Utc;
use rand::Rng;
use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult};
use crate::types::{
    Brand, ExistingVariant, ProductType, ProductVariant, VariantCode, VariantSelection, VariantType,
};
use crate::{MAX_VARIANT_CODE_ATTEMPTS, VARIANT_CODE_LENGTH};

// =============================================================================
// Product SKUs
// =============================================================================

/// Uses `code` when present and non-empty, else the first 3 characters of
/// `name`, upper-cased.
fn code_or_abbreviation(code: Option<&str>, name: &str) -> String {
    match code {
        Some(code) if !code.is_empty() => code.to_string(),
        _ => name.chars().take(3).collect::<String>().to_uppercase(),
    }
}

/// Upper-cased first character of `s`, if any.
fn initial(s: &str) -> Option<String> {
    s.chars().next().map(|c| c.to_uppercase().collect())
}

/// One letter per selection: the initial of the first selected value's
/// display name. Selections that cannot be resolved contribute nothing.
fn variant_initials(variants: &[VariantSelection], variant_types: &[VariantType]) -> String {
    variants
        .iter()
        .filter_map(|selection| {
            let variant_type = variant_types.iter().find(|t| t.id == selection.type_id)?;
            let value = variant_type.value(selection.values.first()?)?;
            initial(&value.name)
        })
        .collect()
}

/// Generates a product SKU using the current clock.
///
/// See [`generate_sku_at`] for the format.
pub fn generate_sku(
    brand: &Brand,
    product_type: &ProductType,
    variants: Option<&[VariantSelection]>,
    variant_types: Option<&[VariantType]>,
) -> String {
    generate_sku_at(
        brand,
        product_type,
        variants,
        variant_types,
        Utc::now().timestamp_millis(),
    )
}

/// Generates a product SKU with an explicit clock reading in milliseconds.
///
/// ## Format
/// `brandCode-typeCode[-variantInitials]-suffix` where the suffix is the
/// last four digits of `millis`. Variant initials keep the caller's order.
///
/// ## Example
/// ```rust
/// use stockroom_core::sku::generate_sku_at;
/// use stockroom_core::{Brand, ProductType};
///
/// let sku = generate_sku_at(
///     &Brand::new("Nike"),
///     &ProductType::new("Shoes"),
///     None,
///     None,
///     1_700_000_004_821,
/// );
/// assert_eq!(sku, "NIK-SHO-4821");
/// ```
pub fn generate_sku_at(
    brand: &Brand,
    product_type: &ProductType,
    variants: Option<&[VariantSelection]>,
    variant_types: Option<&[VariantType]>,
    millis: i64,
) -> String {
    let mut parts = vec![
        code_or_abbreviation(brand.code.as_deref(), &brand.name),
        code_or_abbreviation(product_type.code.as_deref(), &product_type.name),
    ];

    if let Some(variants) = variants.filter(|v| !v.is_empty()) {
        let initials = variant_initials(variants, variant_types.unwrap_or(&[]));
        if !initials.is_empty() {
            parts.push(initials);
        }
    }

    parts.push(format!("{:04}", millis.rem_euclid(10_000)));
    parts.join("-")
}

/// Appends the initials of each of the variant's values to `parent_sku`.
///
/// ```rust
/// use stockroom_core::sku::generate_variant_sku;
/// use stockroom_core::{ProductVariant, VariantValue};
///
/// let variant = ProductVariant {
///     values: vec![VariantValue::new("c1", "red"), VariantValue::new("s2", "large")],
/// };
/// assert_eq!(generate_variant_sku("NIK-SHO-4821", &variant), "NIK-SHO-4821-RL");
/// ```
pub fn generate_variant_sku(parent_sku: &str, variant: &ProductVariant) -> String {
    let initials: String = variant
        .values
        .iter()
        .filter_map(|value| initial(&value.name))
        .collect();

    format!("{}-{}", parent_sku, initials)
}

// =============================================================================
// Variant Codes
// =============================================================================

/// Draws one code: each position is an independent uniform digit.
fn draw_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..VARIANT_CODE_LENGTH)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Generates a variant code unused among `existing_codes`, using the
/// thread-local RNG.
///
/// See [`generate_variant_code_with`].
pub fn generate_variant_code<S: AsRef<str>>(
    main_sku: &str,
    existing_codes: &[S],
    default_code: Option<&str>,
) -> CoreResult<VariantCode> {
    generate_variant_code_with(&mut rand::thread_rng(), main_sku, existing_codes, default_code)
}

/// Generates a variant code unused among `existing_codes`.
///
/// ## Algorithm
/// 1. If `default_code` is given and unused, it is taken verbatim.
/// 2. Otherwise draw random 4-digit codes until one is unused, giving up
///    after [`MAX_VARIANT_CODE_ATTEMPTS`] draws.
///
/// ## Errors
/// [`CoreError::GenerationExhausted`] when the cap is hit. The code space
/// is never widened.
pub fn generate_variant_code_with<R, S>(
    rng: &mut R,
    main_sku: &str,
    existing_codes: &[S],
    default_code: Option<&str>,
) -> CoreResult<VariantCode>
where
    R: Rng + ?Sized,
    S: AsRef<str>,
{
    let is_taken = |code: &str| existing_codes.iter().any(|c| c.as_ref() == code);

    if let Some(code) = default_code {
        if !is_taken(code) {
            return Ok(VariantCode {
                main_sku: main_sku.to_string(),
                unique_code: code.to_string(),
            });
        }
        debug!(main_sku = %main_sku, code = %code, "Default variant code already taken");
    }

    for attempt in 1..=MAX_VARIANT_CODE_ATTEMPTS {
        let code = draw_code(rng);
        if !is_taken(&code) {
            debug!(main_sku = %main_sku, attempt, "Generated variant code");
            return Ok(VariantCode {
                main_sku: main_sku.to_string(),
                unique_code: code,
            });
        }
    }

    warn!(
        main_sku = %main_sku,
        existing = existing_codes.len(),
        "Variant code generation exhausted"
    );
    Err(CoreError::GenerationExhausted {
        main_sku: main_sku.to_string(),
        attempts: MAX_VARIANT_CODE_ATTEMPTS,
    })
}

/// Renders a variant code as `main_sku-unique_code`.
pub fn format_variant_sku(variant_code: &VariantCode) -> String {
    format!("{}-{}", variant_code.main_sku, variant_code.unique_code)
}

/// True iff `code` is exactly four ASCII digits.
pub fn validate_variant_code(code: &str) -> bool {
    code.len() == VARIANT_CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

/// Splits a variant SKU into its `(main, code)` pair at the last hyphen.
///
/// `"ABC-123-0042"` parses as `("ABC-123", "0042")`. Only SKUs shaped like
/// [`format_variant_sku`] output parse meaningfully; a letter-initial
/// variant SKU such as `"NIK-SHO-4821-RL"` yields the code `"RL"`.
fn split_variant_sku(sku: &str) -> (&str, &str) {
    sku.rsplit_once('-').unwrap_or((sku, ""))
}

/// True unless an existing variant parses to the same `(main_sku, code)`.
///
/// This is a client-side pre-check only; see [`split_variant_sku`] for the
/// parsing caveat.
pub fn is_unique_variant_code(
    code: &str,
    main_sku: &str,
    existing_variants: &[ExistingVariant],
) -> bool {
    !existing_variants.iter().any(|variant| {
        let (existing_main, existing_code) = split_variant_sku(&variant.sku);
        existing_main == main_sku && existing_code == code
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VariantValue;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn variant_types() -> Vec<VariantType> {
        vec![
            VariantType {
                id: "color".to_string(),
                name: "Color".to_string(),
                values: vec![VariantValue::new("c1", "red"), VariantValue::new("c2", "blue")],
            },
            VariantType {
                id: "size".to_string(),
                name: "Size".to_string(),
                values: vec![VariantValue::new("s1", "small"), VariantValue::new("s2", "large")],
            },
        ]
    }

    fn selection(type_id: &str, values: &[&str]) -> VariantSelection {
        VariantSelection {
            type_id: type_id.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[test]
    fn test_sku_uses_codes_when_present() {
        let brand = Brand::new("Nike").with_code("NK");
        let product_type = ProductType::new("Shoes").with_code("SH");
        assert_eq!(generate_sku_at(&brand, &product_type, None, None, 42), "NK-SH-0042");
    }

    #[test]
    fn test_sku_falls_back_to_name_prefix() {
        let brand = Brand::new("adidas").with_code("");
        let product_type = ProductType::new("tshirt");
        assert_eq!(
            generate_sku_at(&brand, &product_type, None, None, 1_700_000_001_234),
            "ADI-TSH-1234"
        );

        // Names shorter than three characters are used whole.
        let brand = Brand::new("hm");
        assert_eq!(generate_sku_at(&brand, &product_type, None, None, 7), "HM-TSH-0007");
    }

    #[test]
    fn test_sku_variant_initials_keep_caller_order() {
        let brand = Brand::new("Nike");
        let product_type = ProductType::new("Shoes");
        let types = variant_types();

        let color_first = [selection("color", &["c2", "c1"]), selection("size", &["s2"])];
        assert_eq!(
            generate_sku_at(&brand, &product_type, Some(&color_first), Some(&types), 5555),
            "NIK-SHO-BL-5555"
        );

        let size_first = [selection("size", &["s1"]), selection("color", &["c1"])];
        assert_eq!(
            generate_sku_at(&brand, &product_type, Some(&size_first), Some(&types), 5555),
            "NIK-SHO-SR-5555"
        );
    }

    #[test]
    fn test_sku_skips_unresolved_selections() {
        let brand = Brand::new("Nike");
        let product_type = ProductType::new("Shoes");
        let types = variant_types();

        let unresolved = [selection("material", &["m1"]), selection("color", &[])];
        assert_eq!(
            generate_sku_at(&brand, &product_type, Some(&unresolved), Some(&types), 10),
            "NIK-SHO-0010"
        );

        let no_lookup = [selection("color", &["c1"])];
        assert_eq!(
            generate_sku_at(&brand, &product_type, Some(&no_lookup), None, 10),
            "NIK-SHO-0010"
        );
    }

    #[test]
    fn test_sku_from_clock_has_four_digit_suffix() {
        let sku = generate_sku(&Brand::new("Nike"), &ProductType::new("Shoes"), None, None);
        let suffix = sku.rsplit('-').next().unwrap();
        assert!(sku.starts_with("NIK-SHO-"));
        assert!(validate_variant_code(suffix));
    }

    #[test]
    fn test_variant_sku() {
        let variant = ProductVariant {
            values: vec![VariantValue::new("c1", "red"), VariantValue::new("s2", "large")],
        };
        assert_eq!(generate_variant_sku("NIK-SHO-4821", &variant), "NIK-SHO-4821-RL");
        assert_eq!(
            generate_variant_sku("NIK-SHO-4821", &ProductVariant::default()),
            "NIK-SHO-4821-"
        );
    }

    #[test]
    fn test_default_code_used_when_unused() {
        let code = generate_variant_code::<&str>("ABC-123", &[], Some("0042")).unwrap();
        assert_eq!(format_variant_sku(&code), "ABC-123-0042");
    }

    #[test]
    fn test_taken_default_code_falls_back_to_random() {
        let mut rng = StdRng::seed_from_u64(42);
        let code = generate_variant_code_with(&mut rng, "ABC-123", &["0042"], Some("0042")).unwrap();

        assert_ne!(code.unique_code, "0042");
        assert!(validate_variant_code(&code.unique_code));
    }

    #[test]
    fn test_random_code_avoids_existing() {
        let existing: Vec<String> = (0..9000).map(|n| format!("{:04}", n)).collect();
        let mut rng = StdRng::seed_from_u64(1);

        let code = generate_variant_code_with(&mut rng, "ABC-123", &existing, None).unwrap();
        let n: u32 = code.unique_code.parse().unwrap();
        assert!(n >= 9000);
    }

    #[test]
    fn test_generation_exhausted_when_all_codes_taken() {
        let existing: Vec<String> = (0..10_000).map(|n| format!("{:04}", n)).collect();

        let err = generate_variant_code("ABC-123", &existing, None).unwrap_err();
        match err {
            CoreError::GenerationExhausted { main_sku, attempts } => {
                assert_eq!(main_sku, "ABC-123");
                assert_eq!(attempts, MAX_VARIANT_CODE_ATTEMPTS);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_variant_code() {
        assert!(validate_variant_code("0042"));
        assert!(validate_variant_code("9999"));
        assert!(!validate_variant_code("12a4"));
        assert!(!validate_variant_code("042"));
        assert!(!validate_variant_code("00420"));
        assert!(!validate_variant_code("٠٠٤٢"));
    }

    #[test]
    fn test_is_unique_variant_code() {
        assert!(!is_unique_variant_code(
            "0042",
            "ABC-123",
            &[ExistingVariant::new("ABC-123-0042")]
        ));
        assert!(is_unique_variant_code(
            "0099",
            "ABC-123",
            &[ExistingVariant::new("ABC-123-0042")]
        ));
        assert!(is_unique_variant_code("0042", "ABC-123", &[]));
    }

    #[test]
    fn test_is_unique_variant_code_single_hyphen_skus() {
        let existing = [ExistingVariant::new("SHIRT-0042")];
        assert!(!is_unique_variant_code("0042", "SHIRT", &existing));
        assert!(is_unique_variant_code("0042", "PANTS", &existing));
    }

    #[test]
    fn test_is_unique_variant_code_multi_segment_main_sku() {
        let existing = [ExistingVariant::new("NIK-SHO-4821-0042")];
        assert!(!is_unique_variant_code("0042", "NIK-SHO-4821", &existing));
        assert!(is_unique_variant_code("0042", "NIK-SHO", &existing));

        // Initial-style variant SKUs carry no numeric code.
        let existing = [ExistingVariant::new("NIK-SHO-4821-RL")];
        assert!(is_unique_variant_code("0042", "NIK-SHO-4821", &existing));
    }
}
