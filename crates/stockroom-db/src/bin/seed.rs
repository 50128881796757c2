//! # Seed Data Generator
//!
//! Populates a development database with pricing settings, a few products,
//! their opening stock and some reserved variant codes.
//!
//! ## Usage
//! ```bash
//! # Seed ./stockroom_dev.db
//! cargo run -p stockroom-db --bin seed
//!
//! # Specify database path
//! cargo run -p stockroom-db --bin seed -- --db ./data/stockroom.db
//!
//! # Override pricing defaults
//! STOCKROOM_EXCHANGE_RATE=16250 cargo run -p stockroom-db --bin seed
//! ```
//!
//! `STOCKROOM_DB_PATH` is used when `--db` is absent.

use std::env;

use chrono::Utc;
use stockroom_core::pricing::PriceSheet;
use stockroom_core::sku::{generate_sku_at, generate_variant_sku};
use stockroom_core::{
    Brand, PricingDefaults, ProductType, ProductVariant, StockTransaction, StockTransactionKind,
    Tax, TaxStatus, VariantSelection, VariantType, VariantValue,
};
use stockroom_db::{new_product, Database, DbConfig, DbError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// (brand, brand code, type, type code, product name, USD price, opening stock)
const PRODUCTS: &[(&str, Option<&str>, &str, Option<&str>, &str, f64, i64)] = &[
    ("Nike", None, "Shoes", None, "Air Zoom Pegasus", 11.0, 24),
    ("Adidas", Some("AD"), "T-Shirt", Some("TS"), "Essentials Tee", 4.5, 60),
    ("Uniqlo", None, "Jacket", None, "Ultra Light Down", 18.0, 12),
];

const DEFAULT_DB_PATH: &str = "./stockroom_dev.db";

/// Attempts at inserting a product whose time-suffixed SKU collided.
const MAX_SKU_ATTEMPTS: u32 = 3;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let mut db_path = env::var("STOCKROOM_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockroom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: {})", DEFAULT_DB_PATH);
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let defaults = PricingDefaults::from_env()?;
    info!(
        db = %db_path,
        exchange_rate = defaults.exchange_rate,
        adjustment = defaults.adjustment_percentage,
        "Seeding database"
    );

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(existing, "Database already has products, skipping seed");
        return Ok(());
    }

    // Pricing settings
    db.price_categories().replace_all(&defaults.categories).await?;
    db.taxes()
        .insert(&Tax {
            name: "PPN".to_string(),
            percentage: 11.0,
            status: TaxStatus::Active,
        })
        .await?;
    db.taxes()
        .insert(&Tax {
            name: "Luxury".to_string(),
            percentage: 10.0,
            status: TaxStatus::Inactive,
        })
        .await?;

    let categories = db.price_categories().list().await?;
    let taxes = db.taxes().list_active().await?;

    let color = VariantType {
        id: "color".to_string(),
        name: "Color".to_string(),
        values: vec![VariantValue::new("c1", "Black"), VariantValue::new("c2", "White")],
    };
    let selection = VariantSelection {
        type_id: color.id.clone(),
        values: vec!["c1".to_string()],
    };

    for (brand_name, brand_code, type_name, type_code, name, usd_price, opening) in PRODUCTS {
        let mut brand = Brand::new(*brand_name);
        if let Some(code) = brand_code {
            brand = brand.with_code(*code);
        }
        let mut product_type = ProductType::new(*type_name);
        if let Some(code) = type_code {
            product_type = product_type.with_code(*code);
        }

        let sheet = PriceSheet::compute(&defaults.cost_input(*usd_price), &categories, &taxes);

        let sku = insert_product(&db, &brand, &product_type, &selection, &color, name, sheet.hb_naik)
            .await?;

        let level = db
            .stock()
            .record(
                &StockTransaction::new(&sku, StockTransactionKind::In, *opening)
                    .with_note("opening stock"),
            )
            .await?;

        let first = db.variant_codes().reserve(&sku, Some("0001")).await?;
        let second = db.variant_codes().reserve(&sku, None).await?;

        let white = ProductVariant {
            values: vec![VariantValue::new("c2", "White")],
        };

        info!(
            sku = %sku,
            hb_naik = sheet.hb_naik,
            stock = level,
            variants = %format!("{}, {}", first, second),
            alternate = %generate_variant_sku(&sku, &white),
            "Seeded product"
        );
        println!("{}", serde_json::to_string_pretty(&sheet)?);
    }

    info!(products = db.products().count().await?, "Seed complete");
    db.close().await;

    Ok(())
}

/// Clock reading for a SKU attempt. Retries step the reading forward one
/// millisecond per attempt so a collision never regenerates the same suffix.
fn sku_clock(started_millis: i64, attempt: u32) -> i64 {
    started_millis + i64::from(attempt - 1)
}

/// Inserts a product under a freshly generated SKU, regenerating when the
/// time suffix collides with an existing one.
async fn insert_product(
    db: &Database,
    brand: &Brand,
    product_type: &ProductType,
    selection: &VariantSelection,
    color: &VariantType,
    name: &str,
    hb_naik: i64,
) -> Result<String, DbError> {
    let started = Utc::now().timestamp_millis();
    let mut attempt = 1;
    loop {
        let sku = generate_sku_at(
            brand,
            product_type,
            Some(std::slice::from_ref(selection)),
            Some(std::slice::from_ref(color)),
            sku_clock(started, attempt),
        );
        let product = new_product(&sku, name, &brand.name, &product_type.name, hb_naik);

        match db.products().insert(&product).await {
            Ok(()) => return Ok(sku),
            Err(err) if err.is_unique_violation() && attempt < MAX_SKU_ATTEMPTS => {
                warn!(sku = %sku, error = %err, "SKU collided, regenerating");
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=stockroom=trace` - Show trace for stockroom crates only
/// - Default: info, with debug for stockroom crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockroom=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retries_never_reuse_a_suffix() {
        let brand = Brand::new("Nike");
        let product_type = ProductType::new("Shoes");
        let started = 1_700_000_009_999;

        let skus: Vec<String> = (1..=MAX_SKU_ATTEMPTS)
            .map(|attempt| {
                generate_sku_at(&brand, &product_type, None, None, sku_clock(started, attempt))
            })
            .collect();

        assert_eq!(skus, vec!["NIK-SHO-9999", "NIK-SHO-0000", "NIK-SHO-0001"]);
    }
}
