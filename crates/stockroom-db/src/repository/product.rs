//! # Product Repository
//!
//! Products keyed by SKU. `current_stock` is only ever changed through
//! [`StockRepository`](super::stock::StockRepository) so the ledger and the
//! cached level never drift apart.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use stockroom_core::validation::validate_sku;
use stockroom_core::Product;

use crate::error::{DbError, DbResult};

const PRODUCT_COLUMNS: &str =
    "id, sku, name, brand_name, type_name, hb_naik, current_stock, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    sku: String,
    name: String,
    brand_name: String,
    type_name: String,
    hb_naik: i64,
    current_stock: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            sku: row.sku,
            name: row.name,
            brand_name: row.brand_name,
            type_name: row.type_name,
            hb_naik: row.hb_naik,
            current_stock: row.current_stock,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Builds a new product with a fresh ID and zero stock.
pub fn new_product(
    sku: impl Into<String>,
    name: impl Into<String>,
    brand_name: impl Into<String>,
    type_name: impl Into<String>,
    hb_naik: i64,
) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4().to_string(),
        sku: sku.into(),
        name: name.into(),
        brand_name: brand_name.into(),
        type_name: type_name.into(),
        hb_naik,
        current_stock: 0,
        created_at: now,
        updated_at: now,
    }
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// repo.insert(&new_product("NIK-SHO-4821", "Air Zoom", "Nike", "Shoes", 173250)).await?;
/// let product = repo.get_by_sku("NIK-SHO-4821").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a product.
    ///
    /// ## Errors
    /// - Validation error for a malformed SKU
    /// - `UniqueViolation` when the SKU is already taken. Time-suffixed
    ///   SKUs can collide; callers regenerate and retry.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        validate_sku(&product.sku)?;
        let sku = product.sku.trim();

        debug!(sku = %sku, hb_naik = product.hb_naik, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, sku, name, brand_name, type_name, hb_naik, current_stock, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(sku)
        .bind(&product.name)
        .bind(&product.brand_name)
        .bind(&product.type_name)
        .bind(product.hb_naik)
        .bind(product.current_stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            err if err.is_unique_violation() => DbError::duplicate("sku", sku),
            err => err,
        })?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Product> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Product::from)
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Product> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = ?1");
        sqlx::query_as::<_, ProductRow>(&sql)
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?
            .map(Product::from)
            .ok_or_else(|| DbError::not_found("Product", sku))
    }

    /// Lists products, newest first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY rowid DESC LIMIT ?1"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Stores a recomputed cost basis.
    pub async fn update_hb_naik(&self, sku: &str, hb_naik: i64) -> DbResult<()> {
        let result = sqlx::query("UPDATE products SET hb_naik = ?2, updated_at = ?3 WHERE sku = ?1")
            .bind(sku)
            .bind(hb_naik)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", sku));
        }

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
