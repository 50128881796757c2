//! # Pricing Settings Repositories
//!
//! Price categories and taxes, as edited on the settings screen. Reads
//! feed straight into `stockroom_core::pricing`.
//!
//! Category names are unique case-insensitively (`name_key` column), so a
//! persisted list never hits the calculator's last-write-wins collision
//! rule.

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use stockroom_core::validation::{validate_category_name, validate_percentage, validate_price_categories};
use stockroom_core::{PriceCategory, Tax, TaxStatus};

use crate::error::{DbError, DbResult};

// =============================================================================
// Price Categories
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    name: String,
    markup_percentage: f64,
}

impl From<CategoryRow> for PriceCategory {
    fn from(row: CategoryRow) -> Self {
        PriceCategory::new(row.name, row.markup_percentage)
    }
}

/// Repository for price category operations.
#[derive(Debug, Clone)]
pub struct PriceCategoryRepository {
    pool: SqlitePool,
}

impl PriceCategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PriceCategoryRepository { pool }
    }

    /// Lists categories in creation order.
    pub async fn list(&self) -> DbResult<Vec<PriceCategory>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT name, markup_percentage FROM price_categories ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PriceCategory::from).collect())
    }

    /// Inserts a category, or updates the one with the same name ignoring
    /// case. The stored spelling follows the latest write.
    pub async fn upsert(&self, category: &PriceCategory) -> DbResult<()> {
        validate_category_name(&category.name)?;
        validate_percentage("markup percentage", category.markup_percentage)?;

        debug!(name = %category.name, markup = category.markup_percentage, "Upserting price category");

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO price_categories (id, name, name_key, markup_percentage, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            ON CONFLICT(name_key) DO UPDATE SET
                name = excluded.name,
                markup_percentage = excluded.markup_percentage,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(category.name.trim())
        .bind(category.name.trim().to_lowercase())
        .bind(category.markup_percentage)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Replaces the whole list in one transaction.
    ///
    /// ## Errors
    /// `Duplicate` validation error when two names collide ignoring case;
    /// nothing is written in that case.
    pub async fn replace_all(&self, categories: &[PriceCategory]) -> DbResult<()> {
        validate_price_categories(categories)?;

        debug!(count = categories.len(), "Replacing price categories");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM price_categories")
            .execute(&mut *tx)
            .await?;

        for category in categories {
            sqlx::query(
                r#"
                INSERT INTO price_categories (id, name, name_key, markup_percentage, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(category.name.trim())
            .bind(category.name.trim().to_lowercase())
            .bind(category.markup_percentage)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Deletes a category by name, ignoring case.
    pub async fn delete(&self, name: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM price_categories WHERE name_key = ?1")
            .bind(name.trim().to_lowercase())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Price category", name));
        }

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM price_categories")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Taxes
// =============================================================================

/// A stored tax with its row ID.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxEntry {
    pub id: String,
    #[serde(flatten)]
    pub tax: Tax,
}

#[derive(Debug, sqlx::FromRow)]
struct TaxRow {
    id: String,
    name: String,
    percentage: f64,
    status: String,
}

impl TryFrom<TaxRow> for TaxEntry {
    type Error = DbError;

    fn try_from(row: TaxRow) -> Result<Self, Self::Error> {
        Ok(TaxEntry {
            id: row.id,
            tax: Tax {
                name: row.name,
                percentage: row.percentage,
                status: row.status.parse::<TaxStatus>()?,
            },
        })
    }
}

/// Repository for tax operations.
#[derive(Debug, Clone)]
pub struct TaxRepository {
    pool: SqlitePool,
}

impl TaxRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TaxRepository { pool }
    }

    /// Lists all taxes, active or not.
    pub async fn list(&self) -> DbResult<Vec<TaxEntry>> {
        let rows = sqlx::query_as::<_, TaxRow>(
            "SELECT id, name, percentage, status FROM taxes ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TaxEntry::try_from).collect()
    }

    /// Lists the taxes that contribute to prices.
    pub async fn list_active(&self) -> DbResult<Vec<Tax>> {
        let rows = sqlx::query_as::<_, TaxRow>(
            "SELECT id, name, percentage, status FROM taxes WHERE status = 'active' ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| TaxEntry::try_from(row).map(|entry| entry.tax))
            .collect()
    }

    /// Inserts a tax and returns its ID.
    pub async fn insert(&self, tax: &Tax) -> DbResult<String> {
        validate_percentage("tax percentage", tax.percentage)?;

        let id = Uuid::new_v4().to_string();
        debug!(id = %id, percentage = tax.percentage, status = %tax.status, "Inserting tax");

        sqlx::query(
            "INSERT INTO taxes (id, name, percentage, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&id)
        .bind(&tax.name)
        .bind(tax.percentage)
        .bind(tax.status.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// Activates or deactivates a tax.
    pub async fn set_status(&self, id: &str, status: TaxStatus) -> DbResult<()> {
        let result = sqlx::query("UPDATE taxes SET status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Tax", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use stockroom_core::pricing::compute_customer_prices;
    use stockroom_core::{CoreError, ValidationError};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_upsert_is_case_insensitive() {
        let db = db().await;
        let repo = db.price_categories();

        repo.upsert(&PriceCategory::new("Gold", 5.0)).await.unwrap();
        repo.upsert(&PriceCategory::new("Silver", 15.0)).await.unwrap();
        repo.upsert(&PriceCategory::new("GOLD", 7.5)).await.unwrap();

        let categories = repo.list().await.unwrap();
        assert_eq!(
            categories,
            vec![PriceCategory::new("GOLD", 7.5), PriceCategory::new("Silver", 15.0)]
        );
    }

    #[tokio::test]
    async fn test_upsert_rejects_negative_markup() {
        let db = db().await;
        let err = db
            .price_categories()
            .upsert(&PriceCategory::new("Bronze", -1.0))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Core(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
    }

    #[tokio::test]
    async fn test_replace_all_is_atomic_on_duplicates() {
        let db = db().await;
        let repo = db.price_categories();
        repo.upsert(&PriceCategory::new("Platinum", 5.0)).await.unwrap();

        let dup = [PriceCategory::new("Gold", 5.0), PriceCategory::new("gold", 10.0)];
        assert!(repo.replace_all(&dup).await.is_err());
        assert_eq!(repo.list().await.unwrap(), vec![PriceCategory::new("Platinum", 5.0)]);

        let fresh = [PriceCategory::new("Gold", 10.0), PriceCategory::new("Silver", 15.0)];
        repo.replace_all(&fresh).await.unwrap();
        assert_eq!(repo.list().await.unwrap(), fresh.to_vec());
    }

    #[tokio::test]
    async fn test_delete_category() {
        let db = db().await;
        let repo = db.price_categories();
        repo.upsert(&PriceCategory::new("Gold", 5.0)).await.unwrap();

        repo.delete("gold").await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);
        assert!(matches!(repo.delete("gold").await, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_only_active_taxes_feed_prices() {
        let db = db().await;
        let taxes = db.taxes();

        let ppn = taxes
            .insert(&Tax {
                name: "PPN".to_string(),
                percentage: 11.0,
                status: TaxStatus::Active,
            })
            .await
            .unwrap();
        let luxury = taxes.insert(&Tax::active(5.0)).await.unwrap();
        taxes.set_status(&luxury, TaxStatus::Inactive).await.unwrap();

        assert_eq!(taxes.list().await.unwrap().len(), 2);

        let active = taxes.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "PPN");

        db.price_categories()
            .upsert(&PriceCategory::new("Gold", 5.0))
            .await
            .unwrap();
        let categories = db.price_categories().list().await.unwrap();
        let prices = compute_customer_prices(165000, &categories, &active);
        assert_eq!(prices["gold"].tax_inclusive_price, 192308);

        taxes.set_status(&ppn, TaxStatus::Inactive).await.unwrap();
        assert!(taxes.list_active().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_status_unknown_tax() {
        let db = db().await;
        let err = db.taxes().set_status("missing", TaxStatus::Active).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
