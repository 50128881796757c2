//! # Stock Repository
//!
//! Records stock movements against products.
//!
//! ## Atomic Update
//! ```text
//! BEGIN
//!   UPDATE products
//!      SET current_stock = current_stock + delta
//!    WHERE sku = ? AND current_stock + delta >= 0   ← guard in SQL
//!   INSERT INTO stock_transactions ...              ← ledger row
//! COMMIT
//! ```
//! The level is adjusted with a delta rather than read-modify-write, so two
//! concurrent movements cannot overwrite each other.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use stockroom_core::{CoreError, StockTransaction, StockTransactionKind};

use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    sku: String,
    kind: String,
    quantity: i64,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for StockTransaction {
    type Error = DbError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        Ok(StockTransaction {
            sku: row.sku,
            kind: row.kind.parse::<StockTransactionKind>()?,
            quantity: row.quantity,
            note: row.note,
            created_at: row.created_at,
        })
    }
}

/// Repository for stock movements.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Applies a movement and returns the product's new stock level.
    ///
    /// ## Errors
    /// - Validation error for a bad quantity
    /// - `NotFound` for an unknown SKU
    /// - `InsufficientStock` when the level would drop below zero; nothing
    ///   is written
    pub async fn record(&self, transaction: &StockTransaction) -> DbResult<i64> {
        transaction.validate()?;

        let delta = transaction.delta();
        let mut tx = self.pool.begin().await?;

        let updated: Option<(String, i64)> = sqlx::query_as(
            r#"
            UPDATE products
               SET current_stock = current_stock + ?1, updated_at = ?2
             WHERE sku = ?3 AND current_stock + ?1 >= 0
            RETURNING id, current_stock
            "#,
        )
        .bind(delta)
        .bind(Utc::now())
        .bind(&transaction.sku)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((product_id, level)) = updated else {
            let available: Option<i64> =
                sqlx::query_scalar("SELECT current_stock FROM products WHERE sku = ?1")
                    .bind(&transaction.sku)
                    .fetch_optional(&mut *tx)
                    .await?;

            return Err(match available {
                None => DbError::not_found("Product", &transaction.sku),
                Some(available) => CoreError::InsufficientStock {
                    sku: transaction.sku.clone(),
                    available,
                    requested: -delta,
                }
                .into(),
            });
        };

        sqlx::query(
            r#"
            INSERT INTO stock_transactions (id, product_id, kind, quantity, note, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&product_id)
        .bind(transaction.kind.as_str())
        .bind(transaction.quantity)
        .bind(&transaction.note)
        .bind(transaction.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            sku = %transaction.sku,
            kind = %transaction.kind,
            delta,
            level,
            "Stock movement recorded"
        );
        Ok(level)
    }

    /// Returns the most recently recorded movements for a SKU, newest first.
    pub async fn history(&self, sku: &str, limit: u32) -> DbResult<Vec<StockTransaction>> {
        debug!(sku = %sku, limit, "Loading stock history");

        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT p.sku, t.kind, t.quantity, t.note, t.created_at
              FROM stock_transactions t
              JOIN products p ON p.id = t.product_id
             WHERE p.sku = ?1
             ORDER BY t.rowid DESC
             LIMIT ?2
            "#,
        )
        .bind(sku)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(StockTransaction::try_from).collect()
    }
}
