//! # Variant Code Repository
//!
//! The authoritative registry of variant codes. `UNIQUE(main_sku,
//! unique_code)` decides uniqueness; the in-memory generator only proposes
//! candidates from a snapshot.
//!
//! ## Reservation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  round 1..=MAX_RESERVE_ROUNDS                                          │
//! │    1. SELECT unique_code WHERE main_sku = ?      (snapshot)            │
//! │    2. generate_variant_code(main_sku, snapshot, default)               │
//! │    3. INSERT                                                           │
//! │         ├── ok               → return code                             │
//! │         └── UNIQUE violation → another writer won, next round          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use stockroom_core::sku::{format_variant_sku, generate_variant_code, validate_variant_code};
use stockroom_core::validation::validate_sku;
use stockroom_core::{CoreError, ExistingVariant, ValidationError, VariantCode};

use crate::error::{DbError, DbResult};

/// Insert attempts per reservation before giving up. Only concurrent
/// writers can make a round fail, so a handful is plenty.
const MAX_RESERVE_ROUNDS: u32 = 5;

/// Repository for variant code operations.
#[derive(Debug, Clone)]
pub struct VariantCodeRepository {
    pool: SqlitePool,
}

impl VariantCodeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        VariantCodeRepository { pool }
    }

    /// Codes already registered under `main_sku`, ascending.
    pub async fn existing_codes(&self, main_sku: &str) -> DbResult<Vec<String>> {
        let codes: Vec<String> = sqlx::query_scalar(
            "SELECT unique_code FROM variant_codes WHERE main_sku = ?1 ORDER BY unique_code",
        )
        .bind(main_sku)
        .fetch_all(&self.pool)
        .await?;

        Ok(codes)
    }

    /// Registered variants of `main_sku` in `main-code` form.
    pub async fn list_variants(&self, main_sku: &str) -> DbResult<Vec<ExistingVariant>> {
        let codes = self.existing_codes(main_sku).await?;

        Ok(codes
            .into_iter()
            .map(|unique_code| {
                ExistingVariant::new(format_variant_sku(&VariantCode {
                    main_sku: main_sku.to_string(),
                    unique_code,
                }))
            })
            .collect())
    }

    /// Registers a specific code.
    ///
    /// ## Errors
    /// - Validation error unless the code is exactly four digits
    /// - `UniqueViolation` when the code is already registered for the SKU
    pub async fn insert(&self, code: &VariantCode) -> DbResult<()> {
        validate_sku(&code.main_sku)?;
        let main_sku = code.main_sku.trim();
        if !validate_variant_code(&code.unique_code) {
            return Err(ValidationError::InvalidFormat {
                field: "variant code".to_string(),
                reason: "must be exactly 4 digits".to_string(),
            }
            .into());
        }

        sqlx::query(
            "INSERT INTO variant_codes (id, main_sku, unique_code, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(main_sku)
        .bind(&code.unique_code)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            err if err.is_unique_violation() => {
                DbError::duplicate("variant code", format_variant_sku(code))
            }
            err => err,
        })?;

        Ok(())
    }

    /// Generates and registers a fresh code for `main_sku`.
    ///
    /// `default_code` is tried first when it is free. Losing an insert race
    /// starts a new round from a fresh snapshot.
    ///
    /// ## Errors
    /// - `GenerationExhausted` when the generator gives up, or when every
    ///   round loses its race
    /// - Validation error for a malformed `main_sku` or `default_code`
    pub async fn reserve(&self, main_sku: &str, default_code: Option<&str>) -> DbResult<VariantCode> {
        validate_sku(main_sku)?;
        let main_sku = main_sku.trim();

        for round in 1..=MAX_RESERVE_ROUNDS {
            let existing = self.existing_codes(main_sku).await?;
            let code = generate_variant_code(main_sku, &existing, default_code)?;

            match self.insert(&code).await {
                Ok(()) => {
                    info!(variant = %code, round, "Variant code reserved");
                    return Ok(code);
                }
                Err(err) if err.is_unique_violation() => {
                    debug!(variant = %code, round, "Variant code taken concurrently, retrying");
                }
                Err(err) => return Err(err),
            }
        }

        warn!(main_sku = %main_sku, rounds = MAX_RESERVE_ROUNDS, "Variant code reservation exhausted");
        Err(rounds_exhausted(main_sku))
    }

    /// Frees a code so it can be reserved again.
    pub async fn release(&self, code: &VariantCode) -> DbResult<()> {
        let result =
            sqlx::query("DELETE FROM variant_codes WHERE main_sku = ?1 AND unique_code = ?2")
                .bind(&code.main_sku)
                .bind(&code.unique_code)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Variant code", format_variant_sku(code)));
        }

        Ok(())
    }
}

/// Every insert round lost its race; `attempts` counts those rounds.
fn rounds_exhausted(main_sku: &str) -> DbError {
    CoreError::GenerationExhausted {
        main_sku: main_sku.to_string(),
        attempts: MAX_RESERVE_ROUNDS,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use std::collections::HashSet;
    use stockroom_core::sku::is_unique_variant_code;

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn code(main_sku: &str, unique_code: &str) -> VariantCode {
        VariantCode {
            main_sku: main_sku.to_string(),
            unique_code: unique_code.to_string(),
        }
    }

    #[tokio::test]
    async fn test_reserve_prefers_free_default() {
        let db = db().await;
        let repo = db.variant_codes();

        let first = repo.reserve("ABC-123", Some("0042")).await.unwrap();
        assert_eq!(first.unique_code, "0042");

        let second = repo.reserve("ABC-123", Some("0042")).await.unwrap();
        assert_ne!(second.unique_code, "0042");
        assert!(validate_variant_code(&second.unique_code));

        let variants = repo.list_variants("ABC-123").await.unwrap();
        assert_eq!(variants.len(), 2);
        assert!(!is_unique_variant_code("0042", "ABC-123", &variants));
        assert!(!is_unique_variant_code(&second.unique_code, "ABC-123", &variants));
    }

    #[tokio::test]
    async fn test_codes_are_scoped_per_main_sku() {
        let db = db().await;
        let repo = db.variant_codes();

        repo.reserve("ABC-123", Some("0042")).await.unwrap();
        let other = repo.reserve("XYZ-999", Some("0042")).await.unwrap();

        assert_eq!(other.unique_code, "0042");
        assert_eq!(repo.existing_codes("XYZ-999").await.unwrap(), vec!["0042"]);
    }

    #[tokio::test]
    async fn test_database_rejects_duplicate_insert() {
        let db = db().await;
        let repo = db.variant_codes();

        repo.insert(&code("ABC-123", "0042")).await.unwrap();
        let err = repo.insert(&code("ABC-123", "0042")).await.unwrap_err();

        match err {
            DbError::UniqueViolation { value, .. } => assert_eq!(value, "ABC-123-0042"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_insert_rejects_malformed_codes() {
        let db = db().await;
        let repo = db.variant_codes();

        for bad in ["042", "00420", "00a2", ""] {
            assert!(matches!(
                repo.insert(&code("ABC-123", bad)).await,
                Err(DbError::Core(CoreError::Validation(_)))
            ));
        }
    }

    #[tokio::test]
    async fn test_concurrent_reservations_never_share_a_code() {
        let db = db().await;
        let repo = db.variant_codes();

        let (a, b, c) = tokio::join!(
            repo.reserve("ABC-123", Some("0042")),
            repo.reserve("ABC-123", Some("0042")),
            repo.reserve("ABC-123", Some("0042")),
        );

        let codes: HashSet<String> = [a, b, c]
            .into_iter()
            .map(|r| r.unwrap().unique_code)
            .collect();
        assert_eq!(codes.len(), 3);
        assert!(codes.contains("0042"));
        assert_eq!(repo.existing_codes("ABC-123").await.unwrap().len(), 3);
    }

    #[test]
    fn test_lost_races_report_round_count() {
        match rounds_exhausted("ABC-123") {
            DbError::Core(CoreError::GenerationExhausted { main_sku, attempts }) => {
                assert_eq!(main_sku, "ABC-123");
                assert_eq!(attempts, MAX_RESERVE_ROUNDS);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(rounds_exhausted("ABC-123")
            .to_string()
            .contains(&format!("after {} attempts", MAX_RESERVE_ROUNDS)));
    }

    #[tokio::test]
    async fn test_padded_main_sku_is_stored_trimmed() {
        let db = db().await;
        let repo = db.variant_codes();

        let reserved = repo.reserve(" ABC-123 ", Some("0042")).await.unwrap();
        assert_eq!(reserved.main_sku, "ABC-123");
        assert_eq!(repo.existing_codes("ABC-123").await.unwrap(), vec!["0042"]);
    }

    #[tokio::test]
    async fn test_release_frees_code() {
        let db = db().await;
        let repo = db.variant_codes();

        let reserved = repo.reserve("ABC-123", Some("0042")).await.unwrap();
        repo.release(&reserved).await.unwrap();
        assert!(repo.existing_codes("ABC-123").await.unwrap().is_empty());

        assert!(matches!(repo.release(&reserved).await, Err(DbError::NotFound { .. })));
        assert_eq!(repo.reserve("ABC-123", Some("0042")).await.unwrap().unique_code, "0042");
    }
}
