//! # Stock Module
//!
//! Stock transactions recorded from the inventory screen and the math that
//! turns them into a stock level.
//!
//! ## Delta Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  in         +quantity   (goods received)                            │
//! │  out        -quantity   (goods shipped / sold)                      │
//! │  adjustment ±quantity   (stock opname correction)                   │
//! │                                                                     │
//! │  level = Σ deltas, never below zero                                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//! The storage layer applies a delta to the current level inside one SQL
//! transaction, so concurrent movements never overwrite each other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::validation::validate_quantity;

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum StockTransactionKind {
    In,
    Out,
    Adjustment,
}

impl StockTransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockTransactionKind::In => "in",
            StockTransactionKind::Out => "out",
            StockTransactionKind::Adjustment => "adjustment",
        }
    }
}

impl fmt::Display for StockTransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockTransactionKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(StockTransactionKind::In),
            "out" => Ok(StockTransactionKind::Out),
            "adjustment" => Ok(StockTransactionKind::Adjustment),
            other => Err(ValidationError::InvalidFormat {
                field: "transaction kind".to_string(),
                reason: format!("unknown kind '{}'", other),
            }),
        }
    }
}

/// One stock movement for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockTransaction {
    pub sku: String,
    pub kind: StockTransactionKind,
    /// Positive for `in`/`out`; signed for `adjustment`.
    #[ts(type = "number")]
    pub quantity: i64,
    #[serde(default)]
    pub note: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl StockTransaction {
    pub fn new(sku: impl Into<String>, kind: StockTransactionKind, quantity: i64) -> Self {
        StockTransaction {
            sku: sku.into(),
            kind,
            quantity,
            note: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Signed change this transaction makes to the stock level.
    pub fn delta(&self) -> i64 {
        match self.kind {
            StockTransactionKind::In | StockTransactionKind::Adjustment => self.quantity,
            StockTransactionKind::Out => self.quantity.saturating_neg(),
        }
    }

    /// Checks the quantity. Adjustments may be negative but not zero.
    pub fn validate(&self) -> CoreResult<()> {
        match self.kind {
            // i64::MIN has no absolute value; treat it as out of range
            StockTransactionKind::Adjustment => {
                validate_quantity(self.quantity.checked_abs().unwrap_or(i64::MAX))?
            }
            _ => validate_quantity(self.quantity)?,
        }
        Ok(())
    }
}

/// Applies `tx` to `current` and returns the new level.
///
/// ## Errors
/// - `Validation` for a bad quantity
/// - `InsufficientStock` when the result would drop below zero
pub fn apply_transaction(current: i64, tx: &StockTransaction) -> CoreResult<i64> {
    tx.validate()?;

    let next = current.saturating_add(tx.delta());
    if next < 0 {
        return Err(CoreError::InsufficientStock {
            sku: tx.sku.clone(),
            available: current,
            requested: -tx.delta(),
        });
    }

    Ok(next)
}

/// Replays a ledger from zero.
pub fn stock_level(transactions: &[StockTransaction]) -> CoreResult<i64> {
    transactions
        .iter()
        .try_fold(0, |level, tx| apply_transaction(level, tx))
}
