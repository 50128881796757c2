//! # Error Types
//!
//! Domain-specific error types for stockroom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockroom-core errors (this file)                                     │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stockroom-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → Dashboard toast         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Price functions never fail; only variant code generation, stock
//! movements and validation produce errors.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No unused variant code could be drawn within the attempt cap.
    ///
    /// ## When This Occurs
    /// - Nearly all 10,000 four-digit codes under `main_sku` are taken
    /// - The caller passed a snapshot that already contains every code
    ///
    /// The code space is never widened automatically; the message tells the
    /// user what to do instead.
    #[error(
        "Could not generate a unique variant code for {main_sku} after {attempts} attempts; \
         reduce existing codes or widen code length"
    )]
    GenerationExhausted { main_sku: String, attempts: u32 },

    /// Outgoing stock exceeds what is on hand.
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    /// A value in the session store could not be encoded or decoded.
    #[error("Session data is corrupt: {0}")]
    SessionData(#[from] serde_json::Error),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before anything is persisted. The calculators themselves do no
/// sanitization; the form layer calls into [`crate::validation`] first.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. non-digit variant code, NaN percentage).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g. two categories named "Gold" and "gold").
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_exhausted_message_is_actionable() {
        let err = CoreError::GenerationExhausted {
            main_sku: "ABC-123".to_string(),
            attempts: 1000,
        };
        let msg = err.to_string();
        assert!(msg.contains("ABC-123"));
        assert!(msg.contains("1000 attempts"));
        assert!(msg.contains("reduce existing codes or widen code length"));
    }

    #[test]
    fn test_insufficient_stock_message() {
        let err = CoreError::InsufficientStock {
            sku: "NIK-SHO-0042".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for NIK-SHO-0042: available 3, requested 5"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "sku".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "Validation error: sku is required");
    }
}
