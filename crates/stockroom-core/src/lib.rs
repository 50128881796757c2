//! # stockroom-core: Pure Business Logic for Stockroom
//!
//! Pricing and identifier logic for the inventory dashboard, as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Admin Dashboard (TypeScript)                 │   │
//! │  │   Brands ──► Products ──► Variants ──► Prices ──► Stock        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ bindings generated by ts-rs            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockroom-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  pricing  │  │    sku    │  │   stock   │  │  session  │  │   │
//! │  │   │  hb_real  │  │  SKUs     │  │  ledger   │  │  KV store │  │   │
//! │  │   │  hb_naik  │  │  variant  │  │  deltas   │  │  drafts   │  │   │
//! │  │   │  tiers    │  │  codes    │  │           │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockroom-db (Database Layer)                   │   │
//! │  │       SQLite repositories, authoritative uniqueness checks      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`pricing`] - hb_real → hb_naik → per-category price cascade
//! - [`sku`] - Product SKUs and 4-digit variant codes
//! - [`types`] - Domain types (PriceCategory, Tax, Brand, VariantCode, ...)
//! - [`stock`] - Stock transactions and level math
//! - [`session`] - Injected key-value store with login/logout lifecycle
//! - [`config`] - Pricing defaults
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::pricing::PriceSheet;
//! use stockroom_core::sku::{format_variant_sku, generate_variant_code};
//! use stockroom_core::{PriceCategory, PricingDefaults, Tax};
//!
//! let defaults = PricingDefaults::default();
//! let sheet = PriceSheet::compute(
//!     &defaults.cost_input(10.0),
//!     &[PriceCategory::new("Gold", 5.0)],
//!     &[Tax::active(11.0)],
//! );
//! assert_eq!(sheet.price_for("gold").unwrap().tax_inclusive_price, 192308);
//!
//! let code = generate_variant_code::<&str>("ABC-123", &[], Some("0042")).unwrap();
//! assert_eq!(format_variant_sku(&code), "ABC-123-0042");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod pricing;
pub mod session;
pub mod sku;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use config::PricingDefaults;
pub use error::{CoreError, CoreResult, ValidationError};
pub use pricing::{CostInput, PriceSheet};
pub use session::{KeyValueStore, MemoryStore, Session};
pub use stock::{StockTransaction, StockTransactionKind};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Number of digits in a variant code.
pub const VARIANT_CODE_LENGTH: usize = 4;

/// Random draws before variant code generation gives up.
///
/// The code space is 10,000 wide; the cap bounds the loop when the caller's
/// snapshot is (nearly) full.
pub const MAX_VARIANT_CODE_ATTEMPTS: u32 = 1000;

/// Longest SKU accepted for persistence.
pub const MAX_SKU_LENGTH: usize = 50;

/// Largest single stock movement.
pub const MAX_STOCK_QUANTITY: i64 = 1_000_000;
