//! # Repository Module
//!
//! Database repository implementations for Stockroom.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Dashboard handler                                                     │
//! │       │                                                                 │
//! │       │  db.variant_codes().reserve("ABC-123", None)                   │
//! │       ▼                                                                 │
//! │  VariantCodeRepository                                                 │
//! │  ├── snapshot existing codes                                           │
//! │  ├── stockroom_core::sku::generate_variant_code                        │
//! │  └── INSERT, retry on UNIQUE violation                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  SQL stays in this module; rules stay in stockroom-core.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`PriceCategoryRepository`] and [`TaxRepository`] - pricing settings
//! - [`ProductRepository`] - products keyed by SKU
//! - [`StockRepository`] - stock movements and history
//! - [`VariantCodeRepository`] - authoritative variant code registry
//!
//! [`PriceCategoryRepository`]: pricing::PriceCategoryRepository
//! [`TaxRepository`]: pricing::TaxRepository
//! [`ProductRepository`]: product::ProductRepository
//! [`StockRepository`]: stock::StockRepository
//! [`VariantCodeRepository`]: variant::VariantCodeRepository

pub mod pricing;
pub mod product;
pub mod stock;
pub mod variant;
