//! # avemaria-core: Pure Business Logic for Mi Negocio AVEMARÍA
//!
//! This crate is the **heart** of the AVEMARÍA backend. It contains all
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     AVEMARÍA Backend Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Web SPA + Mobile App (TypeScript)               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ REST / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (Axum handlers)                     │   │
//! │  │    /api/products, /api/sales, /api/purchases, /api/...         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ avemaria-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  reports  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  margins  │  │   rules   │  │   │
//! │  │   │   Sale    │  │  (pesos)  │  │ per-peso  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 avemaria-db (Database Layer)                    │   │
//! │  │       SQLite queries, migrations, the inventory ledger          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, Purchase, LedgerEntry, ...)
//! - [`money`] - Money type in integer Colombian pesos (no floating point!)
//! - [`reports`] - Pure aggregation math for the accounting reports
//! - [`error`] - Validation error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: deterministic, testable without a store
//! 2. **No I/O**: anything touching the database or the network belongs in
//!    avemaria-db or apps/api, not here
//! 3. **Integer money**: whole pesos as i64, never floats
//! 4. **Typed errors**: enum variants over strings, no panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod reports;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use avemaria_core::Money` instead of
// `use avemaria_core::money::Money`

pub use error::ValidationError;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default user ID (single-user runtime with multi-user schema)
///
/// The shop is run by one owner today, but sales, purchases and ledger rows
/// carry a user_id column so a future version can serve several sellers.
/// This constant is stamped on every owned row until then.
pub const DEFAULT_USER_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Maximum line items allowed in a single sale or purchase
///
/// ## Business Reason
/// Prevents runaway requests and keeps transactions reasonably sized.
pub const MAX_SALE_ITEMS: usize = 100;

/// Maximum quantity of a single line item
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Description prefix stamped on the ledger entry of a cancelled sale.
///
/// The entry is never deleted: the amount is zeroed and the description is
/// tagged so the row stays visible in the audit trail.
pub const CANCELLED_MARK: &str = "[CANCELADA] ";

/// Customer spend threshold for VIP level, in pesos.
pub const VIP_SPEND_THRESHOLD: i64 = 2_000_000;

/// Customer spend threshold for Frecuente level, in pesos.
pub const FREQUENT_SPEND_THRESHOLD: i64 = 800_000;

/// Completed purchase count that also grants Frecuente level.
pub const FREQUENT_PURCHASE_COUNT: i64 = 8;
