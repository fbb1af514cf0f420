//! # avemaria-db: Database Layer for Mi Negocio AVEMARÍA
//!
//! This crate provides database access for the AVEMARÍA backend.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      AVEMARÍA Data Flow                                 │
//! │                                                                         │
//! │  API Handler (POST /api/sales)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    avemaria-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (ledger.rs,   │    │  (embedded)  │  │   │
//! │  │   │               │    │  product.rs,  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│  sale.rs ...) │    │ 001_init.sql │  │   │
//! │  │   │ Management    │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (WAL mode, foreign keys on)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations; `repository::ledger` owns
//!   the atomic stock/ledger transactions
//!
//! ## Usage
//!
//! ```rust,ignore
//! use avemaria_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("avemaria.db")).await?;
//!
//! let sale = db.ledger().record_sale(&new_sale).await?;
//! let products = db.products().list(&Default::default()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::ledger::{LedgerFilter, LedgerRepository};
pub use repository::product::{ProductFilter, ProductRepository};
pub use repository::purchase::PurchaseRepository;
pub use repository::sale::{SaleFilter, SaleRepository};
pub use repository::reports::ReportsRepository;
