//! # Repositories
//!
//! One repository per aggregate, all sharing the same pool:
//!
//! - [`product`] - catalog CRUD, search, low-stock, valuation
//! - [`customer`] - customer CRUD and completed-sale aggregates
//! - [`sale`] - sale reads, summaries and non-cancelling status updates
//! - [`purchase`] - purchase reads and summary
//! - [`ledger`] - the inventory ledger: atomic stock + sale/purchase +
//!   ledger-entry transactions (record sale, record purchase, cancel sale)
//! - [`reports`] - accounting and dashboard aggregations

pub mod customer;
pub mod ledger;
pub mod product;
pub mod purchase;
pub mod reports;
pub mod sale;

// =============================================================================
// Shared Test Helpers
// =============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use avemaria_core::types::{Category, NewCustomer, NewProduct};

    use crate::pool::{Database, DbConfig};

    /// Fresh in-memory database with all migrations applied.
    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory())
            .await
            .expect("in-memory database")
    }

    /// Product creation input with sane defaults for tests.
    pub fn product_input(reference: &str, wholesale: i64, retail: i64, stock: i64) -> NewProduct {
        NewProduct {
            reference: reference.to_string(),
            name: format!("Producto {}", reference),
            category: Category::Candongas,
            icon: Some("✨".to_string()),
            wholesale_price: wholesale,
            retail_price: retail,
            stock,
            min_stock: 3,
        }
    }

    /// Customer creation input for tests.
    pub fn customer_input(name: &str) -> NewCustomer {
        NewCustomer {
            name: name.to_string(),
            phone: Some("3001234567".to_string()),
            instagram: None,
            notes: None,
        }
    }
}
