//! # Customer Repository
//!
//! CRUD for customers plus the completed-sale aggregates that drive the
//! derived VIP/Frecuente/Regular level. The level itself is pure logic in
//! avemaria-core; this module only supplies the sums.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use avemaria_core::types::{customer_level, Customer, CustomerSummary, NewCustomer, UpdateCustomer};

/// Columns selected for a full [`Customer`] row.
const CUSTOMER_COLUMNS: &str = "id, name, phone, instagram, notes, created_at";

/// A customer row with completed-sale aggregates, as read from SQL.
#[derive(Debug, sqlx::FromRow)]
struct CustomerStatsRow {
    id: String,
    name: String,
    phone: Option<String>,
    instagram: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    total_spent: i64,
    total_purchases: i64,
    last_purchase: Option<DateTime<Utc>>,
}

impl From<CustomerStatsRow> for CustomerSummary {
    fn from(row: CustomerStatsRow) -> Self {
        CustomerSummary {
            customer: Customer {
                id: row.id,
                name: row.name,
                phone: row.phone,
                instagram: row.instagram,
                notes: row.notes,
                created_at: row.created_at,
            },
            total_spent: row.total_spent,
            total_purchases: row.total_purchases,
            last_purchase: row.last_purchase,
            level: customer_level(row.total_spent, row.total_purchases),
        }
    }
}

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a new customer and returns it.
    pub async fn insert(&self, input: &NewCustomer) -> DbResult<Customer> {
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            phone: input.phone.clone(),
            instagram: input.instagram.clone(),
            notes: input.notes.clone(),
            created_at: Utc::now(),
        };

        debug!(id = %customer.id, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, phone, instagram, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.instagram)
        .bind(&customer.notes)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {} FROM customers WHERE id = ?1",
            CUSTOMER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists all customers alphabetically with their completed-sale
    /// aggregates and derived level.
    pub async fn list_with_stats(&self) -> DbResult<Vec<CustomerSummary>> {
        let rows = sqlx::query_as::<_, CustomerStatsRow>(
            r#"
            SELECT c.id, c.name, c.phone, c.instagram, c.notes, c.created_at,
                   COALESCE(SUM(s.total_revenue), 0) AS total_spent,
                   COUNT(s.id) AS total_purchases,
                   MAX(s.sold_at) AS last_purchase
            FROM customers c
            LEFT JOIN sales s ON s.customer_id = c.id AND s.status = 'COMPLETED'
            GROUP BY c.id
            ORDER BY c.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CustomerSummary::from).collect())
    }

    /// Completed-sale aggregates for a single customer.
    ///
    /// ## Returns
    /// (total_spent, total_purchases) over COMPLETED sales only.
    pub async fn stats(&self, id: &str) -> DbResult<(i64, i64)> {
        let totals = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COALESCE(SUM(total_revenue), 0), COUNT(id)
            FROM sales
            WHERE customer_id = ?1 AND status = 'COMPLETED'
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(totals)
    }

    /// Applies a partial update and returns the result.
    pub async fn update(&self, id: &str, changes: &UpdateCustomer) -> DbResult<Customer> {
        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))?;

        let updated = Customer {
            name: changes
                .name
                .as_deref()
                .map(|n| n.trim().to_string())
                .unwrap_or(existing.name),
            phone: changes.phone.clone().or(existing.phone),
            instagram: changes.instagram.clone().or(existing.instagram),
            notes: changes.notes.clone().or(existing.notes),
            ..existing
        };

        sqlx::query(
            r#"
            UPDATE customers SET name = ?2, phone = ?3, instagram = ?4, notes = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&updated.id)
        .bind(&updated.name)
        .bind(&updated.phone)
        .bind(&updated.instagram)
        .bind(&updated.notes)
        .execute(&self.pool)
        .await?;

        Ok(updated)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
