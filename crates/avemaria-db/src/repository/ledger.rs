//! # Inventory Ledger
//!
//! The core of the backend: keeps product stock and the financial ledger in
//! lockstep with sale/purchase creation and cancellation.
//!
//! ## Atomicity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  One Operation = One Transaction                        │
//! │                                                                         │
//! │  record_sale                                                           │
//! │  ├── per line: conditional stock decrement (stock >= qty or abort)     │
//! │  ├── INSERT sale + sale_items (cost snapshot, profit computed once)    │
//! │  └── INSERT income ledger entry linked to the sale                     │
//! │                                                                         │
//! │  record_purchase                                                       │
//! │  ├── per line: stock increment                                         │
//! │  ├── INSERT purchase + purchase_items                                  │
//! │  └── INSERT expense ledger entry linked to the purchase                │
//! │                                                                         │
//! │  cancel_sale                                                           │
//! │  ├── per sale item: stock increment (restore)                          │
//! │  ├── UPDATE sale status → CANCELLED                                    │
//! │  └── UPDATE linked entry: amount = 0, description tagged               │
//! │                                                                         │
//! │  Any failure inside the block rolls the WHOLE operation back:          │
//! │  no stock change, no rows, no ledger entry.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why a Conditional Decrement?
//! The stock-sufficiency check and the decrement are a single statement
//! (`... SET stock = stock - ?q WHERE id = ? AND stock >= ?q`). Two
//! concurrent sales of the same product can never both pass the check for
//! quantities that together exceed the available stock: the second UPDATE
//! affects zero rows and its whole transaction aborts with a conflict.
//! There is no separate read-then-write step to race against, and no
//! in-process lock: multiple server processes can share the database.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::sale::SALE_COLUMNS;
use avemaria_core::money::Money;
use avemaria_core::types::{
    Customer, EntryType, ExpenseCategory, LedgerEntry, NewExpense, NewPurchase, NewSale, Purchase,
    PurchaseDetail, PurchaseItemDetail, ProductBrief, Sale, SaleDetail, SaleItem, SaleItemDetail,
    SaleStatus,
};
use avemaria_core::{CANCELLED_MARK, DEFAULT_USER_ID};

/// Columns selected for a full [`LedgerEntry`] row.
const ENTRY_COLUMNS: &str =
    "id, type, amount, category, description, date, user_id, sale_id, purchase_id";

/// Product fields read inside the sale transaction: enough for the cost
/// snapshot, the availability error message and the line read model.
#[derive(Debug, sqlx::FromRow)]
struct ProductSnapshot {
    id: String,
    #[sqlx(rename = "ref")]
    reference: String,
    name: String,
    icon: Option<String>,
    wholesale_price: i64,
    stock: i64,
    is_active: bool,
}

impl ProductSnapshot {
    fn brief(&self) -> ProductBrief {
        ProductBrief {
            id: self.id.clone(),
            reference: self.reference.clone(),
            name: self.name.clone(),
            icon: self.icon.clone(),
        }
    }
}

/// Ledger listing filters (all optional, combined with AND).
#[derive(Debug, Clone, Default)]
pub struct LedgerFilter {
    /// `INCOME` or `EXPENSE`.
    pub entry_type: Option<String>,
    /// Expense category wire name, e.g. `ENVIOS`.
    pub category: Option<String>,
    /// Inclusive lower bound on the entry date.
    pub start_date: Option<chrono::DateTime<Utc>>,
    /// Inclusive upper bound on the entry date.
    pub end_date: Option<chrono::DateTime<Utc>>,
}

/// The inventory ledger: atomic stock + document + ledger-entry operations.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    // =========================================================================
    // Record Sale
    // =========================================================================

    /// Records a sale: decrements stock, snapshots costs, assigns the next
    /// folio, writes the sale with its items and one INCOME ledger entry.
    /// All inside one transaction.
    ///
    /// ## Errors
    /// - [`DbError::NotFound`] - unknown or inactive product, unknown customer
    /// - [`DbError::InsufficientStock`] - any line exceeds available stock;
    ///   the message names the product and both quantities
    pub async fn record_sale(&self, input: &NewSale) -> DbResult<SaleDetail> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        // Optional customer reference: resolved up front because the ledger
        // description carries the name.
        let customer: Option<Customer> = match &input.customer_id {
            Some(customer_id) => {
                let found = sqlx::query_as::<_, Customer>(
                    "SELECT id, name, phone, instagram, notes, created_at \
                     FROM customers WHERE id = ?1",
                )
                .bind(customer_id)
                .fetch_optional(&mut *tx)
                .await?;

                Some(found.ok_or_else(|| DbError::not_found("Customer", customer_id.as_str()))?)
            }
            None => None,
        };

        let sale_id = Uuid::new_v4().to_string();
        let mut total_revenue = Money::zero();
        let mut total_cost = Money::zero();
        let mut items: Vec<SaleItemDetail> = Vec::with_capacity(input.items.len());

        for line in &input.items {
            let product = sqlx::query_as::<_, ProductSnapshot>(
                "SELECT id, ref, name, icon, wholesale_price, stock, is_active \
                 FROM products WHERE id = ?1",
            )
            .bind(&line.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Product", line.product_id.as_str()))?;

            if !product.is_active {
                return Err(DbError::not_found("Product", line.product_id.as_str()));
            }

            // The availability check IS the decrement: zero rows affected
            // means the stock was not sufficient at this very moment, and
            // the transaction aborts without any partial effect.
            let result = sqlx::query(
                "UPDATE products \
                 SET stock = stock - ?2, updated_at = ?3 \
                 WHERE id = ?1 AND is_active = 1 AND stock >= ?2",
            )
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(DbError::InsufficientStock {
                    name: product.name.clone(),
                    reference: product.reference.clone(),
                    available: product.stock,
                    requested: line.quantity,
                });
            }

            // Snapshot the wholesale cost so later price edits never rewrite
            // this sale's profit.
            let unit_cost = product.wholesale_price;
            let unit_profit = line.unit_revenue - unit_cost;

            total_revenue += Money::from_pesos(line.unit_revenue) * line.quantity;
            total_cost += Money::from_pesos(unit_cost) * line.quantity;

            items.push(SaleItemDetail {
                id: Uuid::new_v4().to_string(),
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                unit_revenue: line.unit_revenue,
                unit_cost,
                unit_profit,
                product: product.brief(),
            });
        }

        let net_profit = total_revenue - total_cost;

        // Sequential folio, assigned inside the transaction so two sales can
        // never share a number.
        let folio: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(folio), 0) + 1 FROM sales")
            .fetch_one(&mut *tx)
            .await?;

        let sale = Sale {
            id: sale_id.clone(),
            folio,
            customer_id: customer.as_ref().map(|c| c.id.clone()),
            user_id: DEFAULT_USER_ID.to_string(),
            channel: input.channel,
            payment_method: input.payment_method,
            total_revenue: total_revenue.pesos(),
            total_cost: total_cost.pesos(),
            net_profit: net_profit.pesos(),
            status: SaleStatus::Completed,
            notes: input.notes.clone(),
            sold_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, folio, customer_id, user_id, channel, payment_method,
                total_revenue, total_cost, net_profit, status, notes, sold_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&sale.id)
        .bind(sale.folio)
        .bind(&sale.customer_id)
        .bind(&sale.user_id)
        .bind(sale.channel)
        .bind(sale.payment_method)
        .bind(sale.total_revenue)
        .bind(sale.total_cost)
        .bind(sale.net_profit)
        .bind(sale.status)
        .bind(&sale.notes)
        .bind(sale.sold_at)
        .execute(&mut *tx)
        .await?;

        for item in &items {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, quantity, unit_revenue, unit_cost, unit_profit
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&item.id)
            .bind(&sale_id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.unit_revenue)
            .bind(item.unit_cost)
            .bind(item.unit_profit)
            .execute(&mut *tx)
            .await?;
        }

        // Income entry in the ledger, linked back to the sale.
        let description = format!(
            "Venta #{}{} ({})",
            folio,
            customer
                .as_ref()
                .map(|c| format!(" — {}", c.name))
                .unwrap_or_default(),
            input.channel.wire_name()
        );

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, type, amount, category, description, date, user_id, sale_id, purchase_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(EntryType::Income)
        .bind(sale.total_revenue)
        .bind(ExpenseCategory::Otro)
        .bind(&description)
        .bind(now)
        .bind(DEFAULT_USER_ID)
        .bind(&sale_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            sale_id = %sale_id,
            folio = folio,
            total_revenue = sale.total_revenue,
            net_profit = sale.net_profit,
            items = items.len(),
            "Sale recorded"
        );

        Ok(SaleDetail {
            sale,
            items,
            customer,
        })
    }

    // =========================================================================
    // Record Purchase
    // =========================================================================

    /// Records a supplier purchase: increments stock, writes the purchase
    /// with its items and one EXPENSE ledger entry. All inside one
    /// transaction.
    ///
    /// Restocking a soft-deleted product is allowed: supplier orders placed
    /// before a product was retired still arrive.
    pub async fn record_purchase(&self, input: &NewPurchase) -> DbResult<PurchaseDetail> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let purchase_id = Uuid::new_v4().to_string();
        let mut items_cost = Money::zero();
        let mut items: Vec<PurchaseItemDetail> = Vec::with_capacity(input.items.len());

        for line in &input.items {
            let product = sqlx::query_as::<_, ProductSnapshot>(
                "SELECT id, ref, name, icon, wholesale_price, stock, is_active \
                 FROM products WHERE id = ?1",
            )
            .bind(&line.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Product", line.product_id.as_str()))?;

            sqlx::query(
                "UPDATE products SET stock = stock + ?2, updated_at = ?3 WHERE id = ?1",
            )
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            items_cost += Money::from_pesos(line.unit_cost) * line.quantity;

            items.push(PurchaseItemDetail {
                id: Uuid::new_v4().to_string(),
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                unit_cost: line.unit_cost,
                product: product.brief(),
            });
        }

        let total_cost = items_cost + Money::from_pesos(input.shipping_cost);

        let purchase = Purchase {
            id: purchase_id.clone(),
            order_number: input.order_number.clone(),
            user_id: DEFAULT_USER_ID.to_string(),
            shipping_cost: input.shipping_cost,
            total_cost: total_cost.pesos(),
            payment_method: input.payment_method,
            notes: input.notes.clone(),
            purchased_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO purchases (
                id, order_number, user_id, shipping_cost, total_cost,
                payment_method, notes, purchased_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&purchase.id)
        .bind(&purchase.order_number)
        .bind(&purchase.user_id)
        .bind(purchase.shipping_cost)
        .bind(purchase.total_cost)
        .bind(purchase.payment_method)
        .bind(&purchase.notes)
        .bind(purchase.purchased_at)
        .execute(&mut *tx)
        .await?;

        for item in &items {
            sqlx::query(
                r#"
                INSERT INTO purchase_items (id, purchase_id, product_id, quantity, unit_cost)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(&item.id)
            .bind(&purchase_id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.unit_cost)
            .execute(&mut *tx)
            .await?;
        }

        // Expense entry in the ledger, linked back to the purchase.
        let description = format!(
            "Compra a AVEMARÍA{}",
            input
                .order_number
                .as_ref()
                .map(|n| format!(" — Pedido {}", n))
                .unwrap_or_default()
        );

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, type, amount, category, description, date, user_id, sale_id, purchase_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, ?8)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(EntryType::Expense)
        .bind(purchase.total_cost)
        .bind(ExpenseCategory::CompraAvemaria)
        .bind(&description)
        .bind(now)
        .bind(DEFAULT_USER_ID)
        .bind(&purchase_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            purchase_id = %purchase_id,
            total_cost = purchase.total_cost,
            items = items.len(),
            "Purchase recorded"
        );

        Ok(PurchaseDetail { purchase, items })
    }

    // =========================================================================
    // Cancel Sale
    // =========================================================================

    /// Cancels a sale: restores the exact quantities recorded on its items,
    /// flips the status to CANCELLED and zeroes the linked ledger entry
    /// (tagging its description, keeping the row). All inside one
    /// transaction.
    ///
    /// Idempotent: cancelling an already-cancelled sale changes nothing.
    /// The sale totals are left as originally computed; reports filter by
    /// status instead of rewriting history.
    pub async fn cancel_sale(&self, sale_id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {} FROM sales WHERE id = ?1",
            SALE_COLUMNS
        ))
        .bind(sale_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Sale", sale_id))?;

        if sale.status == SaleStatus::Cancelled {
            debug!(sale_id = %sale_id, "Sale already cancelled, nothing to do");
            return Ok(());
        }

        let items = sqlx::query_as::<_, SaleItem>(
            "SELECT id, sale_id, product_id, quantity, unit_revenue, unit_cost, unit_profit \
             FROM sale_items WHERE sale_id = ?1",
        )
        .bind(sale_id)
        .fetch_all(&mut *tx)
        .await?;

        for item in &items {
            let result = sqlx::query(
                "UPDATE products SET stock = stock + ?2, updated_at = ?3 WHERE id = ?1",
            )
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(DbError::not_found("Product", item.product_id.as_str()));
            }
        }

        sqlx::query("UPDATE sales SET status = ?2 WHERE id = ?1")
            .bind(sale_id)
            .bind(SaleStatus::Cancelled)
            .execute(&mut *tx)
            .await?;

        // The entry is an audit row: zero the amount so reports ignore it,
        // tag the description, keep the row.
        sqlx::query(
            "UPDATE transactions SET amount = 0, description = ?2 || description \
             WHERE sale_id = ?1",
        )
        .bind(sale_id)
        .bind(CANCELLED_MARK)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(sale_id = %sale_id, folio = sale.folio, "Sale cancelled, stock restored");

        Ok(())
    }

    // =========================================================================
    // Manual Entries / Listing
    // =========================================================================

    /// Registers a manual EXPENSE entry (packaging, advertising, ...).
    pub async fn insert_expense(&self, input: &NewExpense) -> DbResult<LedgerEntry> {
        let entry = LedgerEntry {
            id: Uuid::new_v4().to_string(),
            entry_type: EntryType::Expense,
            amount: input.amount,
            category: input.category,
            description: input.description.trim().to_string(),
            date: Utc::now(),
            user_id: DEFAULT_USER_ID.to_string(),
            sale_id: None,
            purchase_id: None,
        };

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, type, amount, category, description, date, user_id, sale_id, purchase_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, NULL)
            "#,
        )
        .bind(&entry.id)
        .bind(entry.entry_type)
        .bind(entry.amount)
        .bind(entry.category)
        .bind(&entry.description)
        .bind(entry.date)
        .bind(&entry.user_id)
        .execute(&self.pool)
        .await?;

        debug!(id = %entry.id, amount = entry.amount, "Manual expense registered");

        Ok(entry)
    }

    /// Lists ledger entries, newest first, with optional filters.
    pub async fn list_entries(&self, filter: &LedgerFilter) -> DbResult<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(&format!(
            r#"
            SELECT {}
            FROM transactions
            WHERE (?1 IS NULL OR type = ?1)
              AND (?2 IS NULL OR category = ?2)
              AND (?3 IS NULL OR date >= ?3)
              AND (?4 IS NULL OR date <= ?4)
            ORDER BY date DESC
            "#,
            ENTRY_COLUMNS
        ))
        .bind(filter.entry_type.as_deref())
        .bind(filter.category.as_deref())
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
