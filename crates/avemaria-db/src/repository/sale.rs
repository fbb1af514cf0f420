//! # Sale Repository
//!
//! Read side of sales plus the non-cancelling status updates.
//!
//! Recording and cancelling sales live in the ledger repository: those paths
//! mutate stock and the financial ledger and must be atomic. Everything here
//! is either a plain read or a status flip with no side effects.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use avemaria_core::money::Money;
use avemaria_core::reports::{margin_percent, ChannelRevenue, ProductRanking, SalesSummary};
use avemaria_core::types::{
    Customer, ProductBrief, Sale, SaleChannel, SaleDetail, SaleItemDetail, SaleStatus,
};

/// Columns selected for a full [`Sale`] row.
pub(crate) const SALE_COLUMNS: &str = "id, folio, customer_id, user_id, channel, payment_method, \
                                       total_revenue, total_cost, net_profit, status, notes, sold_at";

/// Sale listing filters and pagination.
#[derive(Debug, Clone)]
pub struct SaleFilter {
    /// Channel wire name, e.g. `WHATSAPP`.
    pub channel: Option<String>,
    /// Only sales attached to this customer.
    pub customer_id: Option<String>,
    /// Inclusive lower bound on sold_at.
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on sold_at.
    pub end_date: Option<DateTime<Utc>>,
    /// 1-based page number.
    pub page: i64,
    /// Page size (the API clamps this to 1..=50).
    pub limit: i64,
}

impl Default for SaleFilter {
    fn default() -> Self {
        SaleFilter {
            channel: None,
            customer_id: None,
            start_date: None,
            end_date: None,
            page: 1,
            limit: 20,
        }
    }
}

/// A sale line joined with its product, as read from SQL.
#[derive(Debug, sqlx::FromRow)]
struct SaleItemRow {
    id: String,
    product_id: String,
    quantity: i64,
    unit_revenue: i64,
    unit_cost: i64,
    unit_profit: i64,
    product_ref: String,
    product_name: String,
    product_icon: Option<String>,
}

impl From<SaleItemRow> for SaleItemDetail {
    fn from(row: SaleItemRow) -> Self {
        SaleItemDetail {
            id: row.id,
            product_id: row.product_id.clone(),
            quantity: row.quantity,
            unit_revenue: row.unit_revenue,
            unit_cost: row.unit_cost,
            unit_profit: row.unit_profit,
            product: ProductBrief {
                id: row.product_id,
                reference: row.product_ref,
                name: row.product_name,
                icon: row.product_icon,
            },
        }
    }
}

/// Repository for sale reads and status updates.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale with its items and optional customer.
    pub async fn get_detail(&self, id: &str) -> DbResult<Option<SaleDetail>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {} FROM sales WHERE id = ?1",
            SALE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match sale {
            Some(sale) => Ok(Some(self.hydrate(sale).await?)),
            None => Ok(None),
        }
    }

    /// Lists sales newest first with filters and pagination.
    ///
    /// ## Returns
    /// The page of sale details and the total row count for the filters.
    pub async fn list(&self, filter: &SaleFilter) -> DbResult<(Vec<SaleDetail>, i64)> {
        let page = filter.page.max(1);
        let limit = filter.limit.clamp(1, 50);
        let offset = (page - 1) * limit;

        let sales = sqlx::query_as::<_, Sale>(&format!(
            r#"
            SELECT {}
            FROM sales
            WHERE (?1 IS NULL OR channel = ?1)
              AND (?2 IS NULL OR customer_id = ?2)
              AND (?3 IS NULL OR sold_at >= ?3)
              AND (?4 IS NULL OR sold_at <= ?4)
            ORDER BY sold_at DESC, folio DESC
            LIMIT ?5 OFFSET ?6
            "#,
            SALE_COLUMNS
        ))
        .bind(filter.channel.as_deref())
        .bind(filter.customer_id.as_deref())
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM sales
            WHERE (?1 IS NULL OR channel = ?1)
              AND (?2 IS NULL OR customer_id = ?2)
              AND (?3 IS NULL OR sold_at >= ?3)
              AND (?4 IS NULL OR sold_at <= ?4)
            "#,
        )
        .bind(filter.channel.as_deref())
        .bind(filter.customer_id.as_deref())
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_one(&self.pool)
        .await?;

        let mut details = Vec::with_capacity(sales.len());
        for sale in sales {
            details.push(self.hydrate(sale).await?);
        }

        Ok((details, total))
    }

    /// Revenue/cost/profit aggregate over COMPLETED sales in a date range,
    /// with the per-channel revenue split.
    pub async fn summary(
        &self,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> DbResult<SalesSummary> {
        let rows = sqlx::query_as::<_, (SaleChannel, i64, i64, i64)>(
            r#"
            SELECT channel,
                   COALESCE(SUM(total_revenue), 0),
                   COALESCE(SUM(total_cost), 0),
                   COALESCE(SUM(net_profit), 0)
            FROM sales
            WHERE status = 'COMPLETED'
              AND (?1 IS NULL OR sold_at >= ?1)
              AND (?2 IS NULL OR sold_at <= ?2)
            GROUP BY channel
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.pool)
        .await?;

        let mut by_channel = ChannelRevenue::default();
        let mut total_revenue = 0i64;
        let mut total_cost = 0i64;
        let mut net_profit = 0i64;

        for (channel, revenue, cost, profit) in rows {
            by_channel.add(channel, revenue);
            total_revenue += revenue;
            total_cost += cost;
            net_profit += profit;
        }

        Ok(SalesSummary {
            total_revenue,
            total_cost,
            net_profit,
            margin: margin_percent(
                Money::from_pesos(net_profit),
                Money::from_pesos(total_revenue),
            ),
            by_channel,
        })
    }

    /// Per-product sales ranking over COMPLETED sales, best profit first.
    pub async fn by_product(&self) -> DbResult<Vec<ProductRanking>> {
        let rows = sqlx::query_as::<_, (String, String, String, Option<String>, i64, i64, i64)>(
            r#"
            SELECT p.id, p.ref, p.name, p.icon,
                   SUM(si.quantity),
                   SUM(si.quantity * si.unit_revenue),
                   SUM(si.quantity * si.unit_profit)
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id AND s.status = 'COMPLETED'
            JOIN products p ON p.id = si.product_id
            GROUP BY p.id
            ORDER BY SUM(si.quantity * si.unit_profit) DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(id, reference, name, icon, total_quantity, total_revenue, total_profit)| {
                    ProductRanking {
                        product: ProductBrief {
                            id,
                            reference,
                            name,
                            icon,
                        },
                        total_quantity,
                        total_revenue,
                        total_profit,
                    }
                },
            )
            .collect())
    }

    /// Applies a non-cancelling status change (e.g. PENDING_PAYMENT →
    /// COMPLETED). No stock or ledger side effects; the cancellation path
    /// goes through the ledger repository instead.
    pub async fn set_status(&self, id: &str, status: SaleStatus) -> DbResult<()> {
        debug!(sale_id = %id, status = ?status, "Updating sale status");

        let result = sqlx::query("UPDATE sales SET status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        Ok(())
    }

    /// Attaches items and customer to a bare sale row.
    async fn hydrate(&self, sale: Sale) -> DbResult<SaleDetail> {
        let items = sqlx::query_as::<_, SaleItemRow>(
            r#"
            SELECT si.id, si.product_id, si.quantity, si.unit_revenue, si.unit_cost,
                   si.unit_profit,
                   p.ref AS product_ref, p.name AS product_name, p.icon AS product_icon
            FROM sale_items si
            JOIN products p ON p.id = si.product_id
            WHERE si.sale_id = ?1
            "#,
        )
        .bind(&sale.id)
        .fetch_all(&self.pool)
        .await?;

        let customer = match &sale.customer_id {
            Some(customer_id) => {
                sqlx::query_as::<_, Customer>(
                    "SELECT id, name, phone, instagram, notes, created_at \
                     FROM customers WHERE id = ?1",
                )
                .bind(customer_id)
                .fetch_optional(&self.pool)
                .await?
            }
            None => None,
        };

        Ok(SaleDetail {
            sale,
            items: items.into_iter().map(SaleItemDetail::from).collect(),
            customer,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
