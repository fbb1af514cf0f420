//! # Purchase Repository
//!
//! Read side of supplier purchases. Purchases are immutable once recorded
//! (recording happens in the ledger repository), so this is lists, details
//! and the investment summary.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::DbResult;
use avemaria_core::reports::PurchasesSummary;
use avemaria_core::types::{ProductBrief, Purchase, PurchaseDetail, PurchaseItemDetail};

/// Columns selected for a full [`Purchase`] row.
const PURCHASE_COLUMNS: &str =
    "id, order_number, user_id, shipping_cost, total_cost, payment_method, notes, purchased_at";

/// A purchase line joined with its product, as read from SQL.
#[derive(Debug, sqlx::FromRow)]
struct PurchaseItemRow {
    id: String,
    product_id: String,
    quantity: i64,
    unit_cost: i64,
    product_ref: String,
    product_name: String,
    product_icon: Option<String>,
}

impl From<PurchaseItemRow> for PurchaseItemDetail {
    fn from(row: PurchaseItemRow) -> Self {
        PurchaseItemDetail {
            id: row.id,
            product_id: row.product_id.clone(),
            quantity: row.quantity,
            unit_cost: row.unit_cost,
            product: ProductBrief {
                id: row.product_id,
                reference: row.product_ref,
                name: row.product_name,
                icon: row.product_icon,
            },
        }
    }
}

/// Repository for purchase reads.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Gets a purchase with its line items.
    pub async fn get_detail(&self, id: &str) -> DbResult<Option<PurchaseDetail>> {
        let purchase = sqlx::query_as::<_, Purchase>(&format!(
            "SELECT {} FROM purchases WHERE id = ?1",
            PURCHASE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match purchase {
            Some(purchase) => Ok(Some(self.hydrate(purchase).await?)),
            None => Ok(None),
        }
    }

    /// Lists purchases newest first with an optional date range.
    ///
    /// ## Returns
    /// The page of purchase details and the total row count for the range.
    pub async fn list(
        &self,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
        page: i64,
        limit: i64,
    ) -> DbResult<(Vec<PurchaseDetail>, i64)> {
        let page = page.max(1);
        let limit = limit.clamp(1, 50);
        let offset = (page - 1) * limit;

        let purchases = sqlx::query_as::<_, Purchase>(&format!(
            r#"
            SELECT {}
            FROM purchases
            WHERE (?1 IS NULL OR purchased_at >= ?1)
              AND (?2 IS NULL OR purchased_at <= ?2)
            ORDER BY purchased_at DESC, id DESC
            LIMIT ?3 OFFSET ?4
            "#,
            PURCHASE_COLUMNS
        ))
        .bind(start_date)
        .bind(end_date)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM purchases
            WHERE (?1 IS NULL OR purchased_at >= ?1)
              AND (?2 IS NULL OR purchased_at <= ?2)
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&self.pool)
        .await?;

        let mut details = Vec::with_capacity(purchases.len());
        for purchase in purchases {
            details.push(self.hydrate(purchase).await?);
        }

        Ok((details, total))
    }

    /// Total invested with AVEMARÍA, total units received and the date of
    /// the most recent order.
    pub async fn summary(&self) -> DbResult<PurchasesSummary> {
        let (total_invested, total_units, last_purchase_date) =
            sqlx::query_as::<_, (i64, i64, Option<DateTime<Utc>>)>(
                r#"
                SELECT
                    (SELECT COALESCE(SUM(total_cost), 0) FROM purchases),
                    (SELECT COALESCE(SUM(quantity), 0) FROM purchase_items),
                    (SELECT MAX(purchased_at) FROM purchases)
                "#,
            )
            .fetch_one(&self.pool)
            .await?;

        Ok(PurchasesSummary {
            total_invested,
            total_units,
            last_purchase_date,
        })
    }

    /// Attaches line items to a bare purchase row.
    async fn hydrate(&self, purchase: Purchase) -> DbResult<PurchaseDetail> {
        let items = sqlx::query_as::<_, PurchaseItemRow>(
            r#"
            SELECT pi.id, pi.product_id, pi.quantity, pi.unit_cost,
                   p.ref AS product_ref, p.name AS product_name, p.icon AS product_icon
            FROM purchase_items pi
            JOIN products p ON p.id = pi.product_id
            WHERE pi.purchase_id = ?1
            "#,
        )
        .bind(&purchase.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(PurchaseDetail {
            purchase,
            items: items.into_iter().map(PurchaseItemDetail::from).collect(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
