//! # Reports Repository
//!
//! Read-only aggregations over the ledger, sales and purchases: the
//! accounting summary, the 12-month income/expense series, the per-hundred
//! breakdown and the consolidated dashboard.
//!
//! Sums and group-bys run in SQL; the derived math (margins, per-100,
//! month labels) is pure logic in `avemaria_core::reports`. Monthly buckets
//! group on `substr(date, 1, 7)`, which is exactly the `YYYY-MM` prefix of
//! the stored RFC 3339 timestamps.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::DbResult;
use avemaria_core::money::Money;
use avemaria_core::reports::{
    margin_percent, month_key, month_label, months_back, per_hundred_breakdown, AccountingSummary,
    ActivityItem, CategoryAmount, Dashboard, DashboardChannels, LowStockProduct,
    MonthlyAccounting, MonthlyPoint, PerHundredLine, TopProduct,
};
use avemaria_core::types::{EntryType, ExpenseCategory, ProductBrief, SaleChannel};

/// Repository for read-only report aggregations.
#[derive(Debug, Clone)]
pub struct ReportsRepository {
    pool: SqlitePool,
}

impl ReportsRepository {
    /// Creates a new ReportsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportsRepository { pool }
    }

    // =========================================================================
    // Accounting
    // =========================================================================

    /// Ledger totals grouped by type and category over an optional range.
    async fn totals_by_type_and_category(
        &self,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> DbResult<Vec<(EntryType, ExpenseCategory, i64)>> {
        let rows = sqlx::query_as::<_, (EntryType, ExpenseCategory, i64)>(
            r#"
            SELECT type, category, COALESCE(SUM(amount), 0)
            FROM transactions
            WHERE (?1 IS NULL OR date >= ?1)
              AND (?2 IS NULL OR date <= ?2)
            GROUP BY type, category
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Income vs expense totals over a date range, with the expense
    /// breakdown by category and the profit margin.
    pub async fn accounting_summary(
        &self,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> DbResult<AccountingSummary> {
        let rows = self
            .totals_by_type_and_category(start_date, end_date)
            .await?;

        let mut total_income = 0i64;
        let mut total_expense = 0i64;
        let mut expense_breakdown: Vec<CategoryAmount> = Vec::new();

        for (entry_type, category, amount) in rows {
            match entry_type {
                EntryType::Income => total_income += amount,
                EntryType::Expense => {
                    total_expense += amount;
                    expense_breakdown.push(CategoryAmount { category, amount });
                }
            }
        }

        let net_profit = total_income - total_expense;

        Ok(AccountingSummary {
            total_income,
            total_expense,
            net_profit,
            margin: margin_percent(
                Money::from_pesos(net_profit),
                Money::from_pesos(total_income),
            ),
            expense_breakdown,
        })
    }

    /// Income vs expense for each of the last 12 calendar months.
    ///
    /// Months without movement are present with zeroes, so the chart always
    /// shows a full year.
    pub async fn accounting_by_month(&self, now: DateTime<Utc>) -> DbResult<Vec<MonthlyAccounting>> {
        let months = months_back(now, 12);
        let since = month_key(months[0].0, months[0].1);

        let rows = sqlx::query_as::<_, (String, EntryType, i64)>(
            r#"
            SELECT substr(date, 1, 7) AS month, type, COALESCE(SUM(amount), 0)
            FROM transactions
            WHERE substr(date, 1, 7) >= ?1
            GROUP BY substr(date, 1, 7), type
            "#,
        )
        .bind(&since)
        .fetch_all(&self.pool)
        .await?;

        // key → (income, expense)
        let mut buckets: HashMap<String, (i64, i64)> = HashMap::new();
        for (month, entry_type, amount) in rows {
            let bucket = buckets.entry(month).or_default();
            match entry_type {
                EntryType::Income => bucket.0 += amount,
                EntryType::Expense => bucket.1 += amount,
            }
        }

        Ok(months
            .into_iter()
            .map(|(year, month)| {
                let key = month_key(year, month);
                let (income, expense) = buckets.get(&key).copied().unwrap_or_default();
                MonthlyAccounting {
                    label: month_label(year, month, true),
                    month: key,
                    income,
                    expense,
                    profit: income - expense,
                }
            })
            .collect())
    }

    /// The per-hundred breakdown over the whole ledger: how each expense
    /// category eats into every $100 of income, plus the GANANCIA line.
    pub async fn per_hundred(&self) -> DbResult<Vec<PerHundredLine>> {
        let rows = self.totals_by_type_and_category(None, None).await?;

        let mut total_income = 0i64;
        let mut expenses: Vec<CategoryAmount> = Vec::new();

        for (entry_type, category, amount) in rows {
            match entry_type {
                EntryType::Income => total_income += amount,
                EntryType::Expense => expenses.push(CategoryAmount { category, amount }),
            }
        }

        Ok(per_hundred_breakdown(
            &expenses,
            Money::from_pesos(total_income),
        ))
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Consolidated KPIs for the current month, plus low-stock alerts, the
    /// activity feed and the 6-month chart series.
    pub async fn dashboard(&self, now: DateTime<Utc>) -> DbResult<Dashboard> {
        let months = months_back(now, 6);
        let (current_year, current_month) = months[months.len() - 1];
        let current_key = month_key(current_year, current_month);

        // Month-to-date revenue and profit over completed sales
        let (total_revenue, total_profit) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COALESCE(SUM(total_revenue), 0), COALESCE(SUM(net_profit), 0)
            FROM sales
            WHERE status = 'COMPLETED' AND substr(sold_at, 1, 7) = ?1
            "#,
        )
        .bind(&current_key)
        .fetch_one(&self.pool)
        .await?;

        // Revenue split by channel
        let channel_rows = sqlx::query_as::<_, (SaleChannel, i64)>(
            r#"
            SELECT channel, COALESCE(SUM(total_revenue), 0)
            FROM sales
            WHERE status = 'COMPLETED' AND substr(sold_at, 1, 7) = ?1
            GROUP BY channel
            "#,
        )
        .bind(&current_key)
        .fetch_all(&self.pool)
        .await?;

        let mut revenue_by_channel = DashboardChannels::default();
        for (channel, revenue) in channel_rows {
            revenue_by_channel.add(channel, revenue);
        }

        // Units sold this month
        let units_sold: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(si.quantity), 0)
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            WHERE s.status = 'COMPLETED' AND substr(s.sold_at, 1, 7) = ?1
            "#,
        )
        .bind(&current_key)
        .fetch_one(&self.pool)
        .await?;

        // Paid to the supplier this month
        let total_paid_to_avemaria: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_cost), 0)
            FROM purchases
            WHERE substr(purchased_at, 1, 7) = ?1
            "#,
        )
        .bind(&current_key)
        .fetch_one(&self.pool)
        .await?;

        // Low-stock alerts
        let low_stock_rows =
            sqlx::query_as::<_, (String, String, String, Option<String>, i64, i64)>(
                r#"
                SELECT id, ref, name, icon, stock, min_stock
                FROM products
                WHERE is_active = 1 AND stock <= min_stock
                ORDER BY stock ASC
                "#,
            )
            .fetch_all(&self.pool)
            .await?;

        let low_stock_products = low_stock_rows
            .into_iter()
            .map(
                |(id, reference, name, icon, stock, min_stock)| LowStockProduct {
                    id,
                    reference,
                    name,
                    icon,
                    stock,
                    min_stock,
                },
            )
            .collect();

        // Top 5 products by profit this month
        let top_rows = sqlx::query_as::<_, (String, String, String, Option<String>, i64, i64)>(
            r#"
            SELECT p.id, p.ref, p.name, p.icon,
                   SUM(si.quantity * si.unit_profit) AS profit,
                   SUM(si.quantity)
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
                 AND s.status = 'COMPLETED' AND substr(s.sold_at, 1, 7) = ?1
            JOIN products p ON p.id = si.product_id
            GROUP BY p.id
            ORDER BY profit DESC
            LIMIT 5
            "#,
        )
        .bind(&current_key)
        .fetch_all(&self.pool)
        .await?;

        let top_products = top_rows
            .into_iter()
            .map(
                |(id, reference, name, icon, total_profit, total_quantity)| TopProduct {
                    product: ProductBrief {
                        id,
                        reference,
                        name,
                        icon,
                    },
                    total_profit,
                    total_quantity,
                },
            )
            .collect();

        let recent_activity = self.recent_activity().await?;

        // 6-month revenue/profit series over completed sales
        let since = month_key(months[0].0, months[0].1);
        let series_rows = sqlx::query_as::<_, (String, i64, i64)>(
            r#"
            SELECT substr(sold_at, 1, 7) AS month,
                   COALESCE(SUM(total_revenue), 0),
                   COALESCE(SUM(net_profit), 0)
            FROM sales
            WHERE status = 'COMPLETED' AND substr(sold_at, 1, 7) >= ?1
            GROUP BY substr(sold_at, 1, 7)
            "#,
        )
        .bind(&since)
        .fetch_all(&self.pool)
        .await?;

        let mut series: HashMap<String, (i64, i64)> = HashMap::new();
        for (month, revenue, profit) in series_rows {
            series.insert(month, (revenue, profit));
        }

        let mut monthly_revenue = Vec::with_capacity(months.len());
        let mut monthly_profit = Vec::with_capacity(months.len());
        for (year, month) in &months {
            let key = month_key(*year, *month);
            let (revenue, profit) = series.get(&key).copied().unwrap_or_default();
            let label = month_label(*year, *month, false);
            monthly_revenue.push(MonthlyPoint {
                month: key.clone(),
                label: label.clone(),
                value: revenue,
            });
            monthly_profit.push(MonthlyPoint {
                month: key,
                label,
                value: profit,
            });
        }

        Ok(Dashboard {
            total_revenue,
            total_profit,
            profit_margin: margin_percent(
                Money::from_pesos(total_profit),
                Money::from_pesos(total_revenue),
            ),
            total_paid_to_avemaria,
            units_sold,
            low_stock_products,
            revenue_by_channel,
            top_products,
            recent_activity,
            monthly_revenue,
            monthly_profit,
        })
    }

    /// The 8 most recent movements: last sales and purchases merged by date.
    async fn recent_activity(&self) -> DbResult<Vec<ActivityItem>> {
        let sale_rows =
            sqlx::query_as::<_, (String, i64, DateTime<Utc>, i64, SaleChannel, Option<String>)>(
                r#"
                SELECT s.id, s.folio, s.sold_at, s.total_revenue, s.channel, c.name
                FROM sales s
                LEFT JOIN customers c ON c.id = s.customer_id
                ORDER BY s.sold_at DESC, s.folio DESC
                LIMIT 8
                "#,
            )
            .fetch_all(&self.pool)
            .await?;

        let purchase_rows = sqlx::query_as::<_, (String, Option<String>, DateTime<Utc>, i64)>(
            r#"
            SELECT id, order_number, purchased_at, total_cost
            FROM purchases
            ORDER BY purchased_at DESC, id DESC
            LIMIT 4
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut activity: Vec<ActivityItem> = sale_rows
            .into_iter()
            .map(|(id, folio, date, amount, channel, customer)| ActivityItem {
                activity_type: "sale".to_string(),
                id,
                date,
                description: format!(
                    "Venta #{}{}",
                    folio,
                    customer.map(|n| format!(" — {}", n)).unwrap_or_default()
                ),
                amount,
                channel: Some(channel),
            })
            .chain(
                purchase_rows
                    .into_iter()
                    .map(|(id, order_number, date, amount)| ActivityItem {
                        activity_type: "purchase".to_string(),
                        id,
                        date,
                        description: format!(
                            "Compra AVEMARÍA{}",
                            order_number.map(|n| format!(" {}", n)).unwrap_or_default()
                        ),
                        amount,
                        channel: None,
                    }),
            )
            .collect();

        activity.sort_by(|a, b| b.date.cmp(&a.date));
        activity.truncate(8);

        Ok(activity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::{product_input, test_db};
    use avemaria_core::types::{
        NewExpense, NewPurchase, NewPurchaseItem, NewSale, NewSaleItem, PurchasePaymentMethod,
        SalePaymentMethod,
    };

    /// One purchase (expense 1.020.000), one sale (income 240.000) and one
    /// manual expense (35.000 packaging).
    async fn seed_ledger(db: &crate::Database) {
        let product = db
            .products()
            .insert(&product_input("CAN-001", 22_000, 60_000, 10))
            .await
            .unwrap();

        db.ledger()
            .record_purchase(&NewPurchase {
                order_number: Some("PED-42".to_string()),
                items: vec![NewPurchaseItem {
                    product_id: product.id.clone(),
                    quantity: 20,
                    unit_cost: 50_000,
                }],
                shipping_cost: 20_000,
                payment_method: PurchasePaymentMethod::Transferencia,
                notes: None,
            })
            .await
            .unwrap();

        db.ledger()
            .record_sale(&NewSale {
                customer_id: None,
                channel: SaleChannel::Instagram,
                payment_method: SalePaymentMethod::Nequi,
                items: vec![NewSaleItem {
                    product_id: product.id,
                    quantity: 4,
                    unit_revenue: 60_000,
                }],
                notes: None,
            })
            .await
            .unwrap();

        db.ledger()
            .insert_expense(&NewExpense {
                amount: 35_000,
                category: ExpenseCategory::Empaques,
                description: "Bolsas kraft".to_string(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_accounting_summary() {
        let db = test_db().await;
        seed_ledger(&db).await;

        let summary = db.reports().accounting_summary(None, None).await.unwrap();
        assert_eq!(summary.total_income, 240_000);
        assert_eq!(summary.total_expense, 1_020_000 + 35_000);
        assert_eq!(summary.net_profit, 240_000 - 1_055_000);

        let mut categories: Vec<_> = summary
            .expense_breakdown
            .iter()
            .map(|e| (e.category, e.amount))
            .collect();
        categories.sort_by_key(|(_, amount)| *amount);
        assert_eq!(
            categories,
            vec![
                (ExpenseCategory::Empaques, 35_000),
                (ExpenseCategory::CompraAvemaria, 1_020_000),
            ]
        );
    }

    #[tokio::test]
    async fn test_accounting_by_month_fills_empty_buckets() {
        let db = test_db().await;
        seed_ledger(&db).await;

        let now = Utc::now();
        let months = db.reports().accounting_by_month(now).await.unwrap();
        assert_eq!(months.len(), 12);

        // Only the current month has movement
        let current = months.last().unwrap();
        assert_eq!(current.income, 240_000);
        assert_eq!(current.expense, 1_055_000);
        assert_eq!(current.profit, 240_000 - 1_055_000);

        for earlier in &months[..11] {
            assert_eq!(earlier.income, 0);
            assert_eq!(earlier.expense, 0);
        }
    }

    #[tokio::test]
    async fn test_per_hundred_lines() {
        let db = test_db().await;

        // Controlled numbers: income 100.000, expenses 40.000 + 10.000
        let product = db
            .products()
            .insert(&product_input("CAN-001", 10_000, 100_000, 5))
            .await
            .unwrap();
        db.ledger()
            .record_sale(&NewSale {
                customer_id: None,
                channel: SaleChannel::Whatsapp,
                payment_method: SalePaymentMethod::Efectivo,
                items: vec![NewSaleItem {
                    product_id: product.id,
                    quantity: 1,
                    unit_revenue: 100_000,
                }],
                notes: None,
            })
            .await
            .unwrap();
        db.ledger()
            .insert_expense(&NewExpense {
                amount: 40_000,
                category: ExpenseCategory::Publicidad,
                description: "Pauta Instagram".to_string(),
            })
            .await
            .unwrap();
        db.ledger()
            .insert_expense(&NewExpense {
                amount: 10_000,
                category: ExpenseCategory::Envios,
                description: "Domicilio".to_string(),
            })
            .await
            .unwrap();

        let lines = db.reports().per_hundred().await.unwrap();
        assert_eq!(lines.len(), 3);

        let ganancia = lines.last().unwrap();
        assert_eq!(ganancia.category, "GANANCIA");
        assert_eq!(ganancia.amount, 50_000);
        assert_eq!(ganancia.per_100, 50.0);

        let publicidad = lines.iter().find(|l| l.category == "PUBLICIDAD").unwrap();
        assert_eq!(publicidad.per_100, 40.0);
    }

    #[tokio::test]
    async fn test_per_hundred_empty_without_income() {
        let db = test_db().await;
        db.ledger()
            .insert_expense(&NewExpense {
                amount: 10_000,
                category: ExpenseCategory::Otro,
                description: "Gasto suelto".to_string(),
            })
            .await
            .unwrap();

        assert!(db.reports().per_hundred().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dashboard() {
        let db = test_db().await;
        seed_ledger(&db).await;

        let dashboard = db.reports().dashboard(Utc::now()).await.unwrap();

        assert_eq!(dashboard.total_revenue, 240_000);
        assert_eq!(dashboard.total_profit, 152_000);
        assert_eq!(dashboard.profit_margin, 63.33);
        assert_eq!(dashboard.total_paid_to_avemaria, 1_020_000);
        assert_eq!(dashboard.units_sold, 4);

        assert_eq!(dashboard.revenue_by_channel.instagram, 240_000);
        assert_eq!(dashboard.revenue_by_channel.whatsapp, 0);

        // Stock went 10 + 20 - 4 = 26, far above min_stock 3
        assert!(dashboard.low_stock_products.is_empty());

        assert_eq!(dashboard.top_products.len(), 1);
        assert_eq!(dashboard.top_products[0].total_profit, 152_000);

        // One sale + one purchase in the feed, newest first
        assert_eq!(dashboard.recent_activity.len(), 2);
        assert!(dashboard
            .recent_activity
            .iter()
            .any(|a| a.activity_type == "purchase" && a.amount == 1_020_000));

        assert_eq!(dashboard.monthly_revenue.len(), 6);
        assert_eq!(dashboard.monthly_revenue.last().unwrap().value, 240_000);
        assert_eq!(dashboard.monthly_profit.last().unwrap().value, 152_000);
    }

    #[tokio::test]
    async fn test_dashboard_low_stock_alert() {
        let db = test_db().await;
        db.products()
            .insert(&product_input("TOP-001", 10_000, 30_000, 2))
            .await
            .unwrap();

        let dashboard = db.reports().dashboard(Utc::now()).await.unwrap();
        assert_eq!(dashboard.low_stock_products.len(), 1);
        assert_eq!(dashboard.low_stock_products[0].reference, "TOP-001");
        assert_eq!(dashboard.low_stock_products[0].stock, 2);
        assert_eq!(dashboard.low_stock_products[0].min_stock, 3);
    }
}
