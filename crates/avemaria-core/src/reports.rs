//! # Report Types and Math
//!
//! Read models for the accounting/dashboard reports and the pure math that
//! fills their derived fields (margins, per-hundred breakdown, month keys).
//!
//! The database layer runs the aggregation SQL; everything here is
//! arithmetic over the resulting sums, so it stays unit-testable without a
//! store.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{ExpenseCategory, ProductBrief, SaleChannel};

// =============================================================================
// Percentage Math
// =============================================================================

/// Profit margin as a percentage of revenue, rounded to 2 decimals.
///
/// Returns 0 when revenue is zero (a margin over nothing is meaningless).
///
/// ## Example
/// ```rust
/// use avemaria_core::money::Money;
/// use avemaria_core::reports::margin_percent;
///
/// let margin = margin_percent(Money::from_pesos(152_000), Money::from_pesos(240_000));
/// assert_eq!(margin, 63.33);
/// ```
pub fn margin_percent(profit: Money, revenue: Money) -> f64 {
    if revenue.is_zero() {
        return 0.0;
    }

    let ratio = profit.pesos() as f64 / revenue.pesos() as f64;
    (ratio * 10_000.0).round() / 100.0
}

/// How much of every $100 of income a given amount represents, rounded to
/// 2 decimals. Used by the per-hundred breakdown report.
pub fn per_hundred(amount: Money, income: Money) -> f64 {
    margin_percent(amount, income)
}

// =============================================================================
// Month Helpers
// =============================================================================

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// The `YYYY-MM` key for a (year, month) pair.
///
/// Matches the first 7 characters of the RFC 3339 timestamps stored in the
/// database, so SQL can group on `substr(date, 1, 7)` and reports can merge
/// the buckets by key.
pub fn month_key(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

/// Short display label for a month bucket, e.g. `Aug 2026` or `Aug`.
pub fn month_label(year: i32, month: u32, with_year: bool) -> String {
    let name = MONTH_NAMES[(month as usize).saturating_sub(1) % 12];
    if with_year {
        format!("{} {}", name, year)
    } else {
        name.to_string()
    }
}

/// The last `count` calendar months up to and including `now`, oldest first.
pub fn months_back(now: DateTime<Utc>, count: usize) -> Vec<(i32, u32)> {
    let mut year = now.year();
    let mut month = now.month();
    let mut out = Vec::with_capacity(count);

    for _ in 0..count {
        out.push((year, month));
        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
    }

    out.reverse();
    out
}

// =============================================================================
// Sales Reports
// =============================================================================

/// Revenue totals per sale channel (UPPERCASE wire keys, as the clients
/// expect from the sales summary).
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChannelRevenue {
    #[serde(rename = "WHATSAPP")]
    pub whatsapp: i64,
    #[serde(rename = "INSTAGRAM")]
    pub instagram: i64,
    #[serde(rename = "PRESENCIAL")]
    pub presencial: i64,
}

impl ChannelRevenue {
    /// Adds revenue to the bucket for a channel.
    pub fn add(&mut self, channel: SaleChannel, revenue: i64) {
        match channel {
            SaleChannel::Whatsapp => self.whatsapp += revenue,
            SaleChannel::Instagram => self.instagram += revenue,
            SaleChannel::Presencial => self.presencial += revenue,
        }
    }
}

/// Aggregate over completed sales in a date range.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub total_revenue: i64,
    pub total_cost: i64,
    pub net_profit: i64,
    /// net_profit as a percentage of total_revenue, 2 decimals.
    pub margin: f64,
    pub by_channel: ChannelRevenue,
}

/// Per-product sales ranking line (quantity, revenue and profit sold).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductRanking {
    pub product: ProductBrief,
    pub total_quantity: i64,
    pub total_revenue: i64,
    pub total_profit: i64,
}

// =============================================================================
// Purchase / Inventory Reports
// =============================================================================

/// Aggregate over all recorded purchases.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchasesSummary {
    pub total_invested: i64,
    pub total_units: i64,
    #[ts(as = "Option<String>")]
    pub last_purchase_date: Option<DateTime<Utc>>,
}

/// Inventory valuation over active products.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductStats {
    pub total_units: i64,
    /// Stock valued at wholesale cost.
    pub total_cost_value: i64,
    /// Stock valued at retail price.
    pub total_retail_value: i64,
}

// =============================================================================
// Accounting Reports
// =============================================================================

/// One expense category with its summed amount.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAmount {
    pub category: ExpenseCategory,
    pub amount: i64,
}

/// Income/expense totals over a date range, with the expense breakdown.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AccountingSummary {
    pub total_income: i64,
    pub total_expense: i64,
    pub net_profit: i64,
    pub margin: f64,
    pub expense_breakdown: Vec<CategoryAmount>,
}

/// One month of income vs expense for the 12-month report.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAccounting {
    /// `YYYY-MM` bucket key.
    pub month: String,
    /// Display label, e.g. `Aug 2026`.
    pub label: String,
    pub income: i64,
    pub expense: i64,
    pub profit: i64,
}

/// One line of the per-hundred breakdown: where each $100 of income goes.
/// The category is a string because the report appends a synthetic GANANCIA
/// (profit) line after the expense categories.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PerHundredLine {
    pub category: String,
    pub amount: i64,
    pub per_100: f64,
}

/// Builds the per-hundred breakdown from expense category sums and total
/// income. Returns an empty list when there is no income yet.
pub fn per_hundred_breakdown(
    expense_by_category: &[CategoryAmount],
    total_income: Money,
) -> Vec<PerHundredLine> {
    if total_income.is_zero() {
        return Vec::new();
    }

    let mut lines: Vec<PerHundredLine> = expense_by_category
        .iter()
        .map(|entry| PerHundredLine {
            category: entry.category.wire_name().to_string(),
            amount: entry.amount,
            per_100: per_hundred(Money::from_pesos(entry.amount), total_income),
        })
        .collect();

    let total_expense: Money = expense_by_category
        .iter()
        .map(|entry| Money::from_pesos(entry.amount))
        .sum();
    let profit = total_income - total_expense;

    lines.push(PerHundredLine {
        category: "GANANCIA".to_string(),
        amount: profit.pesos(),
        per_100: per_hundred(profit, total_income),
    });

    lines
}

// =============================================================================
// Dashboard
// =============================================================================

/// A product at or below its low-stock threshold.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LowStockProduct {
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    pub name: String,
    pub icon: Option<String>,
    pub stock: i64,
    pub min_stock: i64,
}

/// Month-to-date revenue per channel (lowercase wire keys, as the dashboard
/// widget expects).
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardChannels {
    pub whatsapp: i64,
    pub instagram: i64,
    pub presencial: i64,
}

impl DashboardChannels {
    /// Adds revenue to the bucket for a channel.
    pub fn add(&mut self, channel: SaleChannel, revenue: i64) {
        match channel {
            SaleChannel::Whatsapp => self.whatsapp += revenue,
            SaleChannel::Instagram => self.instagram += revenue,
            SaleChannel::Presencial => self.presencial += revenue,
        }
    }
}

/// A top-selling product by profit.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub product: ProductBrief,
    pub total_profit: i64,
    pub total_quantity: i64,
}

/// A recent sale or purchase shown in the activity feed.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    /// `"sale"` or `"purchase"`.
    #[serde(rename = "type")]
    pub activity_type: String,
    pub id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub description: String,
    pub amount: i64,
    pub channel: Option<SaleChannel>,
}

/// One point of a monthly chart series.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPoint {
    pub month: String,
    pub label: String,
    pub value: i64,
}

/// Consolidated dashboard KPIs for the current month.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub total_revenue: i64,
    pub total_profit: i64,
    pub profit_margin: f64,
    pub total_paid_to_avemaria: i64,
    pub units_sold: i64,
    pub low_stock_products: Vec<LowStockProduct>,
    pub revenue_by_channel: DashboardChannels,
    pub top_products: Vec<TopProduct>,
    pub recent_activity: Vec<ActivityItem>,
    pub monthly_revenue: Vec<MonthlyPoint>,
    pub monthly_profit: Vec<MonthlyPoint>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_margin_percent() {
        // The reference sale: 4 units at $60.000 costing $22.000 each
        let margin = margin_percent(Money::from_pesos(152_000), Money::from_pesos(240_000));
        assert_eq!(margin, 63.33);

        // No revenue yet
        assert_eq!(margin_percent(Money::from_pesos(100), Money::zero()), 0.0);

        // Round trips exactly at whole percentages
        assert_eq!(
            margin_percent(Money::from_pesos(50), Money::from_pesos(200)),
            25.0
        );
    }

    #[test]
    fn test_month_key_and_label() {
        assert_eq!(month_key(2026, 8), "2026-08");
        assert_eq!(month_label(2026, 8, true), "Aug 2026");
        assert_eq!(month_label(2026, 8, false), "Aug");
        assert_eq!(month_label(2025, 12, true), "Dec 2025");
    }

    #[test]
    fn test_months_back_crosses_year_boundary() {
        let now = Utc.with_ymd_and_hms(2026, 2, 15, 12, 0, 0).unwrap();
        let months = months_back(now, 4);
        assert_eq!(
            months,
            vec![(2025, 11), (2025, 12), (2026, 1), (2026, 2)]
        );
    }

    #[test]
    fn test_per_hundred_breakdown() {
        let expenses = vec![
            CategoryAmount {
                category: ExpenseCategory::CompraAvemaria,
                amount: 40_000,
            },
            CategoryAmount {
                category: ExpenseCategory::Envios,
                amount: 10_000,
            },
        ];

        let lines = per_hundred_breakdown(&expenses, Money::from_pesos(100_000));
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].category, "COMPRA_AVEMARIA");
        assert_eq!(lines[0].per_100, 40.0);
        assert_eq!(lines[1].per_100, 10.0);

        let profit_line = &lines[2];
        assert_eq!(profit_line.category, "GANANCIA");
        assert_eq!(profit_line.amount, 50_000);
        assert_eq!(profit_line.per_100, 50.0);
    }

    #[test]
    fn test_per_hundred_breakdown_no_income() {
        let expenses = vec![CategoryAmount {
            category: ExpenseCategory::Otro,
            amount: 5_000,
        }];
        assert!(per_hundred_breakdown(&expenses, Money::zero()).is_empty());
    }

    #[test]
    fn test_channel_revenue_buckets() {
        let mut revenue = ChannelRevenue::default();
        revenue.add(SaleChannel::Whatsapp, 60_000);
        revenue.add(SaleChannel::Whatsapp, 40_000);
        revenue.add(SaleChannel::Presencial, 25_000);

        assert_eq!(revenue.whatsapp, 100_000);
        assert_eq!(revenue.instagram, 0);
        assert_eq!(revenue.presencial, 25_000);
    }
}
