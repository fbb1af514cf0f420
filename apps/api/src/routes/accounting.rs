//! # Accounting Routes
//!
//! `/api/accounting` - the ledger listing, manual expenses and the
//! aggregate reports (summary, 12-month series, per-hundred breakdown).

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use avemaria_core::types::NewExpense;
use avemaria_core::validation::validate_new_expense;
use avemaria_db::LedgerFilter;

use crate::error::ApiError;
use crate::response::{created, ok, ok_with_meta, Meta};
use crate::routes::common::parse_date_param;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions).post(create_expense))
        .route("/summary", get(summary))
        .route("/by-month", get(by_month))
        .route("/per-peso", get(per_peso))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LedgerQuery {
    #[serde(rename = "type")]
    entry_type: Option<String>,
    category: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DateRangeQuery {
    start_date: Option<String>,
    end_date: Option<String>,
}

/// GET /api/accounting/transactions - ledger entries, newest first.
async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<LedgerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = LedgerFilter {
        entry_type: query.entry_type,
        category: query.category,
        start_date: parse_date_param("startDate", query.start_date.as_deref())?,
        end_date: parse_date_param("endDate", query.end_date.as_deref())?,
    };

    let entries = state.db.ledger().list_entries(&filter).await?;
    let total = entries.len() as i64;

    Ok(ok_with_meta(
        entries,
        Meta {
            total,
            page: None,
            limit: None,
        },
    ))
}

/// POST /api/accounting/transactions - register a manual expense.
async fn create_expense(
    State(state): State<AppState>,
    Json(input): Json<NewExpense>,
) -> Result<impl IntoResponse, ApiError> {
    validate_new_expense(&input)?;
    let entry = state.db.ledger().insert_expense(&input).await?;
    Ok(created(entry))
}

/// GET /api/accounting/summary - income vs expense over a range.
async fn summary(
    State(state): State<AppState>,
    Query(query): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let start = parse_date_param("startDate", query.start_date.as_deref())?;
    let end = parse_date_param("endDate", query.end_date.as_deref())?;

    let summary = state.db.reports().accounting_summary(start, end).await?;
    Ok(ok(summary))
}

/// GET /api/accounting/by-month - last 12 months of income vs expense.
async fn by_month(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let months = state.db.reports().accounting_by_month(Utc::now()).await?;
    Ok(ok(months))
}

/// GET /api/accounting/per-peso - where each $100 of income goes.
async fn per_peso(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let lines = state.db.reports().per_hundred().await?;
    Ok(ok(json!({ "perHundred": lines })))
}
