//! # Sales Routes
//!
//! `/api/sales` - recording, listing, summaries and status changes.
//!
//! POST goes through the inventory ledger (atomic stock decrement + income
//! entry). PATCH /:id/status routes a CANCELLED target through the ledger's
//! cancellation (stock restoration + entry zeroing); any other status is a
//! plain field update.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Deserialize;

use avemaria_core::types::{NewSale, SaleStatus, SaleStatusUpdate};
use avemaria_core::validation::validate_new_sale;
use avemaria_db::SaleFilter;

use crate::error::ApiError;
use crate::response::{created, ok, ok_with_meta, Meta};
use crate::routes::common::parse_date_param;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sales).post(create_sale))
        .route("/summary", get(summary))
        .route("/by-product", get(by_product))
        .route("/:id", get(get_sale))
        .route("/:id/status", patch(update_status))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaleListQuery {
    channel: Option<String>,
    customer_id: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    page: Option<i64>,
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DateRangeQuery {
    start_date: Option<String>,
    end_date: Option<String>,
}

/// GET /api/sales - paginated list, newest first.
async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<SaleListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = SaleFilter {
        channel: query.channel,
        customer_id: query.customer_id,
        start_date: parse_date_param("startDate", query.start_date.as_deref())?,
        end_date: parse_date_param("endDate", query.end_date.as_deref())?,
        page: query.page.unwrap_or(1),
        limit: query.limit.unwrap_or(20),
    };

    let (sales, total) = state.db.sales().list(&filter).await?;

    Ok(ok_with_meta(
        sales,
        Meta {
            total,
            page: Some(filter.page.max(1)),
            limit: Some(filter.limit.clamp(1, 50)),
        },
    ))
}

/// GET /api/sales/summary - completed-sale totals and per-channel revenue.
async fn summary(
    State(state): State<AppState>,
    Query(query): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let start = parse_date_param("startDate", query.start_date.as_deref())?;
    let end = parse_date_param("endDate", query.end_date.as_deref())?;

    let summary = state.db.sales().summary(start, end).await?;
    Ok(ok(summary))
}

/// GET /api/sales/by-product - best sellers ranked by profit.
async fn by_product(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let ranking = state.db.sales().by_product().await?;
    Ok(ok(ranking))
}

/// POST /api/sales - record a sale through the inventory ledger.
async fn create_sale(
    State(state): State<AppState>,
    Json(input): Json<NewSale>,
) -> Result<impl IntoResponse, ApiError> {
    validate_new_sale(&input)?;
    let sale = state.db.ledger().record_sale(&input).await?;
    Ok(created(sale))
}

/// GET /api/sales/:id - sale detail with items and customer.
async fn get_sale(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let sale = state
        .db
        .sales()
        .get_detail(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", &id))?;

    Ok(ok(sale))
}

/// PATCH /api/sales/:id/status - status change; CANCELLED restores stock.
async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<SaleStatusUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    match update.status {
        SaleStatus::Cancelled => state.db.ledger().cancel_sale(&id).await?,
        status => state.db.sales().set_status(&id, status).await?,
    }

    let sale = state
        .db
        .sales()
        .get_detail(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", &id))?;

    Ok(ok(sale))
}
