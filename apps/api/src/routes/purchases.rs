//! # Purchase Routes
//!
//! `/api/purchases` - supplier orders. POST goes through the inventory
//! ledger (atomic stock increment + expense entry); purchases are immutable
//! afterwards.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use avemaria_core::types::NewPurchase;
use avemaria_core::validation::validate_new_purchase;

use crate::error::ApiError;
use crate::response::{created, ok, ok_with_meta, Meta};
use crate::routes::common::parse_date_param;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_purchases).post(create_purchase))
        .route("/summary", get(summary))
        .route("/:id", get(get_purchase))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PurchaseListQuery {
    start_date: Option<String>,
    end_date: Option<String>,
    page: Option<i64>,
    limit: Option<i64>,
}

/// GET /api/purchases - paginated list, newest first.
async fn list_purchases(
    State(state): State<AppState>,
    Query(query): Query<PurchaseListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let start = parse_date_param("startDate", query.start_date.as_deref())?;
    let end = parse_date_param("endDate", query.end_date.as_deref())?;
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);

    let (purchases, total) = state.db.purchases().list(start, end, page, limit).await?;

    Ok(ok_with_meta(
        purchases,
        Meta {
            total,
            page: Some(page.max(1)),
            limit: Some(limit.clamp(1, 50)),
        },
    ))
}

/// GET /api/purchases/summary - total invested and units received.
async fn summary(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let summary = state.db.purchases().summary().await?;
    Ok(ok(summary))
}

/// POST /api/purchases - record a purchase through the inventory ledger.
async fn create_purchase(
    State(state): State<AppState>,
    Json(input): Json<NewPurchase>,
) -> Result<impl IntoResponse, ApiError> {
    validate_new_purchase(&input)?;
    let purchase = state.db.ledger().record_purchase(&input).await?;
    Ok(created(purchase))
}

/// GET /api/purchases/:id - purchase detail with items.
async fn get_purchase(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let purchase = state
        .db
        .purchases()
        .get_detail(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Purchase", &id))?;

    Ok(ok(purchase))
}
