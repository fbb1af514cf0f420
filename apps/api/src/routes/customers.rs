//! # Customer Routes
//!
//! `/api/customers` - CRUD plus the derived VIP/Frecuente/Regular level,
//! recomputed from completed-sale aggregates on every read.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use avemaria_core::types::{customer_level, CustomerDetail, NewCustomer, UpdateCustomer};
use avemaria_core::validation::{validate_new_customer, validate_update_customer};
use avemaria_db::SaleFilter;

use crate::error::ApiError;
use crate::response::{created, ok, ok_with_meta, Meta};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route("/:id", get(get_customer).patch(update_customer))
}

/// GET /api/customers - all customers with aggregates and level.
async fn list_customers(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let customers = state.db.customers().list_with_stats().await?;
    let total = customers.len() as i64;

    Ok(ok_with_meta(
        customers,
        Meta {
            total,
            page: None,
            limit: None,
        },
    ))
}

/// POST /api/customers - create a customer.
async fn create_customer(
    State(state): State<AppState>,
    Json(input): Json<NewCustomer>,
) -> Result<impl IntoResponse, ApiError> {
    validate_new_customer(&input)?;
    let customer = state.db.customers().insert(&input).await?;
    Ok(created(customer))
}

/// GET /api/customers/:id - customer detail with sale history and level.
async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = state
        .db
        .customers()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer", &id))?;

    let (sales, _) = state
        .db
        .sales()
        .list(&SaleFilter {
            customer_id: Some(id.clone()),
            limit: 50,
            ..Default::default()
        })
        .await?;

    let (total_spent, total_purchases) = state.db.customers().stats(&id).await?;

    Ok(ok(CustomerDetail {
        customer,
        sales,
        total_spent,
        total_purchases,
        level: customer_level(total_spent, total_purchases),
    }))
}

/// PATCH /api/customers/:id - partial update.
async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(changes): Json<UpdateCustomer>,
) -> Result<impl IntoResponse, ApiError> {
    validate_update_customer(&changes)?;
    let customer = state.db.customers().update(&id, &changes).await?;
    Ok(ok(customer))
}
