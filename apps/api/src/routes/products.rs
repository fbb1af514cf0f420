//! # Product Routes
//!
//! `/api/products` - catalog CRUD, search and inventory stats.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use avemaria_core::types::{NewProduct, UpdateProduct};
use avemaria_core::validation::{validate_new_product, validate_update_product};
use avemaria_db::ProductFilter;

use crate::error::ApiError;
use crate::response::{created, ok, ok_with_meta, Meta};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/low-stock", get(low_stock))
        .route("/stats", get(stats))
        .route(
            "/:id",
            get(get_product).patch(update_product).delete(delete_product),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductListQuery {
    search: Option<String>,
    category: Option<String>,
    low_stock: Option<String>,
}

/// GET /api/products - active products with optional filters.
async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = ProductFilter {
        search: query.search,
        category: query.category,
        low_stock: query.low_stock.as_deref() == Some("true"),
    };

    let products = state.db.products().list(&filter).await?;
    let total = products.len() as i64;

    Ok(ok_with_meta(
        products,
        Meta {
            total,
            page: None,
            limit: None,
        },
    ))
}

/// GET /api/products/low-stock - products at or below their threshold.
async fn low_stock(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let products = state.db.products().low_stock().await?;
    Ok(ok(products))
}

/// GET /api/products/stats - units on hand and stock valuation.
async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.db.products().stats().await?;
    Ok(ok(stats))
}

/// POST /api/products - create a product.
async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<NewProduct>,
) -> Result<impl IntoResponse, ApiError> {
    validate_new_product(&input)?;
    let product = state.db.products().insert(&input).await?;
    Ok(created(product))
}

/// GET /api/products/:id - product detail with recent movement history.
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .db
        .products()
        .detail(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &id))?;

    Ok(ok(detail))
}

/// PATCH /api/products/:id - partial update.
async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(changes): Json<UpdateProduct>,
) -> Result<impl IntoResponse, ApiError> {
    validate_update_product(&changes)?;
    let product = state.db.products().update(&id, &changes).await?;
    Ok(ok(product))
}

/// DELETE /api/products/:id - soft delete.
async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.products().soft_delete(&id).await?;
    Ok(ok(json!({ "message": "Producto eliminado" })))
}
