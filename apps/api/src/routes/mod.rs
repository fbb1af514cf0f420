//! # Route Modules
//!
//! One module per API area, mounted under `/api` by [`crate::app`]:
//!
//! - `/api/products` - catalog
//! - `/api/purchases` - supplier orders
//! - `/api/sales` - customer sales
//! - `/api/customers` - customers and levels
//! - `/api/accounting` - ledger and reports
//! - `/api/dashboard` - consolidated KPIs

use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use serde_json::json;

use crate::response::ok;
use crate::AppState;

pub mod accounting;
pub mod common;
pub mod customers;
pub mod dashboard;
pub mod products;
pub mod purchases;
pub mod sales;

/// Assembles every API route under one router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/products", products::router())
        .nest("/purchases", purchases::router())
        .nest("/sales", sales::router())
        .nest("/customers", customers::router())
        .nest("/accounting", accounting::router())
        .nest("/dashboard", dashboard::router())
}

/// GET /api/health - liveness check.
async fn health() -> impl IntoResponse {
    ok(json!({
        "status": "ok",
        "name": "Mi Negocio AVEMARÍA API",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
