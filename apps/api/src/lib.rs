//! # avemaria-api: REST API for Mi Negocio AVEMARÍA
//!
//! The HTTP surface consumed by the web SPA and the mobile app.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         API Server                                      │
//! │                                                                         │
//! │  Web/Mobile ───► Axum Router (/api/...) ───► Repositories ───► SQLite  │
//! │                      │                                                  │
//! │                      ├── validation (avemaria-core) before any I/O     │
//! │                      ├── the inventory ledger for sale/purchase writes │
//! │                      └── JSON envelope + error mapping                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`app`] builds the full router for a given database, which is also what
//! the integration tests drive directly with `tower::ServiceExt::oneshot`.

pub mod config;
pub mod error;
pub mod response;
pub mod routes;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use avemaria_db::Database;

/// Shared application state, cloned into every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
}

/// Builds the application router with tracing and CORS layers.
pub fn app(db: Database) -> Router {
    let state = AppState { db };

    Router::new()
        .nest("/api", routes::api_router())
        .layer(TraceLayer::new_for_http())
        // The SPA and the mobile app are served from other origins.
        .layer(CorsLayer::permissive())
        .with_state(state)
}
