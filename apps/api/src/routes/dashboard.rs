//! # Dashboard Route
//!
//! `/api/dashboard` - consolidated current-month KPIs for the home screen.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use chrono::Utc;

use crate::error::ApiError;
use crate::response::ok;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}

/// GET /api/dashboard - KPIs, alerts, activity feed and chart series.
async fn dashboard(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let dashboard = state.db.reports().dashboard(Utc::now()).await?;
    Ok(ok(dashboard))
}
