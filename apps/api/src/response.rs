//! # Response Envelope
//!
//! Every successful response is wrapped in the envelope the clients expect:
//!
//! ```json
//! { "success": true, "data": ..., "meta": { "total": 42, "page": 1, "limit": 20 } }
//! ```
//!
//! `meta` is only present on list endpoints. The failure shape lives in
//! [`crate::error`].

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

/// Pagination/count metadata for list responses.
#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

/// The success envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

/// 200 OK with data.
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
        meta: None,
    })
}

/// 200 OK with data and list metadata.
pub fn ok_with_meta<T: Serialize>(data: T, meta: Meta) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
        meta: Some(meta),
    })
}

/// 201 Created with data.
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (
        StatusCode::CREATED,
        Json(ApiResponse {
            success: true,
            data,
            meta: None,
        }),
    )
}
