//! HTTP API handlers for review-dash

pub mod dashboard;
pub mod health;
pub mod preview;
pub mod ui;

pub use dashboard::get_dashboard;
pub use health::health_routes;
pub use preview::get_preview;
pub use ui::{serve_app_js, serve_index};

use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// API errors
#[derive(Debug)]
pub enum ApiError {
    InvalidDimension(String),
    /// Query string did not deserialize
    InvalidQuery(String),
    DatabaseError(String),
}

impl From<review_common::Error> for ApiError {
    fn from(e: review_common::Error) -> Self {
        ApiError::DatabaseError(e.to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidQuery(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InvalidDimension(name) => {
                (StatusCode::BAD_REQUEST, format!("Invalid dimension: {}", name))
            }
            ApiError::InvalidQuery(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::DatabaseError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", msg))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
