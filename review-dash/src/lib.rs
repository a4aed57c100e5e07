//! review-dash library - read-only dashboard over the aggregate collections

use axum::Router;
use review_common::config::CollectionNames;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod dashboard;
pub mod db;
pub mod pagination;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (read-only)
    pub db: SqlitePool,
    /// Collection names from the pipeline configuration
    pub collections: CollectionNames,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, collections: CollectionNames) -> Self {
        Self { db, collections }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let api_routes = Router::new()
        .route("/api/dashboard", get(api::get_dashboard))
        .route("/api/preview/:dimension", get(api::get_preview));

    let pages = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .merge(api::health_routes());

    Router::new()
        .merge(api_routes)
        .merge(pages)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
