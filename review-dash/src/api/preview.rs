//! Aggregate preview with pagination
//!
//! Backs the two collapsible raw-data previews on the page.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use review_common::db::{count, find_aggregates_page};
use review_common::{AggregateRecord, Dimension};
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::pagination::{preview_window, PAGE_SIZE};
use crate::AppState;

/// Query parameters for previews
#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

/// Preview response
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub dimension: Dimension,
    pub collection: String,
    pub total_rows: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub rows: Vec<AggregateRecord>,
}

/// GET /api/preview/:dimension?page=
pub async fn get_preview(
    State(state): State<AppState>,
    Path(dimension): Path<String>,
    query: Result<Query<PreviewQuery>, QueryRejection>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let Query(query) = query?;
    let dimension: Dimension = dimension
        .parse()
        .map_err(|_| ApiError::InvalidDimension(dimension.clone()))?;
    let collection = state.collections.aggregate(dimension).to_string();

    let total_rows = count(&state.db, &collection).await?;
    let window = preview_window(total_rows, query.page);
    let rows = if window.rows > 0 {
        find_aggregates_page(&state.db, &collection, window.rows, window.offset).await?
    } else {
        Vec::new()
    };

    Ok(Json(PreviewResponse {
        dimension,
        collection,
        total_rows,
        page: window.page,
        page_size: PAGE_SIZE,
        total_pages: window.total_pages,
        rows,
    }))
}
