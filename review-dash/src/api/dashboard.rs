//! Dashboard data endpoint
//!
//! Loads both aggregate collections on every request and builds the view
//! model with the requested filters. Read-only.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use tracing::debug;

use super::ApiError;
use crate::dashboard::{build_view, DashboardParams, DashboardView};
use crate::db::load_aggregates;
use crate::AppState;

/// GET /api/dashboard?min_count=&top_n=
///
/// Returns `{"status": "empty", "warning": ...}` when either aggregate
/// collection is empty, otherwise the full view model. A malformed query
/// string gets a JSON 400.
pub async fn get_dashboard(
    State(state): State<AppState>,
    query: Result<Query<DashboardParams>, QueryRejection>,
) -> Result<Json<DashboardView>, ApiError> {
    let Query(params) = query?;
    let (cities, states) = load_aggregates(&state.db, &state.collections).await?;
    debug!(
        "Dashboard request: {} cities, {} states, {:?}",
        cities.len(),
        states.len(),
        params
    );
    Ok(Json(build_view(&cities, &states, params)))
}
