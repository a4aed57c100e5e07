//! Dashboard page assets
//!
//! The page is a static shell: tiles, controls, charts and previews are
//! filled in by `app.js` from `/api/dashboard` and `/api/preview/*`, so the
//! same HTML is served whether or not any aggregates exist yet.

use axum::{
    http::header,
    response::{Html, IntoResponse},
};

const DASHBOARD_HTML: &str = include_str!("../ui/index.html");
const DASHBOARD_JS: &str = include_str!("../ui/app.js");

/// GET /
pub async fn serve_index() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

/// GET /static/app.js
pub async fn serve_app_js() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        DASHBOARD_JS,
    )
}
