//! HTTP route table for the portal host.
//!
//! DESIGN
//! ======
//! Three surfaces share one router:
//! - `/healthz` liveness probe
//! - `/api` and `/api/*` forwarded to the backend by [`crate::proxy`]
//! - everything else served from the built client bundle, with unknown paths
//!   answered by `index.html` so client-side routes survive a reload

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{any, get};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::proxy;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let site_dir = state.config.site_dir.clone();
    let site = ServeDir::new(&site_dir)
        .append_index_html_on_directories(true)
        .fallback(ServeFile::new(site_dir.join("index.html")));

    Router::new()
        .route("/healthz", get(healthz))
        .route(proxy::API_PREFIX, any(proxy::forward))
        .route("/api/{*path}", any(proxy::forward))
        .fallback_service(site)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
