//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The marketing site is served as static files at `/`; the chat widget on
//! those pages calls `/api/chat` and `/api/lead` on the same origin.

pub mod chat;
pub mod lead;

use std::path::Path;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// API routes used by the chat widget.
fn api_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(chat::chat))
        .route("/api/lead", post(lead::capture_lead))
        .route("/healthz", get(healthz))
        .layer(cors)
        .with_state(state)
}

/// API routes plus the static website as the fallback.
pub fn app(state: AppState, site_dir: &Path) -> Router {
    let website = ServeDir::new(site_dir).append_index_html_on_directories(true);
    api_routes(state)
        .fallback_service(website)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
