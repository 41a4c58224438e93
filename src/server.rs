//! HTTP server setup and configuration.
//!
//! This module provides the router and application state used by both
//! the production server and integration tests.

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::models::AppConfig;
use crate::services::EnhanceService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub enhancer: Arc<EnhanceService>,
}

/// Create application state from a loaded configuration.
pub fn create_app_state(config: AppConfig) -> AppState {
    let config = Arc::new(config);
    let enhancer = Arc::new(EnhanceService::new(config.clone()));

    AppState { config, enhancer }
}

/// Build the API router with all endpoints and middleware.
///
/// This is the core router used by both production and tests.
/// Uploads larger than `max_upload_bytes` are rejected before buffering.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/api/enhance", post(handle_enhance))
        .route("/api/presets", get(handle_presets))
        // Health check
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}

// Wrapper handlers to extract state components for the underlying API handlers

async fn handle_enhance(
    State(state): State<AppState>,
    query: Result<
        axum::extract::Query<api::EnhanceQuery>,
        axum::extract::rejection::QueryRejection,
    >,
    headers: axum::http::HeaderMap,
    body: Result<axum::body::Bytes, axum::extract::rejection::BytesRejection>,
) -> Result<axum::response::Response, crate::error::ApiError> {
    api::handle_enhance(State(state.enhancer), query, headers, body).await
}

async fn handle_presets(
    State(state): State<AppState>,
) -> axum::Json<api::PresetsResponse> {
    api::handle_presets(State(state.enhancer)).await
}
