//! API service routes

use axum::{Json, Router, response::IntoResponse, routing::get};
use serde_json::json;
use tower_http::services::ServeDir;

use crate::{state::AppState, upload::UPLOADS_URL_PREFIX};

pub mod auth;
pub mod report;
pub mod upload;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let uploads = ServeDir::new(state.uploads.dir());

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .nest("/api/auth", auth::router(state.clone()))
        .nest("/api/report", report::router())
        .nest("/api/upload", upload::router())
        .nest_service(UPLOADS_URL_PREFIX, uploads)
        .with_state(state)
}

pub async fn index() -> &'static str {
    "API is running!"
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "civic-connect"
    }))
}
