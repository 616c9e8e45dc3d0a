//! Photo upload route

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use axum_extra::extract::WithRejection;
use serde_json::json;
use tracing::error;

use crate::{error::ApiError, state::AppState, upload::MAX_UPLOAD_BYTES};

const PHOTO_FIELD: &str = "photo";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/photo", post(upload_photo))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// Store the multipart `photo` field and return its URL
pub async fn upload_photo(
    State(state): State<AppState>,
    WithRejection(mut multipart, _): WithRejection<Multipart, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?;
        if data.is_empty() {
            break;
        }

        let url = state
            .uploads
            .save(file_name.as_deref(), &data)
            .await
            .map_err(|e| {
                error!("Failed to store upload: {}", e);
                ApiError::InternalServerError
            })?;

        return Ok((StatusCode::CREATED, Json(json!({ "url": url }))));
    }

    Err(ApiError::BadRequest("No file uploaded".to_string()))
}
