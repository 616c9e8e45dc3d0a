//! Issue report routes

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_extra::extract::WithRejection;
use serde_json::{Value, json};

use crate::{
    error::ApiError,
    models::{CreateIssueRequest, IssueFilter, IssuePatch, IssueQuery},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_issues).post(create_issue))
        .route("/count", get(count_issues))
        .route("/:issue_id", get(get_issue).patch(update_issue))
}

fn filter_from(query: IssueQuery) -> Result<IssueFilter, ApiError> {
    IssueFilter::try_from(query).map_err(ApiError::BadRequest)
}

/// Submit a new issue
pub async fn create_issue(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateIssueRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let issue = state.issues.create(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Issue reported",
            "issue": issue
        })),
    ))
}

/// List issues, newest first
pub async fn list_issues(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<IssueQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let issues = state.issues.list(&filter_from(query)?).await?;

    Ok(Json(json!({ "issues": issues })))
}

/// Count issues matching the same filters as listing
pub async fn count_issues(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<IssueQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let count = state.issues.count(&filter_from(query)?).await?;

    Ok(Json(json!({ "count": count })))
}

pub async fn get_issue(
    State(state): State<AppState>,
    Path(issue_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let issue = state.issues.get(&issue_id).await?;

    Ok(Json(json!({ "issue": issue })))
}

/// Update workflow fields of an issue.
///
/// Only `status`, `rating` and `assigned` are accepted; any other field
/// rejects the whole request.
pub async fn update_issue(
    State(state): State<AppState>,
    Path(issue_id): Path<String>,
    WithRejection(Json(payload), _): WithRejection<Json<Value>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let patch: IssuePatch = serde_json::from_value(payload)
        .map_err(|e| ApiError::BadRequest(format!("Invalid update: {}", e)))?;
    let updates = patch.into_updates().map_err(ApiError::BadRequest)?;

    let issue = state.issues.update(&issue_id, &updates).await?;

    Ok(Json(json!({
        "message": "Issue updated",
        "issue": issue
    })))
}
