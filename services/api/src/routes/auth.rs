//! Account routes: register, login, logout, me

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::{CookieJar, WithRejection};
use civic_auth::models::{LoginCredentials, RegisterRequest, SessionUser};
use serde_json::json;

use crate::{
    error::ApiError,
    middleware::{require_session, session_cookie, session_removal_cookie, session_value},
    state::AppState,
};

pub fn router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(me))
        .route_layer(middleware::from_fn_with_state(state, require_session));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .merge(protected)
}

/// Register a new account
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<RegisterRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.auth.register(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "user": user
        })),
    ))
}

/// Log in and set the session cookie
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<LoginCredentials>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.auth.login(payload).await?;
    let jar = jar.add(session_cookie(outcome.session_cookie, &state.cookies));

    Ok((
        jar,
        Json(json!({
            "message": "Login successful",
            "user": outcome.profile
        })),
    ))
}

/// End the session and clear the cookie. Succeeds without a session.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    state.auth.logout(session_value(&jar)).await;

    (
        jar.remove(session_removal_cookie()),
        Json(json!({ "message": "Logged out" })),
    )
}

/// Current session snapshot
pub async fn me(Extension(user): Extension<SessionUser>) -> impl IntoResponse {
    Json(json!({ "user": user }))
}
