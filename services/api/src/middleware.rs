//! Session cookie handling and cross-origin policy

use anyhow::Result;
use axum::{
    extract::{Request, State},
    http::{HeaderValue, Method, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use civic_auth::SESSION_COOKIE_NAME;
use cookie::{Cookie, SameSite};
use std::time::Duration;
use tower_http::cors::CorsLayer;

use crate::{error::ApiError, state::AppState};

/// Attributes of the session cookie
#[derive(Debug, Clone)]
pub struct CookieSettings {
    /// Send the cookie over HTTPS only
    pub secure: bool,
    pub max_age: Duration,
}

/// Cookie carrying a freshly started session
pub fn session_cookie(value: String, settings: &CookieSettings) -> Cookie<'static> {
    let max_age = i64::try_from(settings.max_age.as_secs()).unwrap_or(i64::MAX);

    Cookie::build((SESSION_COOKIE_NAME, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(settings.secure)
        .max_age(cookie::time::Duration::seconds(max_age))
        .build()
}

/// Cookie used to clear the session cookie on the client
pub fn session_removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE_NAME).path("/").build()
}

/// Raw session cookie value, if the request carries one
pub fn session_value(jar: &CookieJar) -> Option<&str> {
    jar.get(SESSION_COOKIE_NAME).map(|cookie| cookie.value())
}

/// Reject requests without a live session; expose the session snapshot
/// to handlers as an extension.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = state.auth.me(session_value(&jar)).await?;
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// CORS policy admitting the frontend origin with credentials
pub fn cors_layer(frontend_url: &str) -> Result<CorsLayer> {
    let origin = HeaderValue::from_str(frontend_url.trim_end_matches('/'))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]))
}
