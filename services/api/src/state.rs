//! Application state shared across handlers

use civic_auth::AuthService;

use crate::{issues::IssueService, middleware::CookieSettings, upload::UploadStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub issues: IssueService,
    pub uploads: UploadStore,
    pub cookies: CookieSettings,
}
