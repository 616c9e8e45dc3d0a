//! HTTP service for Civic Connect
//!
//! Citizens report civic issues with an optional photo and location;
//! administrators and authorities move them through New, In Progress and
//! Resolved. Accounts and sessions come from `civic-auth`.

pub mod error;
pub mod issues;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod upload;

pub use error::{ApiError, ApiResult};
pub use state::AppState;
