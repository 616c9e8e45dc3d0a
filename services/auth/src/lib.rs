//! Authentication for Civic Connect
//!
//! Account registration with role gating, credential login, and
//! server-side sessions addressed by a signed cookie value.

pub mod error;
pub mod models;
pub mod password;
pub mod repositories;
pub mod service;
pub mod session;
pub mod validation;

pub use error::{AuthError, AuthResult};
pub use service::{AuthService, LoginOutcome, VerificationCodes};
pub use session::{
    InMemorySessionStore, RedisSessionStore, SESSION_COOKIE_NAME, SessionManager, SessionStore,
};
