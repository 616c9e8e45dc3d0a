//! Error type for authentication operations

use civic_common::error::DatabaseError;
use thiserror::Error;

/// Failure of a registration, login or session lookup
#[derive(Error, Debug)]
pub enum AuthError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Email, username or phone already registered
    #[error("{0}")]
    Conflict(String),

    /// Elevated-role registration with a wrong verification code
    #[error("{0}")]
    Forbidden(String),

    /// Bad credentials or no active session
    #[error("{0}")]
    Unauthenticated(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Hashing, session store or other infrastructure failure
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Type alias for Result with AuthError
pub type AuthResult<T> = Result<T, AuthError>;
