//! User persistence

use async_trait::async_trait;
use civic_common::error::DatabaseResult;

use crate::models::{NewUser, User};

pub mod memory;
pub mod user;

pub use memory::InMemoryUserRepository;
pub use user::UserRepository;

/// Storage contract for user accounts.
///
/// Lookups take already-normalized values (lowercased username and email,
/// trimmed phone). `create` reports a duplicate through
/// `DatabaseError::UniqueViolation` carrying the constraint name.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User>;
    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>>;
    async fn find_by_phone(&self, phone: &str) -> DatabaseResult<Option<User>>;
}

/// A user field that must be unique across accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Username,
    Phone,
}

impl UniqueField {
    /// Name of the database constraint guarding this field
    pub fn constraint(&self) -> &'static str {
        match self {
            UniqueField::Email => "users_email_key",
            UniqueField::Username => "users_username_key",
            UniqueField::Phone => "users_phone_key",
        }
    }

    pub fn from_constraint(constraint: &str) -> Option<Self> {
        [UniqueField::Email, UniqueField::Username, UniqueField::Phone]
            .into_iter()
            .find(|field| field.constraint() == constraint)
    }

    /// Message reported to the client when the field is taken
    pub fn conflict_message(&self) -> &'static str {
        match self {
            UniqueField::Email => "Email already in use",
            UniqueField::Username => "Username already in use",
            UniqueField::Phone => "Phone already in use",
        }
    }
}
