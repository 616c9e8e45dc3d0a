//! Authentication models

pub mod session;
pub mod user;

// Re-export for convenience
pub use session::SessionUser;
pub use user::{
    Department, Gender, LoginCredentials, NewUser, RegisterRequest, Role, User, UserProfile,
};
