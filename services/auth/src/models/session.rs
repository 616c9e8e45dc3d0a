//! Session model and related functionality

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::{Role, User};

/// Identity snapshot held by a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
            email: user.email.clone(),
            firstname: user.firstname.clone(),
            lastname: user.lastname.clone(),
        }
    }
}
