//! In-memory user store for tests and database-less development runs

use async_trait::async_trait;
use chrono::Utc;
use civic_common::error::{DatabaseError, DatabaseResult};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{UniqueField, UserStore};
use crate::models::{NewUser, User};

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn find_where(&self, predicate: impl Fn(&User) -> bool) -> Option<User> {
        self.users
            .read()
            .await
            .values()
            .find(|user| predicate(user))
            .cloned()
    }
}

#[async_trait]
impl UserStore for InMemoryUserRepository {
    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User> {
        let mut users = self.users.write().await;

        // Same precedence the unique indexes are declared in.
        let taken = users.values().find_map(|existing| {
            if existing.email == new_user.email {
                Some(UniqueField::Email)
            } else if existing.username == new_user.username {
                Some(UniqueField::Username)
            } else if existing.phone == new_user.phone {
                Some(UniqueField::Phone)
            } else {
                None
            }
        });
        if let Some(field) = taken {
            return Err(DatabaseError::UniqueViolation {
                constraint: field.constraint().to_string(),
            });
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            firstname: new_user.firstname.clone(),
            lastname: new_user.lastname.clone(),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            phone: new_user.phone.clone(),
            password_hash: new_user.password_hash.clone(),
            gender: new_user.gender,
            address: new_user.address.clone(),
            date_of_birth: new_user.date_of_birth,
            role: new_user.role,
            department: new_user.department,
            verification_code: new_user.verification_code.clone(),
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        Ok(self.find_where(|user| user.email == email).await)
    }

    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        Ok(self.find_where(|user| user.username == username).await)
    }

    async fn find_by_phone(&self, phone: &str) -> DatabaseResult<Option<User>> {
        Ok(self.find_where(|user| user.phone == phone).await)
    }
}
