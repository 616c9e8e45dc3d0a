//! Registration, login and session lookup

use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    error::{AuthError, AuthResult},
    models::{
        Department, Gender, LoginCredentials, NewUser, RegisterRequest, Role, SessionUser,
        UserProfile,
    },
    password,
    repositories::{UniqueField, UserStore},
    session::SessionManager,
    validation,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Static secrets gating elevated-role registration
#[derive(Debug, Clone)]
pub struct VerificationCodes {
    pub admin: String,
    pub authority: String,
}

impl Default for VerificationCodes {
    fn default() -> Self {
        Self {
            admin: "ADMIN-2025".to_string(),
            authority: "AUTH-2025".to_string(),
        }
    }
}

impl VerificationCodes {
    fn expected_for(&self, role: Role) -> Option<&str> {
        match role {
            Role::User => None,
            Role::Admin => Some(&self.admin),
            Role::Authority => Some(&self.authority),
        }
    }
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub profile: UserProfile,
    /// Signed value for the session cookie
    pub session_cookie: String,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: SessionManager,
    codes: VerificationCodes,
}

/// Trimmed, non-empty value of an optional text field
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, sessions: SessionManager, codes: VerificationCodes) -> Self {
        Self {
            users,
            sessions,
            codes,
        }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Register a new account and return its public profile.
    ///
    /// Elevated roles are checked against their verification code before
    /// anything else, so a wrong code is always reported as `Forbidden`.
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<UserProfile> {
        let role = match present(&request.role) {
            Some(raw) => raw.parse::<Role>().map_err(AuthError::Validation)?,
            None => Role::User,
        };

        if let Some(expected) = self.codes.expected_for(role) {
            if request.verification_code.as_deref() != Some(expected) {
                warn!("Registration rejected: invalid {} verification code", role);
                return Err(AuthError::Forbidden(format!(
                    "Invalid {} verification code",
                    role
                )));
            }
        }

        let (
            Some(firstname),
            Some(lastname),
            Some(username),
            Some(email),
            Some(phone),
            Some(password),
            Some(gender),
            Some(date_of_birth),
        ) = (
            present(&request.firstname),
            present(&request.lastname),
            present(&request.username),
            present(&request.email),
            present(&request.phone),
            request.password.as_deref().filter(|p| !p.is_empty()),
            present(&request.gender),
            present(&request.date_of_birth),
        )
        else {
            return Err(AuthError::Validation("Missing required fields".to_string()));
        };

        let username = username.to_lowercase();
        let email = email.to_lowercase();

        validation::validate_username(&username).map_err(AuthError::Validation)?;
        validation::validate_email(&email).map_err(AuthError::Validation)?;
        validation::validate_phone(phone).map_err(AuthError::Validation)?;
        validation::validate_password(password).map_err(AuthError::Validation)?;
        let gender = gender.parse::<Gender>().map_err(AuthError::Validation)?;
        let date_of_birth =
            validation::parse_date_of_birth(date_of_birth).map_err(AuthError::Validation)?;

        let department = match role {
            Role::Admin => Some(
                request
                    .department
                    .as_deref()
                    .and_then(Department::normalize)
                    .ok_or_else(|| {
                        AuthError::Validation("Invalid or missing admin department".to_string())
                    })?,
            ),
            _ => None,
        };

        let (by_email, by_username, by_phone) = tokio::try_join!(
            self.users.find_by_email(&email),
            self.users.find_by_username(&username),
            self.users.find_by_phone(phone),
        )?;
        let taken = [
            (by_email.is_some(), UniqueField::Email),
            (by_username.is_some(), UniqueField::Username),
            (by_phone.is_some(), UniqueField::Phone),
        ]
        .into_iter()
        .find_map(|(exists, field)| exists.then_some(field));
        if let Some(field) = taken {
            return Err(AuthError::Conflict(field.conflict_message().to_string()));
        }

        let password_hash = password::hash_password(password).await?;

        let new_user = NewUser {
            firstname: firstname.to_string(),
            lastname: lastname.to_string(),
            username,
            email,
            phone: phone.to_string(),
            password_hash,
            gender,
            address: present(&request.address).map(str::to_string),
            date_of_birth,
            role,
            department,
            verification_code: if role.is_elevated() {
                request.verification_code.clone()
            } else {
                None
            },
        };

        // The lookups above race with concurrent registrations; the unique
        // indexes are the final word.
        let user = self.users.create(&new_user).await.map_err(|e| {
            let field = e.violated_constraint().and_then(UniqueField::from_constraint);
            match field {
                Some(field) => AuthError::Conflict(field.conflict_message().to_string()),
                None => AuthError::Database(e),
            }
        })?;

        info!("Registered user {} with role {}", user.username, user.role);
        Ok(UserProfile::from(&user))
    }

    /// Check credentials and start a session.
    ///
    /// Unknown accounts and wrong passwords fail with the same message.
    pub async fn login(&self, credentials: LoginCredentials) -> AuthResult<LoginOutcome> {
        let (Some(identifier), Some(password)) = (
            present(&credentials.username_or_email),
            credentials.password.as_deref().filter(|p| !p.is_empty()),
        ) else {
            return Err(AuthError::Validation(
                "Username/email and password are required".to_string(),
            ));
        };

        let identifier = identifier.to_lowercase();
        let user = if identifier.contains('@') {
            self.users.find_by_email(&identifier).await?
        } else {
            self.users.find_by_username(&identifier).await?
        };

        let Some(user) = user else {
            warn!("Login failed: unknown account");
            return Err(AuthError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
        };

        if !password::verify_password(password, &user.password_hash).await? {
            warn!("Login failed: wrong password for {}", user.username);
            return Err(AuthError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
        }

        let session_cookie = self.sessions.start(&SessionUser::from(&user)).await?;
        info!("User {} logged in", user.username);

        Ok(LoginOutcome {
            profile: UserProfile::from(&user),
            session_cookie,
        })
    }

    /// End the session behind `cookie_value`. Always succeeds.
    pub async fn logout(&self, cookie_value: Option<&str>) {
        if let Some(value) = cookie_value {
            if let Err(e) = self.sessions.end(value).await {
                warn!("Failed to destroy session: {}", e);
            }
        }
    }

    /// Snapshot of the user signed in with `cookie_value`
    pub async fn me(&self, cookie_value: Option<&str>) -> AuthResult<SessionUser> {
        let not_authenticated = || AuthError::Unauthenticated("Not authenticated".to_string());

        let value = cookie_value.ok_or_else(not_authenticated)?;
        self.sessions
            .resolve(value)
            .await?
            .ok_or_else(not_authenticated)
    }
}
