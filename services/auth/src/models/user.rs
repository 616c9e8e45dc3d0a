//! User model and related functionality

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Authorization role of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
    Authority,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Authority => "authority",
        }
    }

    /// Admins and authorities register with a verification code
    pub fn is_elevated(&self) -> bool {
        matches!(self, Role::Admin | Role::Authority)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "authority" => Ok(Role::Authority),
            other => Err(format!("Invalid role: {}", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gender as recorded on the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            "Other" => Ok(Gender::Other),
            other => Err(format!("Invalid gender: {}", other)),
        }
    }
}

/// Department an admin is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "road")]
    Road,
    #[serde(rename = "waste management")]
    WasteManagement,
    #[serde(rename = "electricity")]
    Electricity,
}

impl Department {
    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Road => "road",
            Department::WasteManagement => "waste management",
            Department::Electricity => "electricity",
        }
    }

    /// Map free-text department input onto a canonical department
    pub fn normalize(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "road" | "roads" => Some(Department::Road),
            "electricity" => Some(Department::Electricity),
            "waste management" | "wastemanagement" => Some(Department::WasteManagement),
            _ => None,
        }
    }
}

impl FromStr for Department {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "road" => Ok(Department::Road),
            "waste management" => Ok(Department::WasteManagement),
            "electricity" => Ok(Department::Electricity),
            other => Err(format!("Invalid department: {}", other)),
        }
    }
}

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub gender: Gender,
    pub address: Option<String>,
    pub date_of_birth: NaiveDate,
    pub role: Role,
    pub department: Option<Department>,
    pub verification_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New user creation payload, already normalized and hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub gender: Gender,
    pub address: Option<String>,
    pub date_of_birth: NaiveDate,
    pub role: Role,
    pub department: Option<Department>,
    pub verification_code: Option<String>,
}

/// Public view of a user. Carries no credential material.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub gender: Gender,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "DOB")]
    pub date_of_birth: NaiveDate,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<Department>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            firstname: user.firstname.clone(),
            lastname: user.lastname.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            gender: user.gender,
            address: user.address.clone(),
            date_of_birth: user.date_of_birth,
            role: user.role,
            department: user.department,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Registration payload as submitted by the client.
///
/// Every field is optional at this layer so that a missing field is
/// reported as a validation failure rather than a deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    #[serde(rename = "DOB", alias = "dateOfBirth")]
    pub date_of_birth: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    #[serde(rename = "verificationCode")]
    pub verification_code: Option<String>,
}

/// User login credentials
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginCredentials {
    #[serde(rename = "usernameOrEmail")]
    pub username_or_email: Option<String>,
    pub password: Option<String>,
}
