//! User repository for database operations

use async_trait::async_trait;
use civic_common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use super::UserStore;
use crate::models::{Department, Gender, NewUser, Role, User};

const USER_COLUMNS: &str = "id, firstname, lastname, username, email, phone, password_hash, \
     gender, address, date_of_birth, role, department, verification_code, created_at, updated_at";

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> DatabaseResult<Option<User>> {
        // `column` is always one of the fixed names passed by the lookups below.
        let sql = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, column);

        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        row.as_ref().map(user_from_row).transpose()
    }
}

fn decode_error(message: String) -> DatabaseError {
    DatabaseError::Query(sqlx::Error::Decode(message.into()))
}

fn user_from_row(row: &PgRow) -> DatabaseResult<User> {
    let gender: String = row.try_get("gender").map_err(DatabaseError::Query)?;
    let role: String = row.try_get("role").map_err(DatabaseError::Query)?;
    let department: Option<String> = row.try_get("department").map_err(DatabaseError::Query)?;

    Ok(User {
        id: row.try_get("id").map_err(DatabaseError::Query)?,
        firstname: row.try_get("firstname").map_err(DatabaseError::Query)?,
        lastname: row.try_get("lastname").map_err(DatabaseError::Query)?,
        username: row.try_get("username").map_err(DatabaseError::Query)?,
        email: row.try_get("email").map_err(DatabaseError::Query)?,
        phone: row.try_get("phone").map_err(DatabaseError::Query)?,
        password_hash: row.try_get("password_hash").map_err(DatabaseError::Query)?,
        gender: gender.parse::<Gender>().map_err(decode_error)?,
        address: row.try_get("address").map_err(DatabaseError::Query)?,
        date_of_birth: row.try_get("date_of_birth").map_err(DatabaseError::Query)?,
        role: role.parse::<Role>().map_err(decode_error)?,
        department: department
            .map(|d| d.parse::<Department>())
            .transpose()
            .map_err(decode_error)?,
        verification_code: row
            .try_get("verification_code")
            .map_err(DatabaseError::Query)?,
        created_at: row.try_get("created_at").map_err(DatabaseError::Query)?,
        updated_at: row.try_get("updated_at").map_err(DatabaseError::Query)?,
    })
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User> {
        info!("Creating new user: {}", new_user.username);

        let sql = format!(
            r#"
            INSERT INTO users (firstname, lastname, username, email, phone, password_hash,
                               gender, address, date_of_birth, role, department, verification_code)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(&new_user.firstname)
            .bind(&new_user.lastname)
            .bind(&new_user.username)
            .bind(&new_user.email)
            .bind(&new_user.phone)
            .bind(&new_user.password_hash)
            .bind(new_user.gender.as_str())
            .bind(&new_user.address)
            .bind(new_user.date_of_birth)
            .bind(new_user.role.as_str())
            .bind(new_user.department.map(|d| d.as_str()))
            .bind(&new_user.verification_code)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        user_from_row(&row)
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        self.find_one("email", email).await
    }

    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        self.find_one("username", username).await
    }

    async fn find_by_phone(&self, phone: &str) -> DatabaseResult<Option<User>> {
        self.find_one("phone", phone).await
    }
}
