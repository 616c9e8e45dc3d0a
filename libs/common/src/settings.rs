//! Process settings
//!
//! Settings are read once at startup: built-in defaults first, then an
//! optional `.env` file, then the process environment.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

use crate::{cache::RedisConfig, database::DatabaseConfig};

/// Settings for the Civic Connect backend
///
/// # Environment Variables
/// - `PORT`: HTTP listen port (default: 5000)
/// - `DATABASE_URL`: PostgreSQL connection URL (no default; in-memory stores when unset)
/// - `DATABASE_MAX_CONNECTIONS`: Maximum pool size (default: 10)
/// - `DATABASE_MIN_CONNECTIONS`: Minimum pool size (default: 0)
/// - `DATABASE_CONNECTION_TIMEOUT`: Acquire timeout in seconds (default: 10)
/// - `DB_TLS_INSECURE`: Skip server certificate validation (default: false)
/// - `REDIS_URL`: Redis URL for the session store (in-memory when unset)
/// - `SESSION_SECRET`: Key used to sign session cookies
/// - `SESSION_TTL_SECONDS`: Session lifetime (default: 7 days)
/// - `COOKIE_SECURE`: Mark the session cookie Secure (default: false)
/// - `FRONTEND_URL`: Origin allowed by CORS (default: http://localhost:3000)
/// - `UPLOAD_DIR`: Directory for uploaded photos (default: uploads)
/// - `ADMIN_VERIFICATION_CODE` / `AUTHORITY_VERIFICATION_CODE`: registration secrets
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    pub port: u16,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub database_min_connections: u32,
    pub database_connection_timeout: u64,
    pub db_tls_insecure: bool,
    pub redis_url: Option<String>,
    pub session_secret: String,
    pub session_ttl_seconds: u64,
    pub cookie_secure: bool,
    pub frontend_url: String,
    pub upload_dir: String,
    pub admin_verification_code: String,
    pub authority_verification_code: String,
}

impl AppSettings {
    /// Load settings from defaults, `.env` and the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is the normal case in deployments.
        let _ = dotenvy::dotenv();

        Config::builder()
            .set_default("port", 5000)?
            .set_default("database_max_connections", 10)?
            .set_default("database_min_connections", 0)?
            .set_default("database_connection_timeout", 10)?
            .set_default("db_tls_insecure", false)?
            .set_default("session_secret", "dev_secret_change_me")?
            .set_default("session_ttl_seconds", 604_800_i64)?
            .set_default("cookie_secure", false)?
            .set_default("frontend_url", "http://localhost:3000")?
            .set_default("upload_dir", "uploads")?
            .set_default("admin_verification_code", "ADMIN-2025")?
            .set_default("authority_verification_code", "AUTH-2025")?
            .add_source(
                Environment::default()
                    .try_parsing(true)
                    .ignore_empty(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Database configuration, if a database URL was supplied
    pub fn database_config(&self) -> Option<DatabaseConfig> {
        self.database_url.as_ref().map(|url| DatabaseConfig {
            database_url: url.clone(),
            max_connections: self.database_max_connections,
            min_connections: self.database_min_connections,
            connection_timeout: self.database_connection_timeout,
            tls_insecure: self.db_tls_insecure,
        })
    }

    /// Redis configuration, if a Redis URL was supplied
    pub fn redis_config(&self) -> Option<RedisConfig> {
        self.redis_url
            .as_ref()
            .map(|url| RedisConfig { url: url.clone() })
    }
}
