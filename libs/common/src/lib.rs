//! Common library for Civic Connect
//!
//! This crate provides functionality shared by the auth and api crates:
//! PostgreSQL pooling, the Redis client wrapper, persistence errors and
//! process settings.
//!
//! ```rust,no_run
//! use civic_common::database::{health_check, init_pool};
//! use civic_common::settings::AppSettings;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = AppSettings::from_env()?;
//!     if let Some(config) = settings.database_config() {
//!         let pool = init_pool(&config)?;
//!         println!("Database health check: {}", health_check(&pool).await?);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod database;
pub mod error;
pub mod settings;
