//! # BookEase DB
//!
//! Database pool, repositories and an in-memory store for the BookEase API.
//!
//! - [`Repository`]: the per-entity contract used by the entity services
//! - [`ClinicDirectory`] and [`SpecialityCatalog`]: clinic and doctor searches
//! - [`postgres`]: SQLx implementations of these and of
//!   [`CredentialStore`](bookease_auth::CredentialStore)
//! - [`memory`]: a lock-guarded in-memory implementation of all of them, used
//!   by the test suites
//!
//! # Example
//!
//! ```ignore
//! use bookease_config::DatabaseConfig;
//! use bookease_db::{init_db_pool, run_migrations};
//!
//! let config = DatabaseConfig::from_env().expect("DATABASE_URL must be set");
//! let pool = init_db_pool(&config).await?;
//! run_migrations(&pool).await?;
//! ```

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use bookease_config::DatabaseConfig;

pub mod memory;
pub mod postgres;
pub mod repository;

pub use memory::MemoryStore;
pub use postgres::{PgClinicRepository, PgDoctorRepository, PgPatientRepository, PgUserRepository};
pub use repository::{ClinicDirectory, Repository, SpecialityCatalog};

// Re-export PgPool for convenience
pub use sqlx::PgPool;

/// Connects to PostgreSQL using `config`.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    info!(max_connections = config.max_connections, "Connecting to PostgreSQL");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.url)
        .await?;

    info!("Connected to PostgreSQL");
    Ok(pool)
}

/// Applies the migrations under `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");
    sqlx::migrate!("../../migrations").run(pool).await?;
    info!("Database migrations completed");
    Ok(())
}
