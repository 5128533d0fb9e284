//! # BookEase Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: signing key locations, issuer and token lifetimes
//! - [`cors`]: allowed browser origins
//! - [`database`]: PostgreSQL connection settings
//! - [`server`]: listener addresses
//! - [`admin`]: optional bootstrap administrator account
//!
//! Every config is read once at startup and injected where needed.
//!
//! # Example
//!
//! ```ignore
//! use bookease_config::{JwtConfig, CorsConfig, DatabaseConfig, ServerConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let server_config = ServerConfig::from_env();
//! ```

pub mod admin;
pub mod cors;
pub mod database;
pub mod jwt;
pub mod server;

pub use admin::AdminConfig;
pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use jwt::JwtConfig;
pub use server::ServerConfig;

pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
