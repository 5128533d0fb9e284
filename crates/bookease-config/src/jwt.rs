use std::env;

use crate::env_or;

pub const DEFAULT_ISSUER: &str = "BookEase";
pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 15 * 60;
pub const DEFAULT_REFRESH_TOKEN_EXPIRY: i64 = 30 * 24 * 60 * 60;

/// Signing key locations and token lifetimes.
///
/// Expiries are in seconds.
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub public_key_path: String,
    pub private_key_path: String,
    pub issuer: String,
    pub access_token_expiry: i64,
    pub refresh_token_expiry: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            public_key_path: env::var("JWT_PUBLIC_KEY_PATH")
                .unwrap_or_else(|_| "keys/app.pub".to_string()),
            private_key_path: env::var("JWT_PRIVATE_KEY_PATH")
                .unwrap_or_else(|_| "keys/app.key".to_string()),
            issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| DEFAULT_ISSUER.to_string()),
            access_token_expiry: env_or("JWT_ACCESS_EXPIRY", DEFAULT_ACCESS_TOKEN_EXPIRY),
            refresh_token_expiry: env_or("JWT_REFRESH_EXPIRY", DEFAULT_REFRESH_TOKEN_EXPIRY),
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            public_key_path: "keys/app.pub".to_string(),
            private_key_path: "keys/app.key".to_string(),
            issuer: DEFAULT_ISSUER.to_string(),
            access_token_expiry: DEFAULT_ACCESS_TOKEN_EXPIRY,
            refresh_token_expiry: DEFAULT_REFRESH_TOKEN_EXPIRY,
        }
    }
}
