use std::env;

/// Bootstrap administrator created at startup when no active account holds
/// the username yet.
///
/// Only present when both `ADMIN_USERNAME` and `ADMIN_PASSWORD` are set.
#[derive(Clone, Debug)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
    pub email: String,
    pub phone: Option<String>,
}

impl AdminConfig {
    pub fn from_env() -> Option<Self> {
        let username = env::var("ADMIN_USERNAME").ok()?;
        let password = env::var("ADMIN_PASSWORD").ok()?;

        Some(Self {
            email: env::var("ADMIN_EMAIL").unwrap_or_else(|_| format!("{username}@bookease.local")),
            phone: env::var("ADMIN_PHONE").ok().filter(|p| !p.is_empty()),
            username,
            password,
        })
    }
}
