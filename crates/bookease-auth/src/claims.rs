//! JWT claim structures.
//!
//! - [`AccessTokenClaims`]: short-lived, carries the caller's role claims
//! - [`RefreshTokenClaims`]: long-lived, identity only

use serde::{Deserialize, Serialize};

/// Claims embedded in access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Username (subject claim)
    pub sub: String,
    /// Issuing service
    pub iss: String,
    /// Issued-at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// Role claims, each prefixed with `ROLE_` and sorted by role name
    pub roles: Vec<String>,
}

/// Claims embedded in refresh tokens.
///
/// There is no `roles` claim, so a refresh token never deserializes as an
/// access token. Unknown fields are rejected for the same reason in the
/// other direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefreshTokenClaims {
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}
