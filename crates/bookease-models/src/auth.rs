//! Authentication DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Login request with username and password.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username é obrigatório"))]
    #[schema(example = "testuser")]
    pub username: String,
    #[validate(length(min = 1, message = "Senha é obrigatória"))]
    #[schema(example = "password")]
    pub password: String,
}

/// Successful login response.
///
/// Both values are opaque signed strings. The access token authorizes
/// requests for a short period; the refresh token only mints new access
/// tokens.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}
