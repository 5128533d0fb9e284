use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;
use utoipa::ToSchema;

use bookease_core::AppError;
use bookease_models::{LoginRequest, TokenResponse};

use crate::middleware::auth::TokenPrincipal;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::AuthService;

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Login and receive an access/refresh token pair
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 404, description = "No active account with this username", body = ErrorResponse),
        (status = 409, description = "Account inactive or tokens revoked", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let pair =
        AuthService::authenticate(state.users.as_ref(), state.hasher.as_ref(), &state.tokens, dto)
            .await?;

    Ok(Json(TokenResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

/// Revoke every token of the calling account
#[utoipa::path(
    post,
    path = "/auth/revoke",
    responses(
        (status = 204, description = "Tokens revoked"),
        (status = 401, description = "Missing, expired or invalid token", body = ErrorResponse),
        (status = 404, description = "Account no longer active", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, principal), fields(username = %principal.0.subject))]
pub async fn revoke(
    State(state): State<AppState>,
    principal: TokenPrincipal,
) -> Result<StatusCode, AppError> {
    AuthService::revoke(state.users.as_ref(), &principal.0.subject).await?;
    Ok(StatusCode::NO_CONTENT)
}
