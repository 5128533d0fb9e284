use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use bookease_auth::{Principal, SecurityContext, VerifiedToken};
use bookease_core::AppError;
use bookease_models::RoleName;
use bookease_observability::track_token_validation;

use crate::modules::auth::service::AuthService;
use crate::state::AppState;

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Missing authorization header".to_string()))?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::unauthorized("Invalid authorization header format".to_string()))
}

/// The claims of a bearer token whose signature and expiry check out.
///
/// Account state is not consulted.
#[derive(Debug, Clone)]
pub struct TokenPrincipal(pub VerifiedToken);

impl FromRequestParts<AppState> for TokenPrincipal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let verified = state.tokens.verify(token);
        track_token_validation(verified.is_ok());

        Ok(TokenPrincipal(verified?))
    }
}

/// An authenticated caller whose account is still active and not revoked.
///
/// Once extracted it is cached in the request extensions, so a role gate and
/// the handler behind it share a single account lookup.
#[derive(Debug, Clone)]
pub struct AuthUser(pub SecurityContext);

impl AuthUser {
    pub fn context(&self) -> &SecurityContext {
        &self.0
    }

    pub fn username(&self) -> &str {
        self.0.principal().map(Principal::username).unwrap_or_default()
    }

    pub fn has_role(&self, role: RoleName) -> bool {
        self.0.principal().is_some_and(|p| p.has_role(role))
    }

    pub fn has_any_role(&self, roles: &[RoleName]) -> bool {
        roles.iter().any(|role| self.has_role(*role))
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(cached) = parts.extensions.get::<AuthUser>() {
            return Ok(cached.clone());
        }

        let TokenPrincipal(token) = TokenPrincipal::from_request_parts(parts, state).await?;
        AuthService::ensure_account_usable(state.users.as_ref(), &token.subject).await?;

        let auth_user = AuthUser(SecurityContext::authenticated(Principal::Token(token)));
        parts.extensions.insert(auth_user.clone());
        Ok(auth_user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn auth_user(roles: &[&str]) -> AuthUser {
        AuthUser(SecurityContext::authenticated(Principal::Token(
            VerifiedToken {
                subject: "testuser".into(),
                roles: roles.iter().map(|r| r.to_string()).collect(),
                expires_at: Utc::now(),
            },
        )))
    }

    #[test]
    fn test_username_from_token() {
        assert_eq!(auth_user(&[]).username(), "testuser");
    }

    #[test]
    fn test_has_role_uses_prefixed_claims() {
        let user = auth_user(&["ROLE_DOCTOR"]);
        assert!(user.has_role(RoleName::Doctor));
        assert!(!user.has_role(RoleName::Admin));
        assert!(user.has_any_role(&[RoleName::Admin, RoleName::Doctor]));
    }

    #[test]
    fn test_unprefixed_role_claim_does_not_match() {
        assert!(!auth_user(&["DOCTOR"]).has_role(RoleName::Doctor));
    }
}
