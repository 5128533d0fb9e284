use tracing::{info, instrument, warn};

use bookease_auth::{CredentialStore, TokenPair, TokenService};
use bookease_core::{DomainError, PasswordHasher};
use bookease_models::{LoginRequest, RoleName, User};
use bookease_observability::{
    LoginFailure, track_login_failure, track_login_success, track_tokens_issued, track_tokens_revoked,
};

pub const ACCOUNT_INACTIVE: &str = "Conta inativa";
pub const TOKENS_REVOKED: &str = "Tokens revogados, faça login novamente";

pub struct AuthService;

impl AuthService {
    /// Checks the credentials and issues an access/refresh token pair.
    ///
    /// Account state is checked before the password, so a revoked account is
    /// refused even when the password is wrong.
    #[instrument(skip(store, hasher, tokens, dto), fields(username = %dto.username))]
    pub async fn authenticate(
        store: &dyn CredentialStore,
        hasher: &dyn PasswordHasher,
        tokens: &TokenService,
        dto: LoginRequest,
    ) -> Result<TokenPair, DomainError> {
        let Some(user) = store.find_active_by_username(&dto.username).await? else {
            track_login_failure(LoginFailure::NotFound);
            return Err(DomainError::not_found("User", &dto.username));
        };

        if let Err(err) = Self::check_account_state(&user) {
            track_login_failure(if user.active {
                LoginFailure::Revoked
            } else {
                LoginFailure::Inactive
            });
            return Err(err);
        }

        if !hasher.verify(&dto.password, &user.password_hash)? {
            warn!("Login failed: invalid credentials");
            track_login_failure(LoginFailure::InvalidCredentials);
            return Err(DomainError::InvalidCredentials);
        }

        let pair = tokens.issue(&user)?;

        let role = user.roles.iter().next().map(RoleName::as_str).unwrap_or("NONE");
        track_login_success(role);
        track_tokens_issued();
        info!(role, "User logged in");

        Ok(pair)
    }

    /// Marks the account's tokens as revoked. Revoking twice is not an error.
    #[instrument(skip(store))]
    pub async fn revoke(store: &dyn CredentialStore, username: &str) -> Result<(), DomainError> {
        let user = store
            .find_active_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("User", username))?;

        store.set_token_revoked(user.id, true).await?;

        track_tokens_revoked();
        info!(user_id = %user.id, "Tokens revoked");
        Ok(())
    }

    /// Loads the token subject's account and confirms it may still act.
    pub async fn ensure_account_usable(
        store: &dyn CredentialStore,
        username: &str,
    ) -> Result<User, DomainError> {
        let user = store
            .find_active_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("User", username))?;

        Self::check_account_state(&user)?;
        Ok(user)
    }

    fn check_account_state(user: &User) -> Result<(), DomainError> {
        if !user.active {
            return Err(DomainError::operation_denied(ACCOUNT_INACTIVE));
        }
        if user.token_revoked {
            return Err(DomainError::operation_denied(TOKENS_REVOKED));
        }
        Ok(())
    }
}
