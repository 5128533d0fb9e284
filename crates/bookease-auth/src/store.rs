//! Persistence contract used by authentication.

use async_trait::async_trait;
use uuid::Uuid;

use bookease_core::DomainError;
use bookease_models::{User, UserField};

/// Account lookups and flag updates.
///
/// Every lookup only sees rows with `active = true`. Deactivated accounts are
/// kept for auditing but are invisible here.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_active_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    async fn set_token_revoked(&self, user_id: Uuid, revoked: bool) -> Result<(), DomainError>;

    /// Whether an active account already holds `value` in `field`.
    async fn exists_active(&self, field: UserField, value: &str) -> Result<bool, DomainError>;

    /// Inserts or updates an account that is not linked to any entity, along
    /// with its role links.
    async fn save_user(&self, user: &User) -> Result<(), DomainError>;
}
