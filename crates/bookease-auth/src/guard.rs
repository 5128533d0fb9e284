//! Ownership check for person-owned records.
//!
//! Role gates run earlier, at the route layer. This guard only answers one
//! question: is the caller the user that owns the record? There is no admin
//! override here.

use tracing::warn;

use bookease_core::DomainError;
use bookease_models::User;

use crate::principal::{SecurityContext, resolve_current_username};

pub const OWNERSHIP_DENIED: &str = "Você só pode alterar suas próprias informações";

/// Fails with [`DomainError::Unauthorized`] unless the caller's username equals
/// `owner.username`. Has no side effects.
pub fn verify_ownership(ctx: &SecurityContext, owner: &User) -> Result<(), DomainError> {
    match resolve_current_username(ctx) {
        Some(username) if username == owner.username => Ok(()),
        caller => {
            warn!(
                caller = caller.as_deref().unwrap_or("<anonymous>"),
                owner = %owner.username,
                "Ownership check failed"
            );
            Err(DomainError::unauthorized(OWNERSHIP_DENIED))
        }
    }
}
