//! Reusable lifecycle operations for person-owned entities.
//!
//! Every clinic, doctor and patient service goes through these helpers for
//! lookups, uniqueness checks, owner profile updates and deactivation, so
//! the ownership and soft-delete rules live in one place.

use tracing::{info, instrument};
use uuid::Uuid;

use bookease_auth::{CredentialStore, SecurityContext, verify_ownership};
use bookease_core::{DomainError, PasswordHasher};
use bookease_db::Repository;
use bookease_models::{PersonOwned, UpdateUserDto, User, UserField, UserRequestDto};
use bookease_observability::track_entity_deactivated;

/// Loads an active record or fails with `NotFound(label, id)`.
pub async fn find_or_fail<T: PersonOwned>(
    id: Uuid,
    repo: &dyn Repository<T>,
    label: &str,
) -> Result<T, DomainError> {
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found(label, id))
}

/// Loads an active record and maps it to its response shape. Read access is
/// governed by route-level role gates only.
pub async fn find_by_id_or_fail<T, R, F>(
    id: Uuid,
    repo: &dyn Repository<T>,
    mapper: F,
    label: &str,
) -> Result<R, DomainError>
where
    T: PersonOwned,
    F: FnOnce(&T) -> R,
{
    let entity = find_or_fail(id, repo, label).await?;
    Ok(mapper(&entity))
}

/// Loads an active record by its account's display name or fails with
/// `NotFound(label, name)`.
pub async fn find_by_name_or_fail<T, R, F>(
    name: &str,
    repo: &dyn Repository<T>,
    mapper: F,
    label: &str,
) -> Result<R, DomainError>
where
    T: PersonOwned,
    F: FnOnce(&T) -> R,
{
    repo.find_by_name(name)
        .await?
        .map(|entity| mapper(&entity))
        .ok_or_else(|| DomainError::not_found(label, name))
}

/// Loads an active record whose user is the caller.
pub async fn find_owned<T: PersonOwned>(
    id: Uuid,
    repo: &dyn Repository<T>,
    ctx: &SecurityContext,
    label: &str,
) -> Result<T, DomainError> {
    let entity = find_or_fail(id, repo, label).await?;
    verify_ownership(ctx, entity.user())?;
    Ok(entity)
}

/// Clears the entity's and its user's active flags in a single save.
///
/// With `require_ownership` the caller must be the entity's user.
#[instrument(skip(repo, ctx))]
pub async fn deactivate<T: PersonOwned>(
    id: Uuid,
    repo: &dyn Repository<T>,
    ctx: &SecurityContext,
    require_ownership: bool,
    label: &'static str,
) -> Result<(), DomainError> {
    let mut entity = if require_ownership {
        find_owned(id, repo, ctx, label).await?
    } else {
        find_or_fail(id, repo, label).await?
    };

    entity.deactivate();
    repo.save(&entity).await?;

    track_entity_deactivated(label);
    info!(entity = label, %id, "Entity deactivated");
    Ok(())
}

/// Fails with `DuplicateField(label)` when an active record matches
/// `candidate`. A missing candidate always passes.
pub fn validate_unique_field<T, F>(
    candidate: Option<&str>,
    records: &[T],
    matches: F,
    label: &str,
) -> Result<(), DomainError>
where
    T: PersonOwned,
    F: Fn(&T, &str) -> bool,
{
    let Some(candidate) = candidate else {
        return Ok(());
    };

    if records
        .iter()
        .filter(|record| record.is_active())
        .any(|record| matches(record, candidate))
    {
        return Err(DomainError::duplicate_field(label));
    }

    Ok(())
}

/// Rejects username, email or phone values already held by an active account.
pub async fn ensure_user_fields_available(
    store: &dyn CredentialStore,
    dto: &UserRequestDto,
) -> Result<(), DomainError> {
    let candidates = [
        (UserField::Username, Some(dto.username.as_str())),
        (UserField::Email, Some(dto.email.as_str())),
        (UserField::Phone, dto.phone.as_deref()),
    ];

    for (field, value) in candidates {
        let Some(value) = value else { continue };
        if store.exists_active(field, value).await? {
            return Err(DomainError::duplicate_field(field.label()));
        }
    }

    Ok(())
}

/// Like [`ensure_user_fields_available`] for a partial update, ignoring values
/// the owner already holds.
async fn ensure_update_available(
    store: &dyn CredentialStore,
    owner: &User,
    dto: &UpdateUserDto,
) -> Result<(), DomainError> {
    for (field, value) in dto.unique_candidates() {
        if owner.field(field) == Some(value) {
            continue;
        }
        if store.exists_active(field, value).await? {
            return Err(DomainError::duplicate_field(field.label()));
        }
    }

    Ok(())
}

/// Applies a profile update to the entity's user after the ownership check.
///
/// Fails with `NotFound` if the record was deactivated while the update was
/// being prepared. A revocation recorded meanwhile is kept.
#[instrument(skip(repo, store, hasher, ctx, dto))]
pub async fn update_profile<T: PersonOwned>(
    id: Uuid,
    repo: &dyn Repository<T>,
    store: &dyn CredentialStore,
    hasher: &dyn PasswordHasher,
    ctx: &SecurityContext,
    dto: &UpdateUserDto,
    label: &str,
) -> Result<T, DomainError> {
    let mut entity = find_owned(id, repo, ctx, label).await?;
    ensure_update_available(store, entity.user(), dto).await?;

    let password_hash = dto
        .password
        .as_deref()
        .map(|password| hasher.hash(password))
        .transpose()?;
    dto.apply_to(entity.user_mut(), password_hash);

    repo.save(&entity).await?;
    info!(entity = label, %id, "Profile updated");
    Ok(entity)
}
