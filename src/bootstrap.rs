//! Startup seeding.

use tracing::{info, instrument};

use bookease_auth::CredentialStore;
use bookease_config::AdminConfig;
use bookease_core::{DomainError, PasswordHasher};
use bookease_models::{RoleName, User, UserRequestDto};

const ADMIN_DISPLAY_NAME: &str = "Administrador";

/// Creates the configured administrator unless an active account already
/// holds its username. Returns whether an account was created.
#[instrument(skip(store, hasher, config), fields(username = %config.username))]
pub async fn ensure_admin(
    store: &dyn CredentialStore,
    hasher: &dyn PasswordHasher,
    config: &AdminConfig,
) -> Result<bool, DomainError> {
    if store.find_active_by_username(&config.username).await?.is_some() {
        info!("Admin account already exists");
        return Ok(false);
    }

    let dto = UserRequestDto {
        username: config.username.clone(),
        password: config.password.clone(),
        name: ADMIN_DISPLAY_NAME.to_string(),
        phone: config.phone.clone(),
        email: config.email.clone(),
    };
    let admin = User::new(&dto, hasher.hash(&config.password)?, RoleName::Admin);

    store.save_user(&admin).await?;

    info!(user_id = %admin.id, "Admin account created");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookease_core::BcryptHasher;
    use bookease_db::MemoryStore;

    fn config() -> AdminConfig {
        AdminConfig {
            username: "admin".into(),
            password: "admin-password".into(),
            email: "admin@bookease.local".into(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn test_creates_admin_once() {
        let store = MemoryStore::new();
        let hasher = BcryptHasher::with_cost(4);

        assert!(ensure_admin(&store, &hasher, &config()).await.unwrap());
        assert!(!ensure_admin(&store, &hasher, &config()).await.unwrap());

        let admin = store
            .find_active_by_username("admin")
            .await
            .unwrap()
            .unwrap();
        assert!(admin.has_role(RoleName::Admin));
        assert_eq!(admin.name, "Administrador");
        assert!(hasher.verify("admin-password", &admin.password_hash).unwrap());
    }
}
