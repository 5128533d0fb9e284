//! In-memory implementation of every storage contract.
//!
//! All tables sit behind one lock, so a `save` is atomic the same way a
//! database transaction is. Users are stored once and re-attached to entities
//! on read, which keeps account flag updates visible through every entity
//! that links to the account. Uniqueness among active rows is enforced on
//! write, mirroring the partial unique indexes of the Postgres schema.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use bookease_auth::CredentialStore;
use bookease_core::DomainError;
use bookease_models::{
    Clinic, Doctor, Patient, PersonOwned, SPECIALITIES, User, UserField, speciality_matches,
};

use crate::repository::{ClinicDirectory, Repository, SpecialityCatalog};

#[derive(Debug)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    clinics: HashMap<Uuid, Clinic>,
    doctors: HashMap<Uuid, Doctor>,
    patients: HashMap<Uuid, Patient>,
    specialities: Vec<String>,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            users: HashMap::new(),
            clinics: HashMap::new(),
            doctors: HashMap::new(),
            patients: HashMap::new(),
            specialities: SPECIALITIES.iter().map(ToString::to_string).collect(),
        }
    }
}

impl MemoryState {
    fn attach_user<T: PersonOwned>(&self, entity: &T) -> T {
        let mut entity = entity.clone();
        if let Some(user) = self.users.get(&entity.user().id) {
            *entity.user_mut() = user.clone();
        }
        entity
    }

    /// The row to store for `user`: the stored revocation flag wins, and an
    /// inactive stored account is never overwritten.
    fn writable_user(&self, user: &User) -> Option<User> {
        match self.users.get(&user.id) {
            Some(stored) if !stored.active => None,
            Some(stored) => Some(User {
                token_revoked: stored.token_revoked,
                ..user.clone()
            }),
            None => Some(user.clone()),
        }
    }

    fn check_user_unique(&self, user: &User) -> Result<(), DomainError> {
        if !user.active {
            return Ok(());
        }

        for field in UserField::ALL {
            let Some(value) = user.field(field) else {
                continue;
            };
            let taken = self
                .users
                .values()
                .any(|other| other.id != user.id && other.active && other.field(field) == Some(value));
            if taken {
                return Err(DomainError::duplicate_field(field.label()));
            }
        }

        Ok(())
    }

    /// Active entities matching `filter`, with current accounts, by username.
    fn active_sorted<T, F>(&self, table: &HashMap<Uuid, T>, filter: F) -> Vec<T>
    where
        T: PersonOwned,
        F: Fn(&T) -> bool,
    {
        let mut entities: Vec<T> = table
            .values()
            .filter(|entity| entity.is_active())
            .map(|entity| self.attach_user(entity))
            .filter(|entity| filter(entity))
            .collect();
        entities.sort_by(|a, b| a.user().username.cmp(&b.user().username));
        entities
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads an account regardless of its active flag.
    pub async fn user_by_id(&self, id: Uuid) -> Option<User> {
        self.state.read().await.users.get(&id).cloned()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_active_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|user| user.active && user.username == username)
            .cloned())
    }

    async fn set_token_revoked(&self, user_id: Uuid, revoked: bool) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if let Some(user) = state.users.get_mut(&user_id) {
            user.token_revoked = revoked;
        }
        Ok(())
    }

    async fn exists_active(&self, field: UserField, value: &str) -> Result<bool, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .any(|user| user.active && user.field(field) == Some(value)))
    }

    async fn save_user(&self, user: &User) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let Some(row) = state.writable_user(user) else {
            return Err(DomainError::not_found("User", user.id));
        };
        state.check_user_unique(&row)?;
        state.users.insert(row.id, row);
        Ok(())
    }
}

#[async_trait]
impl ClinicDirectory for MemoryStore {
    async fn find_by_city(&self, city: &str) -> Result<Option<Clinic>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .active_sorted(&state.clinics, |clinic| clinic.city == city)
            .into_iter()
            .next())
    }
}

#[async_trait]
impl SpecialityCatalog for MemoryStore {
    async fn find_specialities(&self, names: &[String]) -> Result<Vec<String>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .specialities
            .iter()
            .filter(|speciality| names.iter().any(|name| speciality_matches(speciality, name)))
            .cloned()
            .collect())
    }

    async fn find_doctors_by_speciality(&self, name: &str) -> Result<Vec<Doctor>, DomainError> {
        let state = self.state.read().await;
        Ok(state.active_sorted(&state.doctors, |doctor| doctor.has_speciality(name)))
    }
}

/// Implements [`Repository`] for one entity table plus an inherent accessor
/// that ignores the active flag.
macro_rules! memory_repository {
    ($entity:ty, $table:ident, $document:ident, $label:literal, $name:literal, $any_fn:ident) => {
        impl MemoryStore {
            /// Reads the record regardless of its active flag.
            pub async fn $any_fn(&self, id: Uuid) -> Option<$entity> {
                let state = self.state.read().await;
                state.$table.get(&id).map(|entity| state.attach_user(entity))
            }
        }

        #[async_trait]
        impl Repository<$entity> for MemoryStore {
            async fn find_by_id(&self, id: Uuid) -> Result<Option<$entity>, DomainError> {
                let state = self.state.read().await;
                Ok(state
                    .$table
                    .get(&id)
                    .filter(|entity| entity.active)
                    .map(|entity| state.attach_user(entity)))
            }

            async fn find_by_document(&self, document: &str) -> Result<Option<$entity>, DomainError> {
                let state = self.state.read().await;
                Ok(state
                    .$table
                    .values()
                    .find(|entity| entity.active && entity.$document == document)
                    .map(|entity| state.attach_user(entity)))
            }

            async fn find_by_name(&self, name: &str) -> Result<Option<$entity>, DomainError> {
                let state = self.state.read().await;
                Ok(state
                    .active_sorted(&state.$table, |entity| entity.user.name == name)
                    .into_iter()
                    .next())
            }

            async fn list_all(&self) -> Result<Vec<$entity>, DomainError> {
                let state = self.state.read().await;
                let mut entities = state.active_sorted(&state.$table, |_| true);
                entities.sort_by(|a, b| a.user.name.cmp(&b.user.name));
                Ok(entities)
            }

            async fn save(&self, entity: &$entity) -> Result<(), DomainError> {
                let mut state = self.state.write().await;

                if state.$table.get(&entity.id).is_some_and(|stored| !stored.active) {
                    return Err(DomainError::not_found($name, entity.id));
                }
                let Some(user) = state.writable_user(&entity.user) else {
                    return Err(DomainError::not_found($name, entity.id));
                };

                if entity.active {
                    let taken = state.$table.values().any(|other| {
                        other.id != entity.id && other.active && other.$document == entity.$document
                    });
                    if taken {
                        return Err(DomainError::duplicate_field($label));
                    }
                }
                state.check_user_unique(&user)?;

                state.users.insert(user.id, user);
                state.$table.insert(entity.id, entity.clone());
                Ok(())
            }
        }
    };
}

memory_repository!(Clinic, clinics, cnpj, "CNPJ", "Clinic", any_clinic);
memory_repository!(Doctor, doctors, crm, "CRM", "Doctor", any_doctor);
memory_repository!(Patient, patients, cpf, "CPF", "Patient", any_patient);

#[cfg(test)]
mod tests {
    use super::*;
    use bookease_models::{RoleName, UserRequestDto};

    fn user(username: &str, email: &str) -> User {
        let dto = UserRequestDto {
            username: username.into(),
            password: "password".into(),
            name: username.into(),
            phone: None,
            email: email.into(),
        };
        User::new(&dto, "hash".into(), RoleName::Patient)
    }

    fn patient(username: &str, cpf: &str) -> Patient {
        Patient {
            id: Uuid::new_v4(),
            user: user(username, &format!("{username}@bookease.com")),
            cpf: cpf.into(),
            active: true,
        }
    }

    #[tokio::test]
    async fn test_lookups_ignore_inactive_users() {
        let store = MemoryStore::new();
        let mut inactive = user("ghost", "ghost@bookease.com");
        inactive.active = false;
        store.save_user(&inactive).await.unwrap();

        assert!(store.find_active_by_username("ghost").await.unwrap().is_none());
        assert!(
            !store
                .exists_active(UserField::Email, "ghost@bookease.com")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_save_rejects_duplicate_active_username() {
        let store = MemoryStore::new();
        store.save_user(&user("maria", "a@bookease.com")).await.unwrap();

        let err = store
            .save_user(&user("maria", "b@bookease.com"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Username já existe");
    }

    #[tokio::test]
    async fn test_inactive_rows_do_not_block_reuse() {
        let store = MemoryStore::new();
        let mut old = patient("maria", "12345678901");
        old.deactivate();
        store.save(&old).await.unwrap();

        store.save(&patient("maria", "12345678901")).await.unwrap();
    }

    #[tokio::test]
    async fn test_entity_sees_account_flag_updates() {
        let store = MemoryStore::new();
        let patient = patient("maria", "12345678901");
        store.save(&patient).await.unwrap();

        store.set_token_revoked(patient.user.id, true).await.unwrap();

        let found: Patient = store.find_by_id(patient.id).await.unwrap().unwrap();
        assert!(found.user.token_revoked);
    }

    #[tokio::test]
    async fn test_deactivated_entity_hidden_but_retained() {
        let store = MemoryStore::new();
        let mut patient = patient("maria", "12345678901");
        store.save(&patient).await.unwrap();

        patient.deactivate();
        store.save(&patient).await.unwrap();

        let found: Option<Patient> = store.find_by_id(patient.id).await.unwrap();
        assert!(found.is_none());

        let retained = store.any_patient(patient.id).await.unwrap();
        assert!(!retained.active);
        assert!(!retained.user.active);
    }

    #[tokio::test]
    async fn test_find_by_document_and_list_all() {
        let store = MemoryStore::new();
        store.save(&patient("bruno", "11111111111")).await.unwrap();
        store.save(&patient("ana", "22222222222")).await.unwrap();

        let found: Patient = store.find_by_document("22222222222").await.unwrap().unwrap();
        assert_eq!(found.user.username, "ana");

        let all: Vec<Patient> = store.list_all().await.unwrap();
        let names: Vec<_> = all.iter().map(|p| p.user.name.as_str()).collect();
        assert_eq!(names, vec!["ana", "bruno"]);
    }

    #[tokio::test]
    async fn test_stale_save_keeps_revocation() {
        let store = MemoryStore::new();
        let saved = patient("maria", "12345678901");
        store.save(&saved).await.unwrap();

        let mut stale: Patient = store.find_by_id(saved.id).await.unwrap().unwrap();
        store.set_token_revoked(saved.user.id, true).await.unwrap();

        stale.user.name = "Maria Souza".into();
        store.save(&stale).await.unwrap();

        let user = store.user_by_id(saved.user.id).await.unwrap();
        assert!(user.token_revoked);
        assert_eq!(user.name, "Maria Souza");
    }

    #[tokio::test]
    async fn test_stale_save_cannot_reactivate() {
        let store = MemoryStore::new();
        let saved = patient("maria", "12345678901");
        store.save(&saved).await.unwrap();

        let stale: Patient = store.find_by_id(saved.id).await.unwrap().unwrap();
        let mut removed = stale.clone();
        removed.deactivate();
        store.save(&removed).await.unwrap();

        let err = store.save(&stale).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        let retained = store.any_patient(saved.id).await.unwrap();
        assert!(!retained.active);
        assert!(!retained.user.active);
    }

    #[tokio::test]
    async fn test_save_user_cannot_reactivate_account() {
        let store = MemoryStore::new();
        let mut account = user("maria", "maria@bookease.com");
        store.save_user(&account).await.unwrap();

        account.active = false;
        store.save_user(&account).await.unwrap();

        account.active = true;
        let err = store.save_user(&account).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert!(!store.user_by_id(account.id).await.unwrap().active);
    }

    #[tokio::test]
    async fn test_find_by_name_picks_first_username() {
        let store = MemoryStore::new();
        let mut zeta = patient("zeta", "11111111111");
        zeta.user.name = "Maria".into();
        let mut alpha = patient("alpha", "22222222222");
        alpha.user.name = "Maria".into();
        store.save(&zeta).await.unwrap();
        store.save(&alpha).await.unwrap();

        let found: Patient = store.find_by_name("Maria").await.unwrap().unwrap();
        assert_eq!(found.user.username, "alpha");

        let missing: Option<Patient> = store.find_by_name("maria").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_speciality_catalog_ignores_case() {
        let store = MemoryStore::new();

        let found = store
            .find_specialities(&["ortodontia".into(), "PRÓTESE DENTÁRIA".into(), "Cardiologia".into()])
            .await
            .unwrap();
        assert_eq!(found, vec!["Ortodontia".to_string(), "Prótese Dentária".to_string()]);
    }
}
