use tracing::{info, instrument};
use uuid::Uuid;

use bookease_auth::{CredentialStore, SecurityContext};
use bookease_core::{DomainError, PasswordHasher};
use bookease_db::Repository;
use bookease_models::{Patient, PatientRequestDto, PatientResponse, UpdateUserDto, User};
use bookease_observability::track_entity_registered;

use crate::utils::lifecycle;

const ENTITY: &str = "Patient";

pub struct PatientService;

impl PatientService {
    #[instrument(skip(repo, store, hasher, dto), fields(username = %dto.user.username))]
    pub async fn register(
        repo: &dyn Repository<Patient>,
        store: &dyn CredentialStore,
        hasher: &dyn PasswordHasher,
        dto: PatientRequestDto,
    ) -> Result<PatientResponse, DomainError> {
        let patients = repo.list_all().await?;
        lifecycle::validate_unique_field(
            Some(dto.cpf.as_str()),
            &patients,
            |patient, cpf| patient.cpf == cpf,
            "CPF",
        )?;
        lifecycle::ensure_user_fields_available(store, &dto.user).await?;

        let password_hash = hasher.hash(&dto.user.password)?;
        let patient = Patient::new(&dto, User::new(&dto.user, password_hash, Patient::ROLE));

        repo.save(&patient).await?;

        track_entity_registered(ENTITY);
        info!(patient_id = %patient.id, "Patient registered");
        Ok(PatientResponse::from(&patient))
    }

    pub async fn get_by_id(
        repo: &dyn Repository<Patient>,
        id: Uuid,
    ) -> Result<PatientResponse, DomainError> {
        lifecycle::find_by_id_or_fail(id, repo, |p| PatientResponse::from(p), ENTITY).await
    }

    pub async fn get_by_cpf(
        repo: &dyn Repository<Patient>,
        cpf: &str,
    ) -> Result<PatientResponse, DomainError> {
        repo.find_by_document(cpf)
            .await?
            .map(|patient| PatientResponse::from(&patient))
            .ok_or_else(|| DomainError::not_found(ENTITY, cpf))
    }

    pub async fn get_by_name(
        repo: &dyn Repository<Patient>,
        name: &str,
    ) -> Result<PatientResponse, DomainError> {
        lifecycle::find_by_name_or_fail(name, repo, |p| PatientResponse::from(p), ENTITY).await
    }

    pub async fn update(
        repo: &dyn Repository<Patient>,
        store: &dyn CredentialStore,
        hasher: &dyn PasswordHasher,
        ctx: &SecurityContext,
        id: Uuid,
        dto: &UpdateUserDto,
    ) -> Result<PatientResponse, DomainError> {
        let patient = lifecycle::update_profile(id, repo, store, hasher, ctx, dto, ENTITY).await?;
        Ok(PatientResponse::from(&patient))
    }

    pub async fn deactivate(
        repo: &dyn Repository<Patient>,
        ctx: &SecurityContext,
        id: Uuid,
    ) -> Result<(), DomainError> {
        lifecycle::deactivate(id, repo, ctx, true, ENTITY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookease_auth::{Principal, UserDetails};
    use bookease_core::BcryptHasher;
    use bookease_db::MemoryStore;
    use bookease_models::UserRequestDto;

    const HASHER: BcryptHasher = BcryptHasher::with_cost(4);

    fn request(username: &str, cpf: &str) -> PatientRequestDto {
        PatientRequestDto {
            cpf: cpf.into(),
            user: UserRequestDto {
                username: username.into(),
                password: "password123".into(),
                name: "Maria Silva".into(),
                phone: None,
                email: format!("{username}@bookease.com"),
            },
        }
    }

    fn owner(username: &str) -> SecurityContext {
        SecurityContext::authenticated(Principal::Credentials(UserDetails {
            username: username.into(),
            roles: vec!["ROLE_PATIENT".into()],
        }))
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_cpf() {
        let store = MemoryStore::new();
        PatientService::register(&store, &store, &HASHER, request("maria", "12345678901"))
            .await
            .unwrap();

        let err = PatientService::register(&store, &store, &HASHER, request("joana", "12345678901"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "CPF já existe");
    }

    #[tokio::test]
    async fn test_deactivate_hides_patient_and_account() {
        let store = MemoryStore::new();
        let patient = PatientService::register(&store, &store, &HASHER, request("maria", "12345678901"))
            .await
            .unwrap();

        PatientService::deactivate(&store, &owner("maria"), patient.id)
            .await
            .unwrap();

        let err = PatientService::get_by_id(&store, patient.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert!(
            store
                .find_active_by_username("maria")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_update_by_other_patient_is_forbidden() {
        let store = MemoryStore::new();
        let patient = PatientService::register(&store, &store, &HASHER, request("maria", "12345678901"))
            .await
            .unwrap();

        let dto = UpdateUserDto {
            name: Some("Intruder".into()),
            ..Default::default()
        };
        let err = PatientService::update(&store, &store, &HASHER, &owner("joana"), patient.id, &dto)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));

        let unchanged = PatientService::get_by_cpf(&store, "12345678901").await.unwrap();
        assert_eq!(unchanged.name, "Maria Silva");
    }

    #[tokio::test]
    async fn test_get_by_name_matches_exact_display_name() {
        let store = MemoryStore::new();
        let patient = PatientService::register(&store, &store, &HASHER, request("maria", "12345678901"))
            .await
            .unwrap();

        let found = PatientService::get_by_name(&store, "Maria Silva").await.unwrap();
        assert_eq!(found.id, patient.id);

        let err = PatientService::get_by_name(&store, "maria silva")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
