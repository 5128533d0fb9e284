use tracing::{info, instrument};
use uuid::Uuid;

use bookease_auth::{CredentialStore, SecurityContext};
use bookease_core::{DomainError, PasswordHasher};
use bookease_db::{ClinicDirectory, Repository};
use bookease_models::{Clinic, ClinicRequestDto, ClinicResponse, UpdateUserDto, User};
use bookease_observability::track_entity_registered;

use crate::utils::lifecycle;

const ENTITY: &str = "Clinic";

pub struct ClinicService;

impl ClinicService {
    #[instrument(skip(repo, store, hasher, dto), fields(cnpj = %dto.cnpj))]
    pub async fn register(
        repo: &dyn Repository<Clinic>,
        store: &dyn CredentialStore,
        hasher: &dyn PasswordHasher,
        dto: ClinicRequestDto,
    ) -> Result<ClinicResponse, DomainError> {
        let clinics = repo.list_all().await?;
        lifecycle::validate_unique_field(
            Some(dto.cnpj.as_str()),
            &clinics,
            |clinic, cnpj| clinic.cnpj == cnpj,
            "CNPJ",
        )?;
        lifecycle::ensure_user_fields_available(store, &dto.user).await?;

        let password_hash = hasher.hash(&dto.user.password)?;
        let user = User::new(&dto.user, password_hash, Clinic::ROLE);
        let clinic = Clinic::new(&dto, user);

        repo.save(&clinic).await?;

        track_entity_registered(ENTITY);
        info!(clinic_id = %clinic.id, "Clinic registered");
        Ok(ClinicResponse::from(&clinic))
    }

    pub async fn get_by_id(
        repo: &dyn Repository<Clinic>,
        id: Uuid,
    ) -> Result<ClinicResponse, DomainError> {
        lifecycle::find_by_id_or_fail(id, repo, |c| ClinicResponse::from(c), ENTITY).await
    }

    pub async fn get_by_cnpj(
        repo: &dyn Repository<Clinic>,
        cnpj: &str,
    ) -> Result<ClinicResponse, DomainError> {
        repo.find_by_document(cnpj)
            .await?
            .map(|clinic| ClinicResponse::from(&clinic))
            .ok_or_else(|| DomainError::not_found(ENTITY, cnpj))
    }

    pub async fn get_by_name(
        repo: &dyn Repository<Clinic>,
        name: &str,
    ) -> Result<ClinicResponse, DomainError> {
        lifecycle::find_by_name_or_fail(name, repo, |c| ClinicResponse::from(c), ENTITY).await
    }

    /// First clinic by username when several share the city.
    pub async fn get_by_city(
        directory: &dyn ClinicDirectory,
        city: &str,
    ) -> Result<ClinicResponse, DomainError> {
        directory
            .find_by_city(city)
            .await?
            .map(|clinic| ClinicResponse::from(&clinic))
            .ok_or_else(|| DomainError::not_found(ENTITY, city))
    }

    pub async fn update(
        repo: &dyn Repository<Clinic>,
        store: &dyn CredentialStore,
        hasher: &dyn PasswordHasher,
        ctx: &SecurityContext,
        id: Uuid,
        dto: &UpdateUserDto,
    ) -> Result<ClinicResponse, DomainError> {
        let clinic = lifecycle::update_profile(id, repo, store, hasher, ctx, dto, ENTITY).await?;
        Ok(ClinicResponse::from(&clinic))
    }

    pub async fn deactivate(
        repo: &dyn Repository<Clinic>,
        ctx: &SecurityContext,
        id: Uuid,
    ) -> Result<(), DomainError> {
        lifecycle::deactivate(id, repo, ctx, true, ENTITY).await
    }
}
