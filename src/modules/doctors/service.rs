use std::collections::BTreeSet;

use tracing::{info, instrument};
use uuid::Uuid;

use bookease_auth::{CredentialStore, SecurityContext};
use bookease_core::{DomainError, PasswordHasher};
use bookease_db::{Repository, SpecialityCatalog};
use bookease_models::{
    Doctor, DoctorRequestDto, DoctorResponse, SpecialityRequestDto, UpdateUserDto, User,
    speciality_matches,
};
use bookease_observability::track_entity_registered;

use crate::utils::lifecycle;

const ENTITY: &str = "Doctor";
const SPECIALITY: &str = "Speciality";

/// Maps requested names to catalog names. Every name must exist.
async fn resolve_specialities(
    catalog: &dyn SpecialityCatalog,
    names: &[String],
) -> Result<BTreeSet<String>, DomainError> {
    if names.is_empty() {
        return Ok(BTreeSet::new());
    }

    let found = catalog.find_specialities(names).await?;
    let missing: Vec<&str> = names
        .iter()
        .filter(|name| !found.iter().any(|speciality| speciality_matches(speciality, name)))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(DomainError::not_found(SPECIALITY, missing.join(", ")));
    }

    Ok(found.into_iter().collect())
}

pub struct DoctorService;

impl DoctorService {
    #[instrument(skip(repo, store, catalog, hasher, dto), fields(crm = %dto.crm))]
    pub async fn register(
        repo: &dyn Repository<Doctor>,
        store: &dyn CredentialStore,
        catalog: &dyn SpecialityCatalog,
        hasher: &dyn PasswordHasher,
        dto: DoctorRequestDto,
    ) -> Result<DoctorResponse, DomainError> {
        let doctors = repo.list_all().await?;
        lifecycle::validate_unique_field(
            Some(dto.crm.as_str()),
            &doctors,
            |doctor, crm| doctor.crm == crm,
            "CRM",
        )?;
        lifecycle::ensure_user_fields_available(store, &dto.user).await?;
        let specialities = resolve_specialities(catalog, &dto.speciality_names).await?;

        let password_hash = hasher.hash(&dto.user.password)?;
        let user = User::new(&dto.user, password_hash, Doctor::ROLE);
        let doctor = Doctor::new(&dto, user, specialities);

        repo.save(&doctor).await?;

        track_entity_registered(ENTITY);
        info!(doctor_id = %doctor.id, "Doctor registered");
        Ok(DoctorResponse::from(&doctor))
    }

    pub async fn get_by_id(
        repo: &dyn Repository<Doctor>,
        id: Uuid,
    ) -> Result<DoctorResponse, DomainError> {
        lifecycle::find_by_id_or_fail(id, repo, |d| DoctorResponse::from(d), ENTITY).await
    }

    pub async fn get_by_crm(
        repo: &dyn Repository<Doctor>,
        crm: &str,
    ) -> Result<DoctorResponse, DomainError> {
        repo.find_by_document(crm)
            .await?
            .map(|doctor| DoctorResponse::from(&doctor))
            .ok_or_else(|| DomainError::not_found(ENTITY, crm))
    }

    pub async fn get_by_name(
        repo: &dyn Repository<Doctor>,
        name: &str,
    ) -> Result<DoctorResponse, DomainError> {
        lifecycle::find_by_name_or_fail(name, repo, |d| DoctorResponse::from(d), ENTITY).await
    }

    /// An empty result is reported as `NotFound`.
    pub async fn get_by_speciality(
        catalog: &dyn SpecialityCatalog,
        speciality: &str,
    ) -> Result<Vec<DoctorResponse>, DomainError> {
        let doctors = catalog.find_doctors_by_speciality(speciality).await?;
        if doctors.is_empty() {
            return Err(DomainError::not_found(ENTITY, speciality));
        }
        Ok(doctors.iter().map(DoctorResponse::from).collect())
    }

    /// Admins pass the route gate but still need to own the record: the
    /// ownership guard has no override.
    pub async fn update(
        repo: &dyn Repository<Doctor>,
        store: &dyn CredentialStore,
        hasher: &dyn PasswordHasher,
        ctx: &SecurityContext,
        id: Uuid,
        dto: &UpdateUserDto,
    ) -> Result<DoctorResponse, DomainError> {
        let doctor = lifecycle::update_profile(id, repo, store, hasher, ctx, dto, ENTITY).await?;
        Ok(DoctorResponse::from(&doctor))
    }

    /// Links catalog specialities to the caller's own record. Existing links
    /// are kept.
    #[instrument(skip(repo, catalog, ctx, dto))]
    pub async fn add_specialities(
        repo: &dyn Repository<Doctor>,
        catalog: &dyn SpecialityCatalog,
        ctx: &SecurityContext,
        id: Uuid,
        dto: &SpecialityRequestDto,
    ) -> Result<DoctorResponse, DomainError> {
        let mut doctor = lifecycle::find_owned(id, repo, ctx, ENTITY).await?;
        let specialities = resolve_specialities(catalog, &dto.speciality_names).await?;

        doctor.specialities.extend(specialities);
        repo.save(&doctor).await?;

        info!(doctor_id = %id, specialities = doctor.specialities.len(), "Specialities updated");
        Ok(DoctorResponse::from(&doctor))
    }

    pub async fn deactivate(
        repo: &dyn Repository<Doctor>,
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
    use bookease_models::{RoleName, UserRequestDto};

    const HASHER: BcryptHasher = BcryptHasher::with_cost(4);

    fn request(username: &str, crm: &str) -> DoctorRequestDto {
        DoctorRequestDto {
            crm: crm.into(),
            speciality_names: vec![],
            user: UserRequestDto {
                username: username.into(),
                password: "password123".into(),
                name: format!("Dr. {username}"),
                phone: None,
                email: format!("{username}@bookease.com"),
            },
        }
    }

    fn caller(username: &str, role: RoleName) -> SecurityContext {
        SecurityContext::authenticated(Principal::Credentials(UserDetails {
            username: username.into(),
            roles: vec![role.authority()],
        }))
    }

    #[tokio::test]
    async fn test_register_and_lookup_by_crm() {
        let store = MemoryStore::new();
        let doctor = DoctorService::register(&store, &store, &store, &HASHER, request("house", "123456/SP"))
            .await
            .unwrap();

        let found = DoctorService::get_by_crm(&store, "123456/SP").await.unwrap();
        assert_eq!(found.id, doctor.id);
        assert_eq!(found.username, "house");

        let by_id = DoctorService::get_by_id(&store, doctor.id).await.unwrap();
        assert_eq!(by_id.crm, "123456/SP");
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_crm() {
        let store = MemoryStore::new();
        DoctorService::register(&store, &store, &store, &HASHER, request("house", "123456/SP"))
            .await
            .unwrap();

        let err = DoctorService::register(&store, &store, &store, &HASHER, request("wilson", "123456/SP"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "CRM já existe");
    }

    #[tokio::test]
    async fn test_register_rejects_taken_username() {
        let store = MemoryStore::new();
        DoctorService::register(&store, &store, &store, &HASHER, request("house", "123456/SP"))
            .await
            .unwrap();

        let mut dto = request("house", "654321/RJ");
        dto.user.email = "other@bookease.com".into();
        let err = DoctorService::register(&store, &store, &store, &HASHER, dto)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Username já existe");
    }

    #[tokio::test]
    async fn test_admin_cannot_deactivate_someone_elses_record() {
        let store = MemoryStore::new();
        let doctor = DoctorService::register(&store, &store, &store, &HASHER, request("house", "123456/SP"))
            .await
            .unwrap();

        let err = DoctorService::deactivate(&store, &caller("admin", RoleName::Admin), doctor.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));

        DoctorService::deactivate(&store, &caller("house", RoleName::Doctor), doctor.id)
            .await
            .unwrap();
        let stored = store.any_doctor(doctor.id).await.unwrap();
        assert!(!stored.active);
        assert!(!stored.user.active);
    }

    #[tokio::test]
    async fn test_update_rejects_email_of_another_account() {
        let store = MemoryStore::new();
        let house = DoctorService::register(&store, &store, &store, &HASHER, request("house", "123456/SP"))
            .await
            .unwrap();
        DoctorService::register(&store, &store, &store, &HASHER, request("wilson", "654321/RJ"))
            .await
            .unwrap();

        let dto = UpdateUserDto {
            email: Some("wilson@bookease.com".into()),
            ..Default::default()
        };
        let err = DoctorService::update(
            &store,
            &store,
            &HASHER,
            &caller("house", RoleName::Doctor),
            house.id,
            &dto,
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Email já existe");
    }

    #[tokio::test]
    async fn test_register_resolves_speciality_names() {
        let store = MemoryStore::new();
        let mut dto = request("house", "123456/SP");
        dto.speciality_names = vec!["ortodontia".into(), "PERIODONTIA".into()];

        let doctor = DoctorService::register(&store, &store, &store, &HASHER, dto)
            .await
            .unwrap();
        assert_eq!(doctor.specialities, vec!["Ortodontia", "Periodontia"]);

        let found = DoctorService::get_by_speciality(&store, "periodontia")
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, doctor.id);
    }

    #[tokio::test]
    async fn test_register_rejects_unknown_speciality() {
        let store = MemoryStore::new();
        let mut dto = request("house", "123456/SP");
        dto.speciality_names = vec!["Ortodontia".into(), "Cardiologia".into()];

        let err = DoctorService::register(&store, &store, &store, &HASHER, dto)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Speciality with identifier Cardiologia not found");

        let doctors: Vec<Doctor> = store.list_all().await.unwrap();
        assert!(doctors.is_empty());
    }

    #[tokio::test]
    async fn test_get_by_speciality_without_doctors_is_not_found() {
        let store = MemoryStore::new();
        DoctorService::register(&store, &store, &store, &HASHER, request("house", "123456/SP"))
            .await
            .unwrap();

        let err = DoctorService::get_by_speciality(&store, "Ortodontia")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_add_specialities_keeps_existing_links() {
        let store = MemoryStore::new();
        let mut dto = request("house", "123456/SP");
        dto.speciality_names = vec!["Ortodontia".into()];
        let doctor = DoctorService::register(&store, &store, &store, &HASHER, dto)
            .await
            .unwrap();

        let update = SpecialityRequestDto {
            speciality_names: vec!["cirurgia oral".into(), "Ortodontia".into()],
        };
        let updated = DoctorService::add_specialities(
            &store,
            &store,
            &caller("house", RoleName::Doctor),
            doctor.id,
            &update,
        )
        .await
        .unwrap();
        assert_eq!(updated.specialities, vec!["Cirurgia Oral", "Ortodontia"]);

        let by_name = DoctorService::get_by_name(&store, "Dr. house").await.unwrap();
        assert_eq!(by_name.specialities, updated.specialities);
    }

    #[tokio::test]
    async fn test_add_specialities_requires_ownership() {
        let store = MemoryStore::new();
        let doctor = DoctorService::register(&store, &store, &store, &HASHER, request("house", "123456/SP"))
            .await
            .unwrap();

        let update = SpecialityRequestDto {
            speciality_names: vec!["Ortodontia".into()],
        };
        let err = DoctorService::add_specialities(
            &store,
            &store,
            &caller("wilson", RoleName::Doctor),
            doctor.id,
            &update,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));

        let stored = store.any_doctor(doctor.id).await.unwrap();
        assert!(stored.specialities.is_empty());
    }
}
