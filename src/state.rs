use std::fmt;
use std::sync::Arc;

use bookease_auth::{CredentialStore, TokenService};
use bookease_config::CorsConfig;
use bookease_core::PasswordHasher;
use bookease_db::{
    ClinicDirectory, MemoryStore, PgClinicRepository, PgDoctorRepository, PgPatientRepository,
    PgPool, PgUserRepository, Repository, SpecialityCatalog,
};
use bookease_models::{Clinic, Doctor, Patient};

/// Collaborators shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn CredentialStore>,
    pub clinics: Arc<dyn Repository<Clinic>>,
    pub clinic_directory: Arc<dyn ClinicDirectory>,
    pub doctors: Arc<dyn Repository<Doctor>>,
    pub specialities: Arc<dyn SpecialityCatalog>,
    pub patients: Arc<dyn Repository<Patient>>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<TokenService>,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn postgres(
        pool: PgPool,
        tokens: Arc<TokenService>,
        hasher: Arc<dyn PasswordHasher>,
        cors_config: CorsConfig,
    ) -> Self {
        let clinics = Arc::new(PgClinicRepository::new(pool.clone()));
        let doctors = Arc::new(PgDoctorRepository::new(pool.clone()));

        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            clinics: clinics.clone(),
            clinic_directory: clinics,
            doctors: doctors.clone(),
            specialities: doctors,
            patients: Arc::new(PgPatientRepository::new(pool)),
            hasher,
            tokens,
            cors_config,
        }
    }

    pub fn in_memory(
        store: Arc<MemoryStore>,
        tokens: Arc<TokenService>,
        hasher: Arc<dyn PasswordHasher>,
        cors_config: CorsConfig,
    ) -> Self {
        Self {
            users: store.clone(),
            clinics: store.clone(),
            clinic_directory: store.clone(),
            doctors: store.clone(),
            specialities: store.clone(),
            patients: store,
            hasher,
            tokens,
            cors_config,
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("tokens", &self.tokens)
            .field("cors_config", &self.cors_config)
            .finish_non_exhaustive()
    }
}
