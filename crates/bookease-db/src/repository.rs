use async_trait::async_trait;
use uuid::Uuid;

use bookease_core::DomainError;
use bookease_models::{Clinic, Doctor, PersonOwned};

/// Storage for one person-owned entity type.
///
/// Lookups only return active records. `save` writes the entity together with
/// its linked user and the user's role links, all or nothing.
///
/// `save` never writes the user's revocation flag and never updates a record
/// that is already inactive. Saving over an entity or user that was
/// deactivated after it was read fails with `NotFound`.
#[async_trait]
pub trait Repository<T: PersonOwned>: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, DomainError>;

    /// Looks up by the entity's document number (CNPJ, CRM or CPF).
    async fn find_by_document(&self, document: &str) -> Result<Option<T>, DomainError>;

    /// First record, by username, whose account display name is exactly `name`.
    async fn find_by_name(&self, name: &str) -> Result<Option<T>, DomainError>;

    async fn list_all(&self) -> Result<Vec<T>, DomainError>;

    async fn save(&self, entity: &T) -> Result<(), DomainError>;
}

#[async_trait]
pub trait ClinicDirectory: Send + Sync {
    /// First active clinic, by username, located in `city`.
    async fn find_by_city(&self, city: &str) -> Result<Option<Clinic>, DomainError>;
}

/// The speciality catalog and the doctor links to it.
#[async_trait]
pub trait SpecialityCatalog: Send + Sync {
    /// Catalog names matching any of `names`, ignoring case.
    async fn find_specialities(&self, names: &[String]) -> Result<Vec<String>, DomainError>;

    /// Active doctors linked to the speciality called `name`, ignoring case.
    async fn find_doctors_by_speciality(&self, name: &str) -> Result<Vec<Doctor>, DomainError>;
}
