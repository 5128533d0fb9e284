//! Clinic domain models and DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::person::impl_person_owned;
use crate::users::{RoleName, User, UserRequestDto};
use crate::validation::digits_only;

/// A clinic registered by an administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clinic {
    pub id: Uuid,
    pub user: User,
    pub cnpj: String,
    pub description: Option<String>,
    pub city: String,
    pub address: String,
    pub active: bool,
}

impl_person_owned!(Clinic);

impl Clinic {
    pub const ROLE: RoleName = RoleName::Clinic;

    pub fn new(dto: &ClinicRequestDto, user: User) -> Self {
        Self {
            id: Uuid::new_v4(),
            user,
            cnpj: dto.cnpj.clone(),
            description: dto.description.clone(),
            city: dto.city.clone(),
            address: dto.address.clone(),
            active: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ClinicRequestDto {
    #[validate(
        length(min = 14, max = 17, message = "CNPJ deve ter entre 14 e 17 dígitos"),
        custom(function = "digits_only", message = "CNPJ deve conter apenas números")
    )]
    #[schema(example = "12345678901901234")]
    pub cnpj: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Cidade é obrigatória"))]
    pub city: String,
    #[validate(length(min = 1, max = 200, message = "Endereço é obrigatório"))]
    pub address: String,
    #[validate(nested)]
    pub user: UserRequestDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClinicResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: String,
    pub cnpj: String,
    pub description: Option<String>,
    pub city: String,
    pub address: String,
    pub active: bool,
}

impl From<&Clinic> for ClinicResponse {
    fn from(clinic: &Clinic) -> Self {
        Self {
            id: clinic.id,
            user_id: clinic.user.id,
            username: clinic.user.username.clone(),
            name: clinic.user.name.clone(),
            phone: clinic.user.phone.clone(),
            email: clinic.user.email.clone(),
            cnpj: clinic.cnpj.clone(),
            description: clinic.description.clone(),
            city: clinic.city.clone(),
            address: clinic.address.clone(),
            active: clinic.active,
        }
    }
}
