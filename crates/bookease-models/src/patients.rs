//! Patient domain models and DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::person::impl_person_owned;
use crate::users::{RoleName, User, UserRequestDto};
use crate::validation::digits_only;

/// A patient. Patients register themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    pub id: Uuid,
    pub user: User,
    pub cpf: String,
    pub active: bool,
}

impl_person_owned!(Patient);

impl Patient {
    pub const ROLE: RoleName = RoleName::Patient;

    pub fn new(dto: &PatientRequestDto, user: User) -> Self {
        Self {
            id: Uuid::new_v4(),
            user,
            cpf: dto.cpf.clone(),
            active: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PatientRequestDto {
    #[validate(
        length(equal = 11, message = "CPF deve ter 11 dígitos"),
        custom(function = "digits_only", message = "CPF deve conter apenas números")
    )]
    #[schema(example = "12345678901")]
    pub cpf: String,
    #[validate(nested)]
    pub user: UserRequestDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: String,
    pub cpf: String,
    pub active: bool,
}

impl From<&Patient> for PatientResponse {
    fn from(patient: &Patient) -> Self {
        Self {
            id: patient.id,
            user_id: patient.user.id,
            username: patient.user.username.clone(),
            name: patient.user.name.clone(),
            phone: patient.user.phone.clone(),
            email: patient.user.email.clone(),
            cpf: patient.cpf.clone(),
            active: patient.active,
        }
    }
}
