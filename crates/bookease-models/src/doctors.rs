//! Doctor domain models and DTOs.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::person::impl_person_owned;
use crate::users::{RoleName, User, UserRequestDto};

/// Speciality catalog seeded on first start.
pub const SPECIALITIES: [&str; 12] = [
    "Odontologia Geral",
    "Ortodontia",
    "Tratamento de Canal",
    "Periodontia",
    "Prótese Dentária",
    "Cirurgia Oral",
    "Odontopediatria",
    "Odontologia Estética",
    "Implantodontia",
    "Aparelho Ortodôntico",
    "Clareamento Dental",
    "Harmonização Orofacial",
];

/// Case-insensitive speciality name comparison.
pub fn speciality_matches(catalog_name: &str, requested: &str) -> bool {
    catalog_name.to_lowercase() == requested.to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctor {
    pub id: Uuid,
    pub user: User,
    pub crm: String,
    /// Catalog names, as stored in the catalog.
    pub specialities: BTreeSet<String>,
    pub active: bool,
}

impl_person_owned!(Doctor);

impl Doctor {
    pub const ROLE: RoleName = RoleName::Doctor;

    pub fn new(dto: &DoctorRequestDto, user: User, specialities: BTreeSet<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user,
            crm: dto.crm.clone(),
            specialities,
            active: true,
        }
    }

    pub fn has_speciality(&self, name: &str) -> bool {
        self.specialities
            .iter()
            .any(|speciality| speciality_matches(speciality, name))
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct DoctorRequestDto {
    /// Regional medical council registration, e.g. `123456/SP`.
    #[validate(length(min = 4, max = 20, message = "CRM deve ter entre 4 e 20 caracteres"))]
    #[schema(example = "123456/SP")]
    pub crm: String,
    /// Catalog names, matched case-insensitively.
    #[serde(default)]
    pub speciality_names: Vec<String>,
    #[validate(nested)]
    pub user: UserRequestDto,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SpecialityRequestDto {
    #[validate(length(min = 1, message = "A lista de especialidades não pode ser vazia"))]
    pub speciality_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DoctorResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: String,
    pub crm: String,
    pub specialities: Vec<String>,
    pub active: bool,
}

impl From<&Doctor> for DoctorResponse {
    fn from(doctor: &Doctor) -> Self {
        Self {
            id: doctor.id,
            user_id: doctor.user.id,
            username: doctor.user.username.clone(),
            name: doctor.user.name.clone(),
            phone: doctor.user.phone.clone(),
            email: doctor.user.email.clone(),
            crm: doctor.crm.clone(),
            specialities: doctor.specialities.iter().cloned().collect(),
            active: doctor.active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_speciality_ignores_case() {
        let dto = DoctorRequestDto {
            crm: "123456/SP".into(),
            speciality_names: vec![],
            user: UserRequestDto {
                username: "house".into(),
                password: "password123".into(),
                name: "Dr. House".into(),
                phone: None,
                email: "house@bookease.com".into(),
            },
        };
        let user = User::new(&dto.user, "hash".into(), Doctor::ROLE);
        let doctor = Doctor::new(&dto, user, BTreeSet::from(["Prótese Dentária".to_string()]));

        assert!(doctor.has_speciality("prótese dentária"));
        assert!(doctor.has_speciality("PRÓTESE DENTÁRIA"));
        assert!(!doctor.has_speciality("Ortodontia"));
    }

    #[test]
    fn test_speciality_request_requires_names() {
        let empty = SpecialityRequestDto {
            speciality_names: vec![],
        };
        assert!(empty.validate().is_err());

        let one = SpecialityRequestDto {
            speciality_names: vec!["Ortodontia".into()],
        };
        assert!(one.validate().is_ok());
    }

    #[test]
    fn test_registration_without_specialities_defaults_to_empty() {
        let dto: DoctorRequestDto = serde_json::from_value(serde_json::json!({
            "crm": "123456/SP",
            "user": {
                "username": "house",
                "password": "password123",
                "name": "Dr. House",
                "email": "house@bookease.com"
            }
        }))
        .unwrap();

        assert!(dto.speciality_names.is_empty());
    }
}
