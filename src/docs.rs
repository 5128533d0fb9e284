use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use bookease_models::{
    ClinicRequestDto, ClinicResponse, DoctorRequestDto, DoctorResponse, LoginRequest,
    PatientRequestDto, PatientResponse, RoleName, SpecialityRequestDto, TokenResponse,
    UpdateUserDto, UserRequestDto,
};

use crate::modules::auth::controller::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::revoke,
        crate::modules::clinics::controller::register_clinic,
        crate::modules::clinics::controller::get_clinic,
        crate::modules::clinics::controller::get_clinic_by_cnpj,
        crate::modules::clinics::controller::get_clinic_by_name,
        crate::modules::clinics::controller::get_clinic_by_city,
        crate::modules::clinics::controller::update_clinic,
        crate::modules::clinics::controller::deactivate_clinic,
        crate::modules::doctors::controller::register_doctor,
        crate::modules::doctors::controller::get_doctor,
        crate::modules::doctors::controller::get_doctor_by_crm,
        crate::modules::doctors::controller::get_doctor_by_name,
        crate::modules::doctors::controller::get_doctors_by_speciality,
        crate::modules::doctors::controller::update_doctor,
        crate::modules::doctors::controller::add_doctor_specialities,
        crate::modules::doctors::controller::deactivate_doctor,
        crate::modules::patients::controller::register_patient,
        crate::modules::patients::controller::get_patient,
        crate::modules::patients::controller::get_patient_by_cpf,
        crate::modules::patients::controller::get_patient_by_name,
        crate::modules::patients::controller::update_patient,
        crate::modules::patients::controller::deactivate_patient,
    ),
    components(
        schemas(
            LoginRequest,
            TokenResponse,
            RoleName,
            UserRequestDto,
            UpdateUserDto,
            ClinicRequestDto,
            ClinicResponse,
            DoctorRequestDto,
            DoctorResponse,
            SpecialityRequestDto,
            PatientRequestDto,
            PatientResponse,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login and token revocation"),
        (name = "Clinics", description = "Clinic registration and self-service"),
        (name = "Doctors", description = "Doctor registration and self-service"),
        (name = "Patients", description = "Patient registration and self-service")
    ),
    info(
        title = "BookEase API",
        version = "0.1.0",
        description = "Clinic booking API: RS256 session tokens, role-gated routes and owner-only profile changes.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
