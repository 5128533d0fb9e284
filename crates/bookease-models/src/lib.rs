//! # BookEase Models
//!
//! Domain models and DTOs for the BookEase API.
//!
//! # Modules
//!
//! - [`auth`]: Login request and token pair response
//! - [`users`]: Users, role names and user DTOs
//! - [`person`]: The [`PersonOwned`] contract shared by clinics, doctors and patients
//! - [`clinics`]: Clinic entity and DTOs
//! - [`doctors`]: Doctor entity, the speciality catalog and DTOs
//! - [`patients`]: Patient entity and DTOs

pub mod auth;
pub mod clinics;
pub mod doctors;
pub mod patients;
pub mod person;
pub mod users;
mod validation;

pub use auth::{LoginRequest, TokenResponse};
pub use clinics::{Clinic, ClinicRequestDto, ClinicResponse};
pub use doctors::{
    Doctor, DoctorRequestDto, DoctorResponse, SPECIALITIES, SpecialityRequestDto, speciality_matches,
};
pub use patients::{Patient, PatientRequestDto, PatientResponse};
pub use person::PersonOwned;
pub use users::{Role, RoleName, UpdateUserDto, User, UserField, UserRequestDto, UserResponse};
