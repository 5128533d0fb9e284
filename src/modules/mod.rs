pub mod auth;
pub mod clinics;
pub mod doctors;
pub mod patients;
