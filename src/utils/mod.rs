//! Shared helpers for the feature modules.
//!
//! - [`lifecycle`]: lookup, uniqueness, profile update and deactivation for
//!   clinics, doctors and patients
//! - [`params`]: query parameters shared by the entity lookups

pub mod lifecycle;
pub mod params;
