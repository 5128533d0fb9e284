use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;
use utoipa::IntoParams;
use uuid::Uuid;

use bookease_core::AppError;
use bookease_models::{DoctorRequestDto, DoctorResponse, SpecialityRequestDto, UpdateUserDto};

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::params::NameQuery;
use crate::validator::ValidatedJson;

use super::service::DoctorService;

/// CRM lookup. Registrations carry a `/` (e.g. `123456/SP`), so the value
/// travels as a query parameter.
#[derive(Debug, Deserialize, IntoParams)]
pub struct CrmQuery {
    pub crm: String,
}

/// Speciality search, matched ignoring case.
#[derive(Debug, Deserialize, IntoParams)]
pub struct SpecialityQuery {
    pub name: String,
}

/// Register a doctor (admin only)
#[utoipa::path(
    post,
    path = "/doctor/register",
    request_body = DoctorRequestDto,
    responses(
        (status = 201, description = "Doctor registered", body = DoctorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Unknown speciality name", body = ErrorResponse),
        (status = 409, description = "CRM, username, email or phone already in use", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Doctors"
)]
#[instrument(skip(state, dto))]
pub async fn register_doctor(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<DoctorRequestDto>,
) -> Result<(StatusCode, Json<DoctorResponse>), AppError> {
    let doctor = DoctorService::register(
        state.doctors.as_ref(),
        state.users.as_ref(),
        state.specialities.as_ref(),
        state.hasher.as_ref(),
        dto,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(doctor)))
}

/// Get an active doctor by id
#[utoipa::path(
    get,
    path = "/doctor/{id}",
    params(
        ("id" = Uuid, Path, description = "Doctor ID")
    ),
    responses(
        (status = 200, description = "Doctor found", body = DoctorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Doctor not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Doctors"
)]
#[instrument(skip(state))]
pub async fn get_doctor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DoctorResponse>, AppError> {
    let doctor = DoctorService::get_by_id(state.doctors.as_ref(), id).await?;
    Ok(Json(doctor))
}

/// Get an active doctor by CRM
#[utoipa::path(
    get,
    path = "/doctor/crm",
    params(CrmQuery),
    responses(
        (status = 200, description = "Doctor found", body = DoctorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Doctor not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Doctors"
)]
#[instrument(skip(state))]
pub async fn get_doctor_by_crm(
    State(state): State<AppState>,
    Query(query): Query<CrmQuery>,
) -> Result<Json<DoctorResponse>, AppError> {
    let doctor = DoctorService::get_by_crm(state.doctors.as_ref(), &query.crm).await?;
    Ok(Json(doctor))
}

/// Get an active doctor by display name
#[utoipa::path(
    get,
    path = "/doctor/name",
    params(NameQuery),
    responses(
        (status = 200, description = "Doctor found", body = DoctorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Doctor not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Doctors"
)]
#[instrument(skip(state))]
pub async fn get_doctor_by_name(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Result<Json<DoctorResponse>, AppError> {
    let doctor = DoctorService::get_by_name(state.doctors.as_ref(), &query.name).await?;
    Ok(Json(doctor))
}

/// List active doctors offering a speciality
#[utoipa::path(
    get,
    path = "/doctor/speciality",
    params(SpecialityQuery),
    responses(
        (status = 200, description = "Doctors found", body = Vec<DoctorResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "No doctor offers the speciality", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Doctors"
)]
#[instrument(skip(state))]
pub async fn get_doctors_by_speciality(
    State(state): State<AppState>,
    Query(query): Query<SpecialityQuery>,
) -> Result<Json<Vec<DoctorResponse>>, AppError> {
    let doctors = DoctorService::get_by_speciality(state.specialities.as_ref(), &query.name).await?;
    Ok(Json(doctors))
}

/// Update the calling doctor's account details
#[utoipa::path(
    patch,
    path = "/doctor/{id}",
    params(
        ("id" = Uuid, Path, description = "Doctor ID")
    ),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "Doctor updated", body = DoctorResponse),
        (status = 403, description = "Not the doctor's own account", body = ErrorResponse),
        (status = 404, description = "Doctor not found", body = ErrorResponse),
        (status = 409, description = "Username, email or phone already in use", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Doctors"
)]
#[instrument(skip(state, auth_user, dto), fields(caller = %auth_user.username()))]
pub async fn update_doctor(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateUserDto>,
) -> Result<Json<DoctorResponse>, AppError> {
    let doctor = DoctorService::update(
        state.doctors.as_ref(),
        state.users.as_ref(),
        state.hasher.as_ref(),
        auth_user.context(),
        id,
        &dto,
    )
    .await?;
    Ok(Json(doctor))
}

/// Add catalog specialities to the calling doctor
#[utoipa::path(
    patch,
    path = "/doctor/{id}/specialities",
    params(
        ("id" = Uuid, Path, description = "Doctor ID")
    ),
    request_body = SpecialityRequestDto,
    responses(
        (status = 200, description = "Specialities added", body = DoctorResponse),
        (status = 403, description = "Not the doctor's own account", body = ErrorResponse),
        (status = 404, description = "Doctor or speciality not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Doctors"
)]
#[instrument(skip(state, auth_user, dto), fields(caller = %auth_user.username()))]
pub async fn add_doctor_specialities(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<SpecialityRequestDto>,
) -> Result<Json<DoctorResponse>, AppError> {
    let doctor = DoctorService::add_specialities(
        state.doctors.as_ref(),
        state.specialities.as_ref(),
        auth_user.context(),
        id,
        &dto,
    )
    .await?;
    Ok(Json(doctor))
}

/// Deactivate the calling doctor and its account
#[utoipa::path(
    delete,
    path = "/doctor/{id}",
    params(
        ("id" = Uuid, Path, description = "Doctor ID")
    ),
    responses(
        (status = 204, description = "Doctor deactivated"),
        (status = 403, description = "Not the doctor's own account", body = ErrorResponse),
        (status = 404, description = "Doctor not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Doctors"
)]
#[instrument(skip(state, auth_user), fields(caller = %auth_user.username()))]
pub async fn deactivate_doctor(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    DoctorService::deactivate(state.doctors.as_ref(), auth_user.context(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
