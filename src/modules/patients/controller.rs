use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use bookease_core::AppError;
use bookease_models::{PatientRequestDto, PatientResponse, UpdateUserDto};

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::params::NameQuery;
use crate::validator::ValidatedJson;

use super::service::PatientService;

/// Register as a patient
#[utoipa::path(
    post,
    path = "/patient/register",
    request_body = PatientRequestDto,
    responses(
        (status = 201, description = "Patient registered", body = PatientResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 409, description = "CPF, username, email or phone already in use", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Patients"
)]
#[instrument(skip(state, dto))]
pub async fn register_patient(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<PatientRequestDto>,
) -> Result<(StatusCode, Json<PatientResponse>), AppError> {
    let patient = PatientService::register(
        state.patients.as_ref(),
        state.users.as_ref(),
        state.hasher.as_ref(),
        dto,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(patient)))
}

/// Get an active patient by id
#[utoipa::path(
    get,
    path = "/patient/{id}",
    params(
        ("id" = Uuid, Path, description = "Patient ID")
    ),
    responses(
        (status = 200, description = "Patient found", body = PatientResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Patients"
)]
#[instrument(skip(state))]
pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PatientResponse>, AppError> {
    let patient = PatientService::get_by_id(state.patients.as_ref(), id).await?;
    Ok(Json(patient))
}

/// Get an active patient by CPF
#[utoipa::path(
    get,
    path = "/patient/cpf/{cpf}",
    params(
        ("cpf" = String, Path, description = "Patient CPF, digits only")
    ),
    responses(
        (status = 200, description = "Patient found", body = PatientResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Patients"
)]
#[instrument(skip(state))]
pub async fn get_patient_by_cpf(
    State(state): State<AppState>,
    Path(cpf): Path<String>,
) -> Result<Json<PatientResponse>, AppError> {
    let patient = PatientService::get_by_cpf(state.patients.as_ref(), &cpf).await?;
    Ok(Json(patient))
}

/// Get an active patient by display name
#[utoipa::path(
    get,
    path = "/patient/name",
    params(NameQuery),
    responses(
        (status = 200, description = "Patient found", body = PatientResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Patients"
)]
#[instrument(skip(state))]
pub async fn get_patient_by_name(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Result<Json<PatientResponse>, AppError> {
    let patient = PatientService::get_by_name(state.patients.as_ref(), &query.name).await?;
    Ok(Json(patient))
}

/// Update the calling patient's account details
#[utoipa::path(
    patch,
    path = "/patient/{id}",
    params(
        ("id" = Uuid, Path, description = "Patient ID")
    ),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "Patient updated", body = PatientResponse),
        (status = 403, description = "Not the patient's own account", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse),
        (status = 409, description = "Username, email or phone already in use", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Patients"
)]
#[instrument(skip(state, auth_user, dto), fields(caller = %auth_user.username()))]
pub async fn update_patient(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateUserDto>,
) -> Result<Json<PatientResponse>, AppError> {
    let patient = PatientService::update(
        state.patients.as_ref(),
        state.users.as_ref(),
        state.hasher.as_ref(),
        auth_user.context(),
        id,
        &dto,
    )
    .await?;
    Ok(Json(patient))
}

/// Deactivate the calling patient and its account
#[utoipa::path(
    delete,
    path = "/patient/{id}",
    params(
        ("id" = Uuid, Path, description = "Patient ID")
    ),
    responses(
        (status = 204, description = "Patient deactivated"),
        (status = 403, description = "Not the patient's own account", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Patients"
)]
#[instrument(skip(state, auth_user), fields(caller = %auth_user.username()))]
pub async fn deactivate_patient(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    PatientService::deactivate(state.patients.as_ref(), auth_user.context(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
