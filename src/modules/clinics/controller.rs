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
use bookease_models::{ClinicRequestDto, ClinicResponse, UpdateUserDto};

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::params::NameQuery;
use crate::validator::ValidatedJson;

use super::service::ClinicService;

#[derive(Debug, Deserialize, IntoParams)]
pub struct CityQuery {
    pub city: String,
}

/// Register a clinic (admin only)
#[utoipa::path(
    post,
    path = "/clinic/register",
    request_body = ClinicRequestDto,
    responses(
        (status = 201, description = "Clinic registered", body = ClinicResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 409, description = "CNPJ, username, email or phone already in use", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Clinics"
)]
#[instrument(skip(state, dto))]
pub async fn register_clinic(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ClinicRequestDto>,
) -> Result<(StatusCode, Json<ClinicResponse>), AppError> {
    let clinic = ClinicService::register(
        state.clinics.as_ref(),
        state.users.as_ref(),
        state.hasher.as_ref(),
        dto,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(clinic)))
}

/// Get an active clinic by id
#[utoipa::path(
    get,
    path = "/clinic/{id}",
    params(
        ("id" = Uuid, Path, description = "Clinic ID")
    ),
    responses(
        (status = 200, description = "Clinic found", body = ClinicResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Clinic not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Clinics"
)]
#[instrument(skip(state))]
pub async fn get_clinic(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClinicResponse>, AppError> {
    let clinic = ClinicService::get_by_id(state.clinics.as_ref(), id).await?;
    Ok(Json(clinic))
}

/// Get an active clinic by CNPJ
#[utoipa::path(
    get,
    path = "/clinic/cnpj/{cnpj}",
    params(
        ("cnpj" = String, Path, description = "Clinic CNPJ, digits only")
    ),
    responses(
        (status = 200, description = "Clinic found", body = ClinicResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Clinic not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Clinics"
)]
#[instrument(skip(state))]
pub async fn get_clinic_by_cnpj(
    State(state): State<AppState>,
    Path(cnpj): Path<String>,
) -> Result<Json<ClinicResponse>, AppError> {
    let clinic = ClinicService::get_by_cnpj(state.clinics.as_ref(), &cnpj).await?;
    Ok(Json(clinic))
}

/// Get an active clinic by its display name
#[utoipa::path(
    get,
    path = "/clinic/name",
    params(NameQuery),
    responses(
        (status = 200, description = "Clinic found", body = ClinicResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Clinic not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Clinics"
)]
#[instrument(skip(state))]
pub async fn get_clinic_by_name(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Result<Json<ClinicResponse>, AppError> {
    let clinic = ClinicService::get_by_name(state.clinics.as_ref(), &query.name).await?;
    Ok(Json(clinic))
}

/// Get an active clinic located in a city
#[utoipa::path(
    get,
    path = "/clinic/city",
    params(CityQuery),
    responses(
        (status = 200, description = "Clinic found", body = ClinicResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "No clinic in that city", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Clinics"
)]
#[instrument(skip(state))]
pub async fn get_clinic_by_city(
    State(state): State<AppState>,
    Query(query): Query<CityQuery>,
) -> Result<Json<ClinicResponse>, AppError> {
    let clinic = ClinicService::get_by_city(state.clinic_directory.as_ref(), &query.city).await?;
    Ok(Json(clinic))
}

/// Update the calling clinic's account details
#[utoipa::path(
    patch,
    path = "/clinic/{id}",
    params(
        ("id" = Uuid, Path, description = "Clinic ID")
    ),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "Clinic updated", body = ClinicResponse),
        (status = 403, description = "Not the clinic's own account", body = ErrorResponse),
        (status = 404, description = "Clinic not found", body = ErrorResponse),
        (status = 409, description = "Username, email or phone already in use", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Clinics"
)]
#[instrument(skip(state, auth_user, dto), fields(caller = %auth_user.username()))]
pub async fn update_clinic(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateUserDto>,
) -> Result<Json<ClinicResponse>, AppError> {
    let clinic = ClinicService::update(
        state.clinics.as_ref(),
        state.users.as_ref(),
        state.hasher.as_ref(),
        auth_user.context(),
        id,
        &dto,
    )
    .await?;
    Ok(Json(clinic))
}

/// Deactivate the calling clinic and its account
#[utoipa::path(
    delete,
    path = "/clinic/{id}",
    params(
        ("id" = Uuid, Path, description = "Clinic ID")
    ),
    responses(
        (status = 204, description = "Clinic deactivated"),
        (status = 403, description = "Not the clinic's own account", body = ErrorResponse),
        (status = 404, description = "Clinic not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Clinics"
)]
#[instrument(skip(state, auth_user), fields(caller = %auth_user.username()))]
pub async fn deactivate_clinic(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    ClinicService::deactivate(state.clinics.as_ref(), auth_user.context(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
