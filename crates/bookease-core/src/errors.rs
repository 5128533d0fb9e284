//! Error types shared by every BookEase crate.
//!
//! - [`DomainError`]: typed failures raised by the authentication, ownership and
//!   entity lifecycle logic. Each variant knows the HTTP status it maps to.
//! - [`AppError`]: the HTTP boundary type returned by handlers. Anything that
//!   converts into [`anyhow::Error`] converts into an `AppError`; when a
//!   `DomainError` is found in the error its status is used, otherwise the
//!   request fails with a 500.

use std::fmt::Display;

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

/// Failures produced by the BookEase domain and security layers.
///
/// User-facing messages are kept in Portuguese to match what clients of the
/// clinic-booking API already display.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// Unknown id, username or document (active records only).
    #[error("{entity} with identifier {identifier} not found")]
    NotFound { entity: String, identifier: String },

    /// Wrong password. Never reveals whether the username exists.
    #[error("Credenciais inválidas")]
    InvalidCredentials,

    /// The account state forbids the operation (inactive account, revoked tokens).
    #[error("{0}")]
    OperationDenied(String),

    /// Authenticated, but not the owner of the target record.
    #[error("{0}")]
    Unauthorized(String),

    /// An active record already holds this value.
    #[error("{0} já existe")]
    DuplicateField(String),

    #[error("Token generation failed: {0}")]
    TokenGeneration(String),

    #[error("Key loading failed: {0}")]
    KeyLoading(String),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token has expired")]
    Expired,

    #[error("Malformed token")]
    MalformedToken,

    /// Persistence and other infrastructure failures.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DomainError {
    pub fn not_found(entity: impl Into<String>, identifier: impl Display) -> Self {
        Self::NotFound {
            entity: entity.into(),
            identifier: identifier.to_string(),
        }
    }

    pub fn operation_denied(message: impl Into<String>) -> Self {
        Self::OperationDenied(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn duplicate_field(label: impl Into<String>) -> Self {
        Self::DuplicateField(label.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidCredentials
            | Self::InvalidSignature
            | Self::Expired
            | Self::MalformedToken => StatusCode::UNAUTHORIZED,
            Self::OperationDenied(_) | Self::DuplicateField(_) => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::FORBIDDEN,
            Self::TokenGeneration(_) | Self::KeyLoading(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    pub fn unauthorized(message: String) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, anyhow::anyhow!(message))
    }

    pub fn forbidden(message: String) -> Self {
        Self::new(StatusCode::FORBIDDEN, anyhow::anyhow!(message))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = if self.status.is_server_error() {
            error!(status = %self.status.as_u16(), error = ?self.error, "Request failed");
            "Internal server error".to_string()
        } else {
            self.error.to_string()
        };

        let body = Json(json!({
            "error": message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        let error = err.into();
        let status = error
            .downcast_ref::<DomainError>()
            .map(DomainError::status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        Self { status, error }
    }
}
