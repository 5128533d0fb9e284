//! Route-level role gates.
//!
//! Each gate authenticates the caller through [`AuthUser`] and checks the
//! `ROLE_*` claims of the token. Ownership of individual records is checked
//! later, by the services.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use bookease_core::AppError;
use bookease_models::RoleName;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Middleware function that checks if the authenticated user has one of the required roles.
///
/// # Usage with axum::middleware::from_fn_with_state
///
/// ```rust,ignore
/// use axum::{Router, middleware};
/// use crate::middleware::role::require_roles;
///
/// let protected_routes = Router::new()
///     .route("/{id}", delete(handler))
///     .route_layer(middleware::from_fn_with_state(
///         state.clone(),
///         |state, req, next| require_roles(state, req, next, &[RoleName::Clinic])
///     ));
/// ```
pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed_roles: &[RoleName],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;

    if !auth_user.has_any_role(allowed_roles) {
        let required = allowed_roles
            .iter()
            .map(RoleName::authority)
            .collect::<Vec<_>>()
            .join(", ");
        return Err(AppError::forbidden(format!(
            "Access denied. Required roles: {}",
            required
        )));
    }

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

async fn gate(state: State<AppState>, req: Request, next: Next, roles: &[RoleName]) -> Response {
    match require_roles(state, req, next, roles).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

pub async fn require_admin(state: State<AppState>, req: Request, next: Next) -> Response {
    gate(state, req, next, &[RoleName::Admin]).await
}

/// Any authenticated role may pass.
pub async fn require_any_role(state: State<AppState>, req: Request, next: Next) -> Response {
    gate(state, req, next, &RoleName::ALL).await
}

pub async fn require_clinic(state: State<AppState>, req: Request, next: Next) -> Response {
    gate(state, req, next, &[RoleName::Clinic]).await
}

pub async fn require_doctor_or_admin(
    state: State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    gate(state, req, next, &[RoleName::Admin, RoleName::Doctor]).await
}

pub async fn require_patient(state: State<AppState>, req: Request, next: Next) -> Response {
    gate(state, req, next, &[RoleName::Patient]).await
}
