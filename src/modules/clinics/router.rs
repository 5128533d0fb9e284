use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::middleware::role::{require_admin, require_any_role, require_clinic};
use crate::state::AppState;

use super::controller::{
    deactivate_clinic, get_clinic, get_clinic_by_city, get_clinic_by_cnpj, get_clinic_by_name,
    register_clinic, update_clinic,
};

pub fn init_clinics_router(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/register", post(register_clinic))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let readers = Router::new()
        .route("/{id}", get(get_clinic))
        .route("/cnpj/{cnpj}", get(get_clinic_by_cnpj))
        .route("/name", get(get_clinic_by_name))
        .route("/city", get(get_clinic_by_city))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_any_role));

    let owners = Router::new()
        .route("/{id}", patch(update_clinic).delete(deactivate_clinic))
        .route_layer(middleware::from_fn_with_state(state, require_clinic));

    admin.merge(readers).merge(owners)
}
