use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::middleware::role::{require_admin, require_any_role, require_doctor_or_admin};
use crate::state::AppState;

use super::controller::{
    add_doctor_specialities, deactivate_doctor, get_doctor, get_doctor_by_crm, get_doctor_by_name,
    get_doctors_by_speciality, register_doctor, update_doctor,
};

pub fn init_doctors_router(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/register", post(register_doctor))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let readers = Router::new()
        .route("/crm", get(get_doctor_by_crm))
        .route("/name", get(get_doctor_by_name))
        .route("/speciality", get(get_doctors_by_speciality))
        .route("/{id}", get(get_doctor))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_any_role));

    let owners = Router::new()
        .route("/{id}", patch(update_doctor).delete(deactivate_doctor))
        .route("/{id}/specialities", patch(add_doctor_specialities))
        .route_layer(middleware::from_fn_with_state(
            state,
            require_doctor_or_admin,
        ));

    admin.merge(readers).merge(owners)
}
