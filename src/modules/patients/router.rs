use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::middleware::role::{require_any_role, require_patient};
use crate::state::AppState;

use super::controller::{
    deactivate_patient, get_patient, get_patient_by_cpf, get_patient_by_name, register_patient,
    update_patient,
};

pub fn init_patients_router(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/register", post(register_patient));

    let readers = Router::new()
        .route("/{id}", get(get_patient))
        .route("/cpf/{cpf}", get(get_patient_by_cpf))
        .route("/name", get(get_patient_by_name))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_any_role));

    let owners = Router::new()
        .route("/{id}", patch(update_patient).delete(deactivate_patient))
        .route_layer(middleware::from_fn_with_state(state, require_patient));

    public.merge(readers).merge(owners)
}
