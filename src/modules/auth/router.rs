use axum::{Router, routing::post};

use crate::state::AppState;

use super::controller::{login, revoke};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/revoke", post(revoke))
}
