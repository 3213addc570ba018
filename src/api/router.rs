//! Router setup

use std::sync::Arc;

use axum::{routing::get, routing::post, Router};

use crate::api::handlers;
use crate::api::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/generateCertificate", post(handlers::generate_certificate))
        .route("/verifyCertificate/:id", get(handlers::verify_certificate))
        .with_state(state)
}
