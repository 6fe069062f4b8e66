//! Axum router wiring.

use axum::{
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, ingest, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/observe", post(ingest::observe))
        .route("/metrics", get(ops::metrics))
        .route("/healthz", get(ops::healthz))
        .with_state(state)
}
