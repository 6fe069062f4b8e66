//! JSON ingestion endpoint.
//!
//! `POST /v1/observe` with `{"metric": ..., "labels": {...}, "value": ...}`.
//! Counters add `value`, gauges set it.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use labelstore_core::error::{ErrorCode, LabelStoreError};
use labelstore_core::LabelSet;

use crate::app_state::AppState;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Observation {
    pub metric: String,
    #[serde(default)]
    pub labels: LabelSet,
    pub value: f64,
}

pub async fn observe(State(app): State<AppState>, Json(obs): Json<Observation>) -> Response {
    match app.registry().observe(&obs.metric, &obs.labels, obs.value) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}

pub fn error_response(e: &LabelStoreError) -> Response {
    let status = match e.code() {
        ErrorCode::UnknownMetric => StatusCode::NOT_FOUND,
        ErrorCode::InvalidObservation | ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = json!({
        "code": e.code().as_str(),
        "msg": e.to_string(),
    });
    (status, Json(body)).into_response()
}
