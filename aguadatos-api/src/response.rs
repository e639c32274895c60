//! Response envelopes
//!
//! Success bodies are the serialized payload itself; failure bodies are
//! always `{"error": "<message>"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

/// 2xx response carrying `payload` as JSON
pub fn success<T: Serialize>(status: StatusCode, payload: T) -> Response {
    (status, Json(payload)).into_response()
}

/// 200 response carrying `payload` as JSON
pub fn ok<T: Serialize>(payload: T) -> Response {
    success(StatusCode::OK, payload)
}

/// 201 response carrying `payload` as JSON
pub fn created<T: Serialize>(payload: T) -> Response {
    success(StatusCode::CREATED, payload)
}

/// Error response with `message` under the `error` key
pub fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}
