//! API key validation endpoint.
//!
//! Lets integrators check a key before submitting render requests.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    error::AppError, middleware::auth::authenticate, models::api_key::KeyValidationResponse,
    state::AppState,
};

/// Validate the key in `X-API-Key`.
///
/// # Endpoint
///
/// `GET /v1/validate-key` or `POST /v1/validate-key`
///
/// # Response
///
/// - **Success (200 OK)**: `{ "valid": true, "key": {...}, "project": {...} }`
/// - **Error (401)**: `{ "valid": false, "error": "API Key revocada" }`
pub async fn validate_key(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match authenticate(&state, &headers).await {
        Ok(record) => (StatusCode::OK, Json(KeyValidationResponse::from(record))).into_response(),
        Err(failure) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "valid": false, "error": failure.to_string() })),
        )
            .into_response(),
    }
}

/// Answer for methods other than GET and POST on the validation endpoint.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed("GET o POST")
}
