//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::store::StoreError;

/// Why a presented API key was rejected.
///
/// Checks run in declaration order; the first failing check decides the
/// reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
    #[error("API Key no proporcionada. Usa el header X-API-Key")]
    Missing,

    #[error("Formato de API Key inválido. Debe comenzar con pk_live_ o pk_test_")]
    BadFormat,

    /// No key with this hash, or the lookup itself failed
    #[error("API Key no encontrada o inválida")]
    NotFound,

    #[error("API Key revocada")]
    Revoked,

    #[error("API Key expirada")]
    Expired,
}

/// Application-wide error type.
///
/// # Error Categories
///
/// - **Client input**: wrong method, malformed body
/// - **Authorization**: missing or unusable API key
/// - **Not found**: template or job absent, or owned by another organization
/// - **Dependency**: the store failed; details are logged, never returned
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Returns HTTP 405 Method Not Allowed. Carries the methods the route
    /// accepts.
    #[error("Método no permitido. Usa {0}")]
    MethodNotAllowed(&'static str),

    /// Returns HTTP 401 Unauthorized with the failure reason.
    #[error("{0}")]
    Unauthorized(AuthFailure),

    /// Request body is malformed. The String names the offending field.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("{0}")]
    InvalidRequest(String),

    /// Body exceeds `MAX_BODY_BYTES`. Returns HTTP 413.
    #[error("El cuerpo de la solicitud excede el tamaño máximo permitido")]
    PayloadTooLarge,

    /// Template does not exist or belongs to another organization.
    ///
    /// Both cases share this variant so callers cannot probe other tenants.
    #[error("Template no encontrado o sin permisos")]
    TemplateNotFound,

    /// Template exists but has no versions to render.
    #[error("Template no tiene versiones")]
    NoTemplateVersions,

    /// Render job does not exist or belongs to another organization.
    #[error("Job no encontrado")]
    JobNotFound,

    /// The job insert failed. Returns HTTP 500.
    #[error("Error al crear job de renderizado")]
    EnqueueFailed(#[source] StoreError),

    /// Any other store failure. Returns HTTP 500.
    #[error("Error interno del servidor")]
    Store(#[from] StoreError),
}

impl From<AuthFailure> for AppError {
    fn from(failure: AuthFailure) -> Self {
        AppError::Unauthorized(failure)
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidRequest(_) | AppError::NoTemplateVersions => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::TemplateNotFound | AppError::JobNotFound => StatusCode::NOT_FOUND,
            AppError::EnqueueFailed(_) | AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// { "error": "Human-readable error message" }
/// ```
///
/// Store failures are logged here with their full detail; the body only ever
/// carries the variant's generic message.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::EnqueueFailed(source) => {
                tracing::error!(error = %source, "failed to insert render job");
            }
            AppError::Store(source) => {
                tracing::error!(error = %source, "store failure");
            }
            _ => {}
        }

        let body = Json(json!({ "error": self.to_string() }));

        (self.status(), body).into_response()
    }
}
