//! Document generation endpoint.
//!
//! - POST /v1/generate-document - Validate and queue a render job
//!
//! The handler admits a request in fixed order and stops at the first
//! failure: method, API key (auth middleware), body, template, enqueue.
//! Rendering happens later in the external worker.

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::StatusCode,
};
use chrono::Utc;
use serde_json::Value;

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::render_job::{GenerateDocumentResponse, RenderOptions},
    services::{
        job_enqueuer::{EnqueueJob, enqueue_render_job},
        template_resolver::resolve_template,
    },
    state::AppState,
};

/// Validated body of a render request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateDocumentRequest {
    pub template_id: String,

    /// Always a JSON object
    pub data: Value,

    /// Always a JSON object when present
    pub options: Option<Value>,
}

/// Parse and check a raw request body.
///
/// # Body
///
/// ```json
/// {
///   "template_id": "550e8400-e29b-41d4-a716-446655440000",
///   "data": { "name": "Alice" },
///   "options": { "format": "A4", "orientation": "portrait" }
/// }
/// ```
///
/// Errors name the offending field.
pub fn parse_generate_request(body: &[u8]) -> Result<GenerateDocumentRequest, AppError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| {
        AppError::InvalidRequest("El cuerpo de la solicitud debe ser JSON válido".to_string())
    })?;

    let Value::Object(mut fields) = value else {
        return Err(AppError::InvalidRequest(
            "El cuerpo de la solicitud debe ser un objeto JSON".to_string(),
        ));
    };

    let template_id = match fields.remove("template_id") {
        Some(Value::String(id)) if !id.is_empty() => id,
        _ => {
            return Err(AppError::InvalidRequest(
                "template_id es requerido".to_string(),
            ));
        }
    };

    let data = match fields.remove("data") {
        Some(data @ Value::Object(_)) => data,
        _ => {
            return Err(AppError::InvalidRequest(
                "data debe ser un objeto JSON".to_string(),
            ));
        }
    };

    let options = match fields.remove("options") {
        None | Some(Value::Null) => None,
        Some(options) => {
            RenderOptions::parse(&options)
                .map_err(|invalid| AppError::InvalidRequest(invalid.to_string()))?;
            Some(options)
        }
    };

    Ok(GenerateDocumentRequest {
        template_id,
        data,
        options,
    })
}

/// Queue a document render.
///
/// # Endpoint
///
/// `POST /v1/generate-document`
///
/// # Authentication
///
/// Requires a valid key in the `X-API-Key` header.
///
/// # Response
///
/// - **Success (202 Accepted)**: `{ "job_id": "...", "status": "queued", "message": "..." }`
/// - **Error (400)**: Malformed body, or template without versions
/// - **Error (401)**: Missing, malformed, unknown, revoked or expired key
/// - **Error (404)**: Template not found in the key's organization
/// - **Error (413)**: Body larger than `MAX_BODY_BYTES`
/// - **Error (500)**: Store failure
///
/// Submitting the same body twice queues two separate jobs.
pub async fn generate_document(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<GenerateDocumentResponse>), AppError> {
    let body = body.map_err(body_rejection)?;
    let request = parse_generate_request(&body)?;

    let resolved = resolve_template(
        state.store.as_ref(),
        &request.template_id,
        auth.organization_id,
    )
    .await?;

    let job = enqueue_render_job(
        state.store.as_ref(),
        EnqueueJob {
            organization_id: auth.organization_id,
            project_id: Some(auth.project_id),
            template_version_id: resolved.version.id,
            api_key_id: auth.api_key_id,
            payload: request.data,
            options: request.options,
        },
        Utc::now(),
    )
    .await?;

    Ok((StatusCode::ACCEPTED, Json(job.into())))
}

/// Map a body read failure onto the JSON error responses.
fn body_rejection(rejection: BytesRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        tracing::debug!(error = %rejection, "failed to read request body");
        AppError::InvalidRequest("No se pudo leer el cuerpo de la solicitud".to_string())
    }
}

/// Answer for any method other than POST on the submission endpoint.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed("POST")
}
