//! Render job status endpoint.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    error::AppError, middleware::auth::AuthContext, models::render_job::RenderJobResponse,
    state::AppState,
};

/// Get the current state of a render job.
///
/// # Endpoint
///
/// `GET /v1/render-jobs/{job_id}`
///
/// # Security
///
/// The lookup filters by job id AND the key's organization. Jobs of other
/// organizations, unknown ids and malformed ids all return the same 404.
pub async fn get_render_job(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(job_id): Path<String>,
) -> Result<Json<RenderJobResponse>, AppError> {
    let job_id = Uuid::parse_str(&job_id).map_err(|_| AppError::JobNotFound)?;

    let job = state
        .store
        .find_render_job(job_id, auth.organization_id)
        .await?
        .ok_or(AppError::JobNotFound)?;

    Ok(Json(job.into()))
}

/// Answer for any method other than GET on the job status endpoint.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed("GET")
}
