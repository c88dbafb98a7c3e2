//! Render job creation.
//!
//! Enqueuing is a single insert of a `queued` row. Nothing else is written
//! and rendering is not triggered: the worker finds queued rows on its own.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::render_job::{NewRenderJob, RenderJob},
    store::RenderStore,
};

/// Everything needed to enqueue one job.
///
/// The ids come from the validated key and the resolved template, never from
/// the request body.
#[derive(Debug, Clone)]
pub struct EnqueueJob {
    pub organization_id: Uuid,
    pub project_id: Option<Uuid>,
    pub template_version_id: Uuid,
    pub api_key_id: Uuid,

    /// Caller data; must be a JSON object
    pub payload: Value,

    /// Caller options; `{}` when `None`
    pub options: Option<Value>,
}

/// Persist a new render job in the `queued` state.
///
/// # Process
///
/// 1. Check payload and options are JSON objects
/// 2. Generate a fresh job id
/// 3. Insert the row with `queued_at = now`, payload and options verbatim
///
/// Every call creates a new job; identical submissions are not deduplicated.
///
/// # Errors
///
/// - `InvalidRequest`: payload or options is not an object
/// - `EnqueueFailed`: the insert failed; no row was written
pub async fn enqueue_render_job(
    store: &dyn RenderStore,
    request: EnqueueJob,
    now: DateTime<Utc>,
) -> Result<RenderJob, AppError> {
    if !request.payload.is_object() {
        return Err(AppError::InvalidRequest(
            "data debe ser un objeto JSON".to_string(),
        ));
    }

    let options = request
        .options
        .unwrap_or_else(|| Value::Object(Map::new()));

    if !options.is_object() {
        return Err(AppError::InvalidRequest(
            "options debe ser un objeto JSON".to_string(),
        ));
    }

    let job = NewRenderJob {
        id: Uuid::new_v4(),
        organization_id: request.organization_id,
        project_id: request.project_id,
        template_version_id: request.template_version_id,
        api_key_id: request.api_key_id,
        payload: request.payload,
        options,
        queued_at: now,
    };

    let job = store
        .insert_render_job(job)
        .await
        .map_err(AppError::EnqueueFailed)?;

    tracing::info!(
        job_id = %job.id,
        organization_id = %job.organization_id,
        template_version_id = %job.template_version_id,
        "render job queued"
    );

    Ok(job)
}
