//! Render job models and API request/response types.
//!
//! This module defines:
//! - `RenderJob`: durable unit of asynchronous rendering work
//! - `JobStatus`: the job lifecycle shared with the rendering worker
//! - `RenderOptions`: accepted page options for a render request
//! - Response bodies for the submission and status endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a render job.
///
/// ```text
/// queued -> processing -> succeeded
///                      \-> failed
/// ```
///
/// This service only ever writes `Queued`. Every other transition is made by
/// the external worker, which discovers work by polling for queued rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Whether the worker may move a job from `self` to `next`.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Processing)
                | (Self::Processing, Self::Succeeded)
                | (Self::Processing, Self::Failed)
        )
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown render job status: {0}")]
pub struct UnknownJobStatus(pub String);

impl TryFrom<String> for JobStatus {
    type Error = UnknownJobStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "queued" => Ok(Self::Queued),
            "processing" => Ok(Self::Processing),
            "succeeded" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            _ => Err(UnknownJobStatus(value)),
        }
    }
}

/// Represents a render job record from the database.
///
/// # Database Table
///
/// Maps to the `render_jobs` table. Rows are inserted once by this service
/// and afterwards owned by the rendering worker, which fills the
/// `started_at`, `finished_at`, `result_url` and `error_message` columns.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct RenderJob {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub project_id: Option<Uuid>,

    /// Exact version to render, resolved at submission time
    pub template_version_id: Uuid,

    /// Key that authorized the submission
    pub api_key_id: Uuid,

    #[sqlx(try_from = "String")]
    pub status: JobStatus,

    /// Caller data, stored as received
    pub payload: serde_json::Value,

    /// Caller render options, stored as received (`{}` when omitted)
    pub options: serde_json::Value,

    pub queued_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub result_url: Option<String>,
    pub error_message: Option<String>,
}

/// A job about to be inserted.
#[derive(Debug, Clone)]
pub struct NewRenderJob {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub project_id: Option<Uuid>,
    pub template_version_id: Uuid,
    pub api_key_id: Uuid,
    pub payload: serde_json::Value,
    pub options: serde_json::Value,
    pub queued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum PageFormat {
    A4,
    Letter,
    Legal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Page options a caller may attach to a render request.
///
/// Used only to check the options object; the object itself is persisted
/// untouched so the worker sees exactly what the caller sent. Unknown keys
/// are passed through.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOptions {
    pub format: Option<PageFormat>,
    pub orientation: Option<Orientation>,
}

/// Which part of a caller's options object is unacceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidOptions {
    #[error("options debe ser un objeto JSON")]
    NotAnObject,

    #[error("options.format debe ser A4, Letter o Legal")]
    Format,

    #[error("options.orientation debe ser portrait o landscape")]
    Orientation,
}

impl RenderOptions {
    /// Check a caller-supplied options value field by field.
    pub fn parse(options: &serde_json::Value) -> Result<Self, InvalidOptions> {
        let fields = options.as_object().ok_or(InvalidOptions::NotAnObject)?;

        let format = fields
            .get("format")
            .map(|value| PageFormat::deserialize(value).map_err(|_| InvalidOptions::Format))
            .transpose()?;

        let orientation = fields
            .get("orientation")
            .map(|value| {
                Orientation::deserialize(value).map_err(|_| InvalidOptions::Orientation)
            })
            .transpose()?;

        Ok(Self {
            format,
            orientation,
        })
    }
}

/// Response body for an accepted render request (202).
///
/// ```json
/// {
///   "job_id": "550e8400-e29b-41d4-a716-446655440000",
///   "status": "queued",
///   "message": "Job creado exitosamente. El documento será generado de forma asíncrona."
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct GenerateDocumentResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub message: String,
}

impl From<RenderJob> for GenerateDocumentResponse {
    fn from(job: RenderJob) -> Self {
        Self {
            job_id: job.id,
            status: job.status,
            message: "Job creado exitosamente. El documento será generado de forma asíncrona."
                .to_string(),
        }
    }
}

/// Response body for the job status endpoint.
///
/// Leaves out the payload and internal references.
#[derive(Debug, Serialize)]
pub struct RenderJobResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub queued_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub result_url: Option<String>,
    pub error: Option<String>,
}

impl From<RenderJob> for RenderJobResponse {
    fn from(job: RenderJob) -> Self {
        Self {
            job_id: job.id,
            status: job.status,
            queued_at: job.queued_at,
            started_at: job.started_at,
            finished_at: job.finished_at,
            result_url: job.result_url,
            error: job.error_message,
        }
    }
}
