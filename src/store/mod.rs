//! Durable store behind the render pipeline.
//!
//! The pipeline never talks to sqlx directly; it goes through [`RenderStore`]
//! so the same admission logic runs against PostgreSQL in production and
//! against [`memory::InMemoryStore`] in tests.
//!
//! Every call re-reads from the backend. Implementations must not cache
//! key or template lookups between requests: a revoked key has to stop
//! working on the very next request.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    api_key::ApiKeyRecord,
    render_job::{NewRenderJob, RenderJob},
    template::{NewTemplateVersion, Template, TemplateVersion},
};

pub mod memory;
pub mod postgres;

/// Failure of the backing store.
///
/// Never shown to API callers; handlers log it and answer with a generic
/// message.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Backend could not serve the call (used by non-SQL backends)
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage operations used by the render pipeline.
///
/// Implementations must be `Send + Sync + 'static` to live in axum state
/// behind an `Arc`.
#[async_trait]
pub trait RenderStore: Send + Sync + 'static {
    /// Round-trip to the backend, used by the health check.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Point lookup of a key by its SHA-256 hash, joined with its project.
    async fn find_api_key_by_hash(
        &self,
        key_hash: &str,
    ) -> Result<Option<ApiKeyRecord>, StoreError>;

    /// Fetch a template with its versions, filtered by id AND organization.
    ///
    /// A template owned by another organization yields `Ok(None)`, exactly
    /// like a template that does not exist.
    async fn find_template(
        &self,
        template_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<Template>, StoreError>;

    /// Insert a job in a single atomic write and return the stored row.
    async fn insert_render_job(&self, job: NewRenderJob) -> Result<RenderJob, StoreError>;

    /// Fetch a job, filtered by id AND organization.
    async fn find_render_job(
        &self,
        job_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<RenderJob>, StoreError>;

    /// Publish the next version of a template as its new default.
    ///
    /// Clearing the previous default and inserting the new version happen in
    /// one transaction. Returns `Ok(None)` when the template is not owned by
    /// `organization_id`.
    async fn publish_template_version(
        &self,
        template_id: Uuid,
        organization_id: Uuid,
        version: NewTemplateVersion,
    ) -> Result<Option<TemplateVersion>, StoreError>;
}
