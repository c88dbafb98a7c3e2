//! In-process [`RenderStore`] for tests and local runs without PostgreSQL.
//!
//! Counts key lookups and can be told to fail reads or writes, which is how
//! tests observe that malformed keys never reach storage and that store
//! failures surface as server errors.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    models::{
        api_key::ApiKeyRecord,
        render_job::{JobStatus, NewRenderJob, RenderJob},
        template::{NewTemplateVersion, SemanticVersion, Template, TemplateVersion},
    },
    store::{RenderStore, StoreError},
};

#[derive(Debug, Default)]
struct Tables {
    /// Keyed by key hash
    api_keys: HashMap<String, ApiKeyRecord>,
    templates: Vec<Template>,
    render_jobs: Vec<RenderJob>,
}

#[derive(Debug, Default)]
struct Inner {
    tables: Mutex<Tables>,
    key_lookups: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

/// Cheaply cloneable handle; clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.inner
            .tables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }
        Ok(())
    }

    fn check_writes(&self) -> Result<(), StoreError> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }

    pub fn seed_api_key(&self, key_hash: impl Into<String>, record: ApiKeyRecord) {
        self.tables().api_keys.insert(key_hash.into(), record);
    }

    pub fn seed_template(&self, template: Template) {
        self.tables().templates.push(template);
    }

    pub fn seed_render_job(&self, job: RenderJob) {
        self.tables().render_jobs.push(job);
    }

    /// Snapshot of all stored jobs in insertion order.
    pub fn render_jobs(&self) -> Vec<RenderJob> {
        self.tables().render_jobs.clone()
    }

    /// Snapshot of a template regardless of its organization.
    pub fn template(&self, template_id: Uuid) -> Option<Template> {
        self.tables()
            .templates
            .iter()
            .find(|template| template.id == template_id)
            .cloned()
    }

    /// Number of `find_api_key_by_hash` calls served so far.
    pub fn key_lookup_count(&self) -> usize {
        self.inner.key_lookups.load(Ordering::SeqCst)
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl RenderStore for InMemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check_reads()
    }

    async fn find_api_key_by_hash(
        &self,
        key_hash: &str,
    ) -> Result<Option<ApiKeyRecord>, StoreError> {
        self.inner.key_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        Ok(self.tables().api_keys.get(key_hash).cloned())
    }

    async fn find_template(
        &self,
        template_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<Template>, StoreError> {
        self.check_reads()?;
        Ok(self
            .tables()
            .templates
            .iter()
            .find(|t| t.id == template_id && t.organization_id == organization_id)
            .cloned())
    }

    async fn insert_render_job(&self, job: NewRenderJob) -> Result<RenderJob, StoreError> {
        self.check_writes()?;
        let job = RenderJob {
            id: job.id,
            organization_id: job.organization_id,
            project_id: job.project_id,
            template_version_id: job.template_version_id,
            api_key_id: job.api_key_id,
            status: JobStatus::Queued,
            payload: job.payload,
            options: job.options,
            queued_at: job.queued_at,
            started_at: None,
            finished_at: None,
            result_url: None,
            error_message: None,
        };
        self.tables().render_jobs.push(job.clone());
        Ok(job)
    }

    async fn find_render_job(
        &self,
        job_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<RenderJob>, StoreError> {
        self.check_reads()?;
        Ok(self
            .tables()
            .render_jobs
            .iter()
            .find(|job| job.id == job_id && job.organization_id == organization_id)
            .cloned())
    }

    async fn publish_template_version(
        &self,
        template_id: Uuid,
        organization_id: Uuid,
        // Content columns are not modelled in memory
        _version: NewTemplateVersion,
    ) -> Result<Option<TemplateVersion>, StoreError> {
        self.check_writes()?;

        // The tables lock is held for the whole publish, like the row lock
        // taken by the SQL backend
        let mut tables = self.tables();
        let Some(template) = tables
            .templates
            .iter_mut()
            .find(|t| t.id == template_id && t.organization_id == organization_id)
        else {
            return Ok(None);
        };

        let next = SemanticVersion::next_after(
            template
                .versions
                .last()
                .map(TemplateVersion::semantic_version),
        );

        for existing in &mut template.versions {
            existing.is_default = false;
        }

        let published = TemplateVersion {
            id: Uuid::new_v4(),
            template_id,
            version_label: next.label(),
            major: next.major,
            minor: next.minor,
            patch: next.patch,
            is_active: true,
            is_default: true,
            created_at: Utc::now(),
        };
        template.versions.push(published.clone());

        Ok(Some(published))
    }
}
