//! PostgreSQL implementation of [`RenderStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    db::DbPool,
    models::{
        api_key::{ApiKeyRecord, KeyEnvironment, ProjectSummary},
        render_job::{JobStatus, NewRenderJob, RenderJob},
        template::{NewTemplateVersion, SemanticVersion, Template, TemplateVersion},
    },
    store::{RenderStore, StoreError},
};

/// Row produced by the `api_keys` ⋈ `projects` lookup.
#[derive(Debug, sqlx::FromRow)]
struct ApiKeyRow {
    id: Uuid,
    name: String,
    #[sqlx(try_from = "String")]
    environment: KeyEnvironment,
    is_active: bool,
    project_id: Uuid,
    daily_limit: Option<i32>,
    monthly_limit: Option<i32>,
    expires_at: Option<DateTime<Utc>>,
    project_name: String,
    project_slug: String,
    organization_id: Uuid,
}

impl From<ApiKeyRow> for ApiKeyRecord {
    fn from(row: ApiKeyRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            environment: row.environment,
            is_active: row.is_active,
            project_id: row.project_id,
            daily_limit: row.daily_limit,
            monthly_limit: row.monthly_limit,
            expires_at: row.expires_at,
            project: ProjectSummary {
                id: row.project_id,
                name: row.project_name,
                slug: row.project_slug,
                organization_id: row.organization_id,
            },
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TemplateRow {
    id: Uuid,
    name: String,
    organization_id: Uuid,
    project_id: Option<Uuid>,
}

/// Store backed by a sqlx connection pool.
#[derive(Debug, Clone)]
pub struct PgRenderStore {
    pool: DbPool,
}

impl PgRenderStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RenderStore for PgRenderStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_api_key_by_hash(
        &self,
        key_hash: &str,
    ) -> Result<Option<ApiKeyRecord>, StoreError> {
        // Indexed point lookup on the unique key_hash column
        let row = sqlx::query_as::<_, ApiKeyRow>(
            r#"
            SELECT k.id, k.name, k.environment, k.is_active, k.project_id,
                   k.daily_limit, k.monthly_limit, k.expires_at,
                   p.name AS project_name, p.slug AS project_slug, p.organization_id
            FROM api_keys k
            JOIN projects p ON p.id = k.project_id
            WHERE k.key_hash = $1
            LIMIT 1
            "#,
        )
        .bind(key_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_template(
        &self,
        template_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<Template>, StoreError> {
        let Some(row) = sqlx::query_as::<_, TemplateRow>(
            r#"
            SELECT id, name, organization_id, project_id
            FROM templates
            WHERE id = $1 AND organization_id = $2
            "#,
        )
        .bind(template_id)
        // Tenant filter: never trust an organization sent by the caller
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let versions = sqlx::query_as::<_, TemplateVersion>(
            r#"
            SELECT id, template_id, version_label, major, minor, patch,
                   is_active, is_default, created_at
            FROM template_versions
            WHERE template_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Template {
            id: row.id,
            name: row.name,
            organization_id: row.organization_id,
            project_id: row.project_id,
            versions,
        }))
    }

    async fn insert_render_job(&self, job: NewRenderJob) -> Result<RenderJob, StoreError> {
        // Single statement: either the whole row is visible or nothing is
        let job = sqlx::query_as::<_, RenderJob>(
            r#"
            INSERT INTO render_jobs (
                id,
                organization_id,
                project_id,
                template_version_id,
                api_key_id,
                status,
                payload,
                options,
                queued_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, organization_id, project_id, template_version_id, api_key_id,
                      status, payload, options, queued_at, started_at, finished_at,
                      result_url, error_message
            "#,
        )
        .bind(job.id)
        .bind(job.organization_id)
        .bind(job.project_id)
        .bind(job.template_version_id)
        .bind(job.api_key_id)
        .bind(JobStatus::Queued.as_str())
        .bind(job.payload)
        .bind(job.options)
        .bind(job.queued_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(job)
    }

    async fn find_render_job(
        &self,
        job_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<RenderJob>, StoreError> {
        let job = sqlx::query_as::<_, RenderJob>(
            r#"
            SELECT id, organization_id, project_id, template_version_id, api_key_id,
                   status, payload, options, queued_at, started_at, finished_at,
                   result_url, error_message
            FROM render_jobs
            WHERE id = $1 AND organization_id = $2
            "#,
        )
        .bind(job_id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(job)
    }

    async fn publish_template_version(
        &self,
        template_id: Uuid,
        organization_id: Uuid,
        version: NewTemplateVersion,
    ) -> Result<Option<TemplateVersion>, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Lock the template row so concurrent publishes of the same template
        // serialize on it
        let owned: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM templates WHERE id = $1 AND organization_id = $2 FOR UPDATE",
        )
        .bind(template_id)
        .bind(organization_id)
        .fetch_optional(&mut *tx)
        .await?;

        if owned.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let latest: Option<(i32, i32, i32)> = sqlx::query_as(
            r#"
            SELECT major, minor, patch
            FROM template_versions
            WHERE template_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(template_id)
        .fetch_optional(&mut *tx)
        .await?;

        let next = SemanticVersion::next_after(latest.map(|(major, minor, patch)| {
            SemanticVersion {
                major,
                minor,
                patch,
            }
        }));

        sqlx::query(
            "UPDATE template_versions SET is_default = false WHERE template_id = $1 AND is_default",
        )
        .bind(template_id)
        .execute(&mut *tx)
        .await?;

        let published = sqlx::query_as::<_, TemplateVersion>(
            r#"
            INSERT INTO template_versions (
                template_id,
                version_label,
                major,
                minor,
                patch,
                html,
                css,
                data_schema,
                notes,
                created_by,
                is_active,
                is_default
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, true, true)
            RETURNING id, template_id, version_label, major, minor, patch,
                      is_active, is_default, created_at
            "#,
        )
        .bind(template_id)
        .bind(next.label())
        .bind(next.major)
        .bind(next.minor)
        .bind(next.patch)
        .bind(version.html)
        .bind(version.css)
        .bind(version.data_schema)
        .bind(version.notes)
        .bind(version.created_by)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(published))
    }
}
