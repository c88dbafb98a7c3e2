//! Template and template version models.
//!
//! A template belongs to exactly one organization and owns an ordered list of
//! immutable versions. Rendering always targets a specific version.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Represents a template row from the database.
///
/// # Database Table
///
/// Maps to the `templates` table. `versions` is filled from
/// `template_versions` in creation order.
#[derive(Debug, Clone, Serialize)]
pub struct Template {
    pub id: Uuid,
    pub name: String,

    /// Tenant owning the template
    pub organization_id: Uuid,

    /// Optional grouping under a project of the same organization
    pub project_id: Option<Uuid>,

    /// Versions ordered by `created_at`, then `id`
    pub versions: Vec<TemplateVersion>,
}

impl Template {
    /// Version used when a render request does not pin one.
    ///
    /// The version flagged `is_default` wins; without one, the earliest
    /// version is used. `None` means the template cannot be rendered.
    pub fn render_version(&self) -> Option<&TemplateVersion> {
        self.versions
            .iter()
            .find(|version| version.is_default)
            .or_else(|| self.versions.first())
    }
}

/// An immutable snapshot of a template's markup, style and data schema.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct TemplateVersion {
    pub id: Uuid,
    pub template_id: Uuid,

    /// Display label, e.g. `v1.0.2`
    pub version_label: String,
    pub major: i32,
    pub minor: i32,
    pub patch: i32,

    pub is_active: bool,

    /// At most one version per template carries this flag
    pub is_default: bool,

    pub created_at: DateTime<Utc>,
}

impl TemplateVersion {
    pub fn semantic_version(&self) -> SemanticVersion {
        SemanticVersion {
            major: self.major,
            minor: self.minor,
            patch: self.patch,
        }
    }
}

/// `major.minor.patch` triple of a template version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SemanticVersion {
    pub major: i32,
    pub minor: i32,
    pub patch: i32,
}

impl SemanticVersion {
    /// Version assigned to the first version of a template.
    pub const INITIAL: SemanticVersion = SemanticVersion {
        major: 1,
        minor: 0,
        patch: 0,
    };

    /// Version following `latest`, or [`SemanticVersion::INITIAL`] when the
    /// template has no versions yet. Publishing only ever bumps the patch.
    pub fn next_after(latest: Option<SemanticVersion>) -> SemanticVersion {
        match latest {
            Some(latest) => SemanticVersion {
                patch: latest.patch + 1,
                ..latest
            },
            None => Self::INITIAL,
        }
    }

    pub fn label(&self) -> String {
        format!("v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Content of a version about to be published.
#[derive(Debug, Clone, Default)]
pub struct NewTemplateVersion {
    pub html: String,
    pub css: String,
    pub data_schema: Option<serde_json::Value>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
}
