//! API key model for render request authentication.
//!
//! API keys are issued per project and stored as SHA-256 hashes. The plaintext
//! key is shown once at provisioning time and never persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Prefix of keys issued for the production environment.
pub const LIVE_KEY_PREFIX: &str = "pk_live_";

/// Prefix of keys issued for the sandbox environment.
pub const TEST_KEY_PREFIX: &str = "pk_test_";

/// Environment a key was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEnvironment {
    Live,
    Test,
}

impl KeyEnvironment {
    /// Determine the environment from the literal prefix of a presented key.
    ///
    /// Returns `None` for anything that is not a recognized key format.
    pub fn from_key_prefix(key: &str) -> Option<Self> {
        if key.starts_with(LIVE_KEY_PREFIX) {
            Some(Self::Live)
        } else if key.starts_with(TEST_KEY_PREFIX) {
            Some(Self::Test)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Test => "test",
        }
    }
}

/// Stored environment tag did not match `live` or `test`.
#[derive(Debug, thiserror::Error)]
#[error("unknown key environment: {0}")]
pub struct UnknownEnvironment(pub String);

impl TryFrom<String> for KeyEnvironment {
    type Error = UnknownEnvironment;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "live" => Ok(Self::Live),
            "test" => Ok(Self::Test),
            _ => Err(UnknownEnvironment(value)),
        }
    }
}

/// Denormalized summary of the project that owns a key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,

    /// Tenant of the project. Every tenant-scoped query in the render
    /// pipeline filters by this value, never by anything the caller sends.
    pub organization_id: Uuid,
}

/// An issued API key joined with its owning project.
///
/// # Database Tables
///
/// Assembled from `api_keys` joined to `projects` on `project_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiKeyRecord {
    pub id: Uuid,

    /// Human-readable label chosen when the key was issued
    pub name: String,

    pub environment: KeyEnvironment,

    /// Revoked keys keep their row with `is_active = false`
    pub is_active: bool,

    pub project_id: Uuid,

    /// Optional request ceilings. Carried for callers; not enforced here.
    pub daily_limit: Option<i32>,
    pub monthly_limit: Option<i32>,

    pub expires_at: Option<DateTime<Utc>>,

    pub project: ProjectSummary,
}

impl ApiKeyRecord {
    /// Whether `expires_at` lies strictly before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at < now)
    }

    pub fn organization_id(&self) -> Uuid {
        self.project.organization_id
    }
}

/// Response body for a successful key validation.
///
/// ```json
/// {
///   "valid": true,
///   "key": {
///     "id": "550e8400-e29b-41d4-a716-446655440000",
///     "name": "production",
///     "environment": "live",
///     "daily_limit": 1000,
///     "monthly_limit": null
///   },
///   "project": { "id": "...", "name": "Billing", "slug": "billing" }
/// }
/// ```
///
/// The owning organization is not exposed.
#[derive(Debug, Serialize)]
pub struct KeyValidationResponse {
    pub valid: bool,
    pub key: KeySummary,
    pub project: ProjectInfo,
}

#[derive(Debug, Serialize)]
pub struct KeySummary {
    pub id: Uuid,
    pub name: String,
    pub environment: KeyEnvironment,
    pub daily_limit: Option<i32>,
    pub monthly_limit: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct ProjectInfo {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<ApiKeyRecord> for KeyValidationResponse {
    fn from(record: ApiKeyRecord) -> Self {
        Self {
            valid: true,
            key: KeySummary {
                id: record.id,
                name: record.name,
                environment: record.environment,
                daily_limit: record.daily_limit,
                monthly_limit: record.monthly_limit,
            },
            project: ProjectInfo {
                id: record.project.id,
                name: record.project.name,
                slug: record.project.slug,
            },
        }
    }
}
