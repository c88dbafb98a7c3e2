#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{DateTime, Duration, Utc};
use http_body_util::BodyExt;
use render_job_service::{
    app,
    config::Config,
    models::{
        api_key::{ApiKeyRecord, KeyEnvironment, ProjectSummary},
        template::{Template, TemplateVersion},
    },
    services::key_hasher::hash_api_key,
    state::AppState,
    store::memory::InMemoryStore,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const LIVE_KEY: &str = "pk_live_4f9d2c7a1b8e6d3f";
pub const REVOKED_KEY: &str = "pk_live_revoked00000000";
pub const EXPIRED_KEY: &str = "pk_test_expired00000000";

/// One organization with a project, its keys and a published template,
/// plus a template owned by another organization.
pub struct Fixture {
    pub store: InMemoryStore,
    pub organization_id: Uuid,
    pub project_id: Uuid,
    pub api_key_id: Uuid,
    pub template_id: Uuid,
    pub default_version_id: Uuid,
    pub foreign_template_id: Uuid,
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        server_port: 0,
        database_max_connections: 1,
        cors_allow_origin: None,
        max_body_bytes: 64 * 1024,
    }
}

pub fn key_record(organization_id: Uuid, project_id: Uuid) -> ApiKeyRecord {
    ApiKeyRecord {
        id: Uuid::new_v4(),
        name: "production".to_string(),
        environment: KeyEnvironment::Live,
        is_active: true,
        project_id,
        daily_limit: Some(1000),
        monthly_limit: None,
        expires_at: None,
        project: ProjectSummary {
            id: project_id,
            name: "Billing".to_string(),
            slug: "billing".to_string(),
            organization_id,
        },
    }
}

pub fn version(
    template_id: Uuid,
    patch: i32,
    is_default: bool,
    created_at: DateTime<Utc>,
) -> TemplateVersion {
    TemplateVersion {
        id: Uuid::new_v4(),
        template_id,
        version_label: format!("v1.0.{patch}"),
        major: 1,
        minor: 0,
        patch,
        is_active: true,
        is_default,
        created_at,
    }
}

impl Fixture {
    pub fn new() -> Self {
        let store = InMemoryStore::new();
        let organization_id = Uuid::new_v4();
        let project_id = Uuid::new_v4();
        let now = Utc::now();

        let live = key_record(organization_id, project_id);
        let api_key_id = live.id;
        store.seed_api_key(hash_api_key(LIVE_KEY), live);

        store.seed_api_key(
            hash_api_key(REVOKED_KEY),
            ApiKeyRecord {
                is_active: false,
                ..key_record(organization_id, project_id)
            },
        );
        store.seed_api_key(
            hash_api_key(EXPIRED_KEY),
            ApiKeyRecord {
                environment: KeyEnvironment::Test,
                expires_at: Some(now - Duration::days(1)),
                ..key_record(organization_id, project_id)
            },
        );

        let template_id = Uuid::new_v4();
        let old = version(template_id, 0, false, now - Duration::days(2));
        let default = version(template_id, 1, true, now - Duration::days(1));
        let default_version_id = default.id;
        store.seed_template(Template {
            id: template_id,
            name: "Invoice".to_string(),
            organization_id,
            project_id: Some(project_id),
            versions: vec![old, default],
        });

        let foreign_template_id = Uuid::new_v4();
        store.seed_template(Template {
            id: foreign_template_id,
            name: "Other tenant invoice".to_string(),
            organization_id: Uuid::new_v4(),
            project_id: None,
            versions: vec![version(foreign_template_id, 0, true, now)],
        });

        Self {
            store,
            organization_id,
            project_id,
            api_key_id,
            template_id,
            default_version_id,
            foreign_template_id,
        }
    }

    pub fn router(&self) -> Router {
        app(
            AppState::new(Arc::new(self.store.clone())),
            &test_config(),
        )
    }
}

/// Send one request through a fresh router and decode the JSON body.
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body is JSON")
    };
    (status, body)
}

pub fn post_json(uri: &str, api_key: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::post(uri).header("content-type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

pub fn get(uri: &str, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::empty()).expect("valid request")
}
