mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{EXPIRED_KEY, Fixture, LIVE_KEY, REVOKED_KEY, get, post_json, send};
use render_job_service::models::render_job::JobStatus;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

const ENDPOINT: &str = "/v1/generate-document";

#[tokio::test]
async fn missing_key_is_rejected_before_any_lookup() {
    let fixture = Fixture::new();
    let body = json!({ "template_id": fixture.template_id, "data": {} });

    let (status, body) = send(fixture.router(), post_json(ENDPOINT, None, &body)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({ "error": "API Key no proporcionada. Usa el header X-API-Key" })
    );
    assert_eq!(fixture.store.key_lookup_count(), 0);
    assert!(fixture.store.render_jobs().is_empty());
}

#[tokio::test]
async fn malformed_key_never_reaches_the_store() {
    let fixture = Fixture::new();
    let body = json!({ "template_id": fixture.template_id, "data": {} });

    let (status, body) = send(
        fixture.router(),
        post_json(ENDPOINT, Some("sk_live_abcdef"), &body),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("pk_live_"));
    assert_eq!(fixture.store.key_lookup_count(), 0);
}

#[tokio::test]
async fn unknown_key_is_rejected() {
    let fixture = Fixture::new();
    let body = json!({ "template_id": fixture.template_id, "data": {} });

    let (status, body) = send(
        fixture.router(),
        post_json(ENDPOINT, Some("pk_live_bad"), &body),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "API Key no encontrada o inválida" }));
    assert_eq!(fixture.store.key_lookup_count(), 1);
    assert!(fixture.store.render_jobs().is_empty());
}

#[tokio::test]
async fn revoked_and_expired_keys_are_rejected() {
    let fixture = Fixture::new();
    let body = json!({ "template_id": fixture.template_id, "data": {} });

    let (status, revoked) = send(
        fixture.router(),
        post_json(ENDPOINT, Some(REVOKED_KEY), &body),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(revoked["error"], "API Key revocada");

    let (status, expired) = send(
        fixture.router(),
        post_json(ENDPOINT, Some(EXPIRED_KEY), &body),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(expired["error"], "API Key expirada");

    assert!(fixture.store.render_jobs().is_empty());
}

#[tokio::test]
async fn valid_request_queues_a_job_on_the_default_version() {
    let fixture = Fixture::new();
    let body = json!({
        "template_id": fixture.template_id,
        "data": { "name": "Alice" },
        "options": { "format": "A4" }
    });

    let (status, body) = send(fixture.router(), post_json(ENDPOINT, Some(LIVE_KEY), &body)).await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "queued");
    assert_eq!(
        body["message"],
        "Job creado exitosamente. El documento será generado de forma asíncrona."
    );
    let job_id: Uuid = body["job_id"].as_str().unwrap().parse().unwrap();

    let jobs = fixture.store.render_jobs();
    assert_eq!(jobs.len(), 1);
    let job = &jobs[0];
    assert_eq!(job.id, job_id);
    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.organization_id, fixture.organization_id);
    assert_eq!(job.project_id, Some(fixture.project_id));
    assert_eq!(job.api_key_id, fixture.api_key_id);
    assert_eq!(job.template_version_id, fixture.default_version_id);
    assert_eq!(job.payload, json!({ "name": "Alice" }));
    assert_eq!(job.options, json!({ "format": "A4" }));
}

#[tokio::test]
async fn options_default_to_an_empty_object() {
    let fixture = Fixture::new();
    let body = json!({ "template_id": fixture.template_id, "data": {} });

    let (status, _) = send(fixture.router(), post_json(ENDPOINT, Some(LIVE_KEY), &body)).await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(fixture.store.render_jobs()[0].options, json!({}));
}

#[tokio::test]
async fn identical_submissions_create_distinct_jobs() {
    let fixture = Fixture::new();
    let body = json!({ "template_id": fixture.template_id, "data": { "n": 1 } });

    let (first_status, first) =
        send(fixture.router(), post_json(ENDPOINT, Some(LIVE_KEY), &body)).await;
    let (second_status, second) =
        send(fixture.router(), post_json(ENDPOINT, Some(LIVE_KEY), &body)).await;

    assert_eq!(first_status, StatusCode::ACCEPTED);
    assert_eq!(second_status, StatusCode::ACCEPTED);
    assert_ne!(first["job_id"], second["job_id"]);
    assert_eq!(fixture.store.render_jobs().len(), 2);
}

#[tokio::test]
async fn template_of_another_organization_is_not_found() {
    let fixture = Fixture::new();
    let foreign = json!({ "template_id": fixture.foreign_template_id, "data": {} });
    let missing = json!({ "template_id": Uuid::new_v4(), "data": {} });
    let malformed = json!({ "template_id": "not-a-uuid", "data": {} });

    for body in [foreign, missing, malformed] {
        let (status, body) =
            send(fixture.router(), post_json(ENDPOINT, Some(LIVE_KEY), &body)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Template no encontrado o sin permisos" }));
    }
    assert!(fixture.store.render_jobs().is_empty());
}

#[tokio::test]
async fn missing_data_is_a_bad_request_naming_the_field() {
    let fixture = Fixture::new();
    let body = json!({ "template_id": fixture.template_id });

    let (status, body) = send(fixture.router(), post_json(ENDPOINT, Some(LIVE_KEY), &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("data"));
    assert!(fixture.store.render_jobs().is_empty());
}

#[tokio::test]
async fn missing_template_id_is_a_bad_request() {
    let fixture = Fixture::new();
    let body = json!({ "data": {} });

    let (status, body) = send(fixture.router(), post_json(ENDPOINT, Some(LIVE_KEY), &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "template_id es requerido");
}

#[tokio::test]
async fn non_json_body_is_a_bad_request() {
    let fixture = Fixture::new();
    let request = Request::post(ENDPOINT)
        .header("content-type", "application/json")
        .header("x-api-key", LIVE_KEY)
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(fixture.router(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn template_without_versions_is_a_bad_request() {
    let fixture = Fixture::new();
    let template_id = Uuid::new_v4();
    fixture
        .store
        .seed_template(render_job_service::models::template::Template {
            id: template_id,
            name: "Draft".to_string(),
            organization_id: fixture.organization_id,
            project_id: None,
            versions: Vec::new(),
        });
    let body = json!({ "template_id": template_id, "data": {} });

    let (status, body) = send(fixture.router(), post_json(ENDPOINT, Some(LIVE_KEY), &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Template no tiene versiones");
}

#[tokio::test]
async fn wrong_method_is_rejected_before_authentication() {
    let fixture = Fixture::new();

    let (status, body) = send(fixture.router(), get(ENDPOINT, None)).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({ "error": "Método no permitido. Usa POST" }));
    assert_eq!(fixture.store.key_lookup_count(), 0);
}

#[tokio::test]
async fn preflight_is_answered_without_authentication() {
    let fixture = Fixture::new();
    let request = Request::options(ENDPOINT)
        .header("origin", "https://app.example.com")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "x-api-key, content-type")
        .body(Body::empty())
        .unwrap();

    let response = fixture.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
    let allowed = response.headers()["access-control-allow-headers"]
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(allowed.contains("x-api-key"));
    assert_eq!(fixture.store.key_lookup_count(), 0);
}

#[tokio::test]
async fn store_write_failure_is_a_server_error() {
    let fixture = Fixture::new();
    fixture.store.set_fail_writes(true);
    let body = json!({ "template_id": fixture.template_id, "data": {} });

    let (status, body) = send(fixture.router(), post_json(ENDPOINT, Some(LIVE_KEY), &body)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Error al crear job de renderizado" }));
    assert!(fixture.store.render_jobs().is_empty());
}

#[tokio::test]
async fn store_read_failure_during_key_lookup_is_unauthorized() {
    let fixture = Fixture::new();
    fixture.store.set_fail_reads(true);
    let body = json!({ "template_id": fixture.template_id, "data": {} });

    let (status, body) = send(fixture.router(), post_json(ENDPOINT, Some(LIVE_KEY), &body)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "API Key no encontrada o inválida");
}
