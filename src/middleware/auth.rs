//! API key authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract the API key from the `X-API-Key` header
//! 2. Validate it (format, lookup by hash, revocation, expiry)
//! 3. Inject authentication context into the request
//! 4. Reject unauthorized requests with HTTP 401

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{AppError, AuthFailure},
    models::api_key::{ApiKeyRecord, KeyEnvironment},
    services::api_key_validator::validate_api_key,
    state::AppState,
};

/// Header carrying the caller's API key. Header names are case-insensitive.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Authentication context attached to authenticated requests.
///
/// Handlers take the tenant from here, never from the request body.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// ID of the authenticated API key
    pub api_key_id: Uuid,

    /// Project the key was issued for
    pub project_id: Uuid,

    /// Tenant every lookup is scoped to
    pub organization_id: Uuid,

    pub environment: KeyEnvironment,
}

impl From<&ApiKeyRecord> for AuthContext {
    fn from(record: &ApiKeyRecord) -> Self {
        Self {
            api_key_id: record.id,
            project_id: record.project_id,
            organization_id: record.organization_id(),
            environment: record.environment,
        }
    }
}

/// Read the presented key, if any, from request headers.
///
/// A header that is present but not visible ASCII cannot be a valid key and
/// is reported as `BadFormat`, not as missing.
pub fn presented_api_key(headers: &HeaderMap) -> Result<Option<&str>, AuthFailure> {
    headers
        .get(API_KEY_HEADER)
        .map(|value| value.to_str().map_err(|_| AuthFailure::BadFormat))
        .transpose()
}

/// Validate the key presented in `headers` as of now.
pub async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<ApiKeyRecord, AuthFailure> {
    let presented = presented_api_key(headers)?;
    validate_api_key(state.store.as_ref(), presented, Utc::now()).await
}

/// API key authentication middleware function.
///
/// # Flow
///
/// 1. Read `X-API-Key`
/// 2. Validate the key against the store (no caching: every request re-reads)
/// 3. If valid: inject `AuthContext` into request, call next handler
/// 4. If not: return 401 with the rejection reason
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let record = authenticate(&state, request.headers())
        .await
        .map_err(|failure| {
            tracing::warn!(reason = ?failure, "api key rejected");
            AppError::Unauthorized(failure)
        })?;

    let auth_context = AuthContext::from(&record);

    tracing::debug!(
        api_key_id = %auth_context.api_key_id,
        organization_id = %auth_context.organization_id,
        environment = auth_context.environment.as_str(),
        "api key accepted"
    );

    // Handlers extract this with Extension<AuthContext>
    request.extensions_mut().insert(auth_context);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn absent_header_is_no_key() {
        assert_eq!(presented_api_key(&HeaderMap::new()), Ok(None));
    }

    #[test]
    fn header_is_read_case_insensitively() {
        let mut headers = HeaderMap::new();
        headers.insert("X-API-Key", HeaderValue::from_static("pk_test_abc"));

        assert_eq!(presented_api_key(&headers), Ok(Some("pk_test_abc")));
    }

    #[test]
    fn undecodable_header_is_a_bad_format() {
        let mut headers = HeaderMap::new();
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_bytes(b"pk_live_\xff\xfe").unwrap(),
        );

        assert_eq!(presented_api_key(&headers), Err(AuthFailure::BadFormat));
    }
}
