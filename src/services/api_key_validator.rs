//! API key validation.
//!
//! Resolves a presented key to its [`ApiKeyRecord`]. Checks run cheapest
//! first: presence and format are decided locally, so malformed input never
//! reaches the store, and only then is the hash looked up and the record's
//! state inspected.

use chrono::{DateTime, Utc};

use crate::{
    error::AuthFailure,
    models::api_key::{ApiKeyRecord, KeyEnvironment},
    services::key_hasher::hash_api_key,
    store::RenderStore,
};

/// Validate a presented API key.
///
/// # Process
///
/// 1. Absent or empty key → `Missing` (no lookup)
/// 2. Key without a `pk_live_`/`pk_test_` prefix → `BadFormat` (no lookup)
/// 3. Hash and look up; no row or a store error → `NotFound`
/// 4. Inactive → `Revoked`; otherwise expired before `now` → `Expired`
///
/// Read-only and safe to call concurrently.
pub async fn validate_api_key(
    store: &dyn RenderStore,
    presented: Option<&str>,
    now: DateTime<Utc>,
) -> Result<ApiKeyRecord, AuthFailure> {
    let api_key = presented
        .filter(|key| !key.is_empty())
        .ok_or(AuthFailure::Missing)?;

    if KeyEnvironment::from_key_prefix(api_key).is_none() {
        return Err(AuthFailure::BadFormat);
    }

    let key_hash = hash_api_key(api_key);

    let record = match store.find_api_key_by_hash(&key_hash).await {
        Ok(Some(record)) => record,
        Ok(None) => return Err(AuthFailure::NotFound),
        Err(error) => {
            tracing::error!(error = %error, "api key lookup failed");
            return Err(AuthFailure::NotFound);
        }
    };

    // Revocation is reported even when the key has also expired
    if !record.is_active {
        return Err(AuthFailure::Revoked);
    }

    if record.is_expired_at(now) {
        return Err(AuthFailure::Expired);
    }

    Ok(record)
}
