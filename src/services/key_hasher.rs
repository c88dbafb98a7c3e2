//! One-way transform of a presented API key into its lookup value.

use sha2::{Digest, Sha256};

/// Hash an API key with SHA-256, returned as 64 lowercase hex characters.
///
/// Only this digest is stored in `api_keys.key_hash` and used for lookups.
pub fn hash_api_key(api_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());

    hex::encode(hasher.finalize())
}
