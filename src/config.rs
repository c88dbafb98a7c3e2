//! Application configuration management.
//!
//! Configuration is read from environment variables with the `envy` crate,
//! after an optional `.env` file has been loaded.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `DATABASE_MAX_CONNECTIONS` (optional): pool size, defaults to 5
/// - `CORS_ALLOW_ORIGIN` (optional): single allowed browser origin; any origin when unset
/// - `MAX_BODY_BYTES` (optional): request body limit, defaults to 1 MiB
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,

    #[serde(default)]
    pub cors_allow_origin: Option<String>,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    5
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Missing .env is fine
        dotenvy::dotenv().ok();

        // database_url -> DATABASE_URL
        envy::from_env::<Config>()
    }

    /// Build configuration from explicit key/value pairs instead of the
    /// process environment.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(pairs)
    }
}
