//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (headers, JSON body, URL params)
//! 2. Calls into the services
//! 3. Returns HTTP response (JSON, status code)

/// Render request submission
pub mod documents;
/// Store connectivity probe
pub mod health;
/// Render job status
pub mod jobs;
/// API key validation
pub mod keys;
