//! Data models representing database entities.
//!
//! This module contains all data structures that map to database tables.

/// API key authentication model
pub mod api_key;
/// Render job model and job lifecycle
pub mod render_job;
/// Template and template version model
pub mod template;
