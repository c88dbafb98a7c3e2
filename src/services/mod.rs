//! Business logic services.
//!
//! Services contain the render pipeline's logic separated from HTTP handlers.
//! They talk to storage only through [`crate::store::RenderStore`].

pub mod api_key_validator;
pub mod job_enqueuer;
pub mod key_hasher;
pub mod template_resolver;
pub mod template_versions;
