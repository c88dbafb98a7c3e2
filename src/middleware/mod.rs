//! HTTP middleware components.
//!
//! Middleware run before route handlers and may short-circuit a request,
//! e.g. reject it as unauthorized.

/// API key authentication middleware
pub mod auth;
