//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::store::RenderStore;

/// Cloned into each request by axum. Holds no per-request or cached data;
/// the store is the only shared resource.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RenderStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RenderStore>) -> Self {
        Self { store }
    }
}
