//! Shared HTTP adapter state.

use std::sync::Arc;

use crate::domain::CharacterViewer;

/// Dependency bundle for page handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Viewer service shared by every worker.
    pub viewer: Arc<CharacterViewer>,
}

impl HttpState {
    /// Wrap `viewer` for use as `web::Data`.
    pub fn new(viewer: Arc<CharacterViewer>) -> Self {
        Self { viewer }
    }
}
