//! Builders turning server configuration into handler state.

use std::sync::Arc;

use actix_web::web;
use tracing::info;

use super::config::{CatalogueBackend, ServerConfig};
use crate::domain::CharacterViewer;
use crate::domain::ports::{CharacterSource, FixtureCharacterSource};
use crate::inbound::http::state::HttpState;
use crate::outbound::catalogue_api::CatalogueHttpSource;

/// Build the character source selected by `backend`.
///
/// # Errors
///
/// Returns [`std::io::Error`] when the HTTP client or the fixture dataset
/// cannot be constructed.
pub fn build_character_source(
    backend: &CatalogueBackend,
) -> std::io::Result<Arc<dyn CharacterSource>> {
    match backend {
        CatalogueBackend::Remote { base_url, timeout } => {
            info!(%base_url, ?timeout, "reading characters from remote catalogue");
            let source = CatalogueHttpSource::new(base_url.clone(), *timeout).map_err(|e| {
                std::io::Error::other(format!("catalogue client construction failed: {e}"))
            })?;
            Ok(Arc::new(source))
        }
        CatalogueBackend::Fixture => {
            info!("reading characters from reference fixture");
            let source = FixtureCharacterSource::reference()
                .map_err(|e| std::io::Error::other(format!("fixture dataset failed: {e}")))?;
            Ok(Arc::new(source))
        }
    }
}

/// Build the shared handler state for `config`.
///
/// The returned data is cloned into every worker so all workers share one
/// viewer and therefore one cache.
///
/// # Errors
///
/// Propagates failures from [`build_character_source`].
pub fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let source = build_character_source(&config.backend)?;
    let viewer = CharacterViewer::new(source, config.retention, Arc::clone(&config.clock));
    Ok(web::Data::new(HttpState::new(Arc::new(viewer))))
}
