//! HTTP server configuration object.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mockable::{Clock, DefaultClock};
use url::Url;

use crate::config::{SettingsError, ViewerSettings};
use crate::domain::query_cache::RetentionPolicy;

/// Where the viewer reads characters from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogueBackend {
    /// The remote catalogue API below `base_url`.
    Remote {
        /// API root, e.g. `https://rickandmortyapi.com/api`.
        base_url: Url,
        /// Per-request timeout.
        timeout: Option<Duration>,
    },
    /// The built-in reference dataset.
    Fixture,
}

/// Resolved configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) backend: CatalogueBackend,
    pub(crate) retention: RetentionPolicy,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
}

impl ServerConfig {
    /// Resolve `settings` into a server configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when a configured address or URL is invalid.
    pub fn from_settings(settings: &ViewerSettings) -> Result<Self, SettingsError> {
        let backend = if settings.fixture_data {
            CatalogueBackend::Fixture
        } else {
            CatalogueBackend::Remote {
                base_url: settings.api_base_url()?,
                timeout: settings.request_timeout(),
            }
        };
        Ok(Self {
            bind_addr: settings.bind_addr()?,
            backend,
            retention: settings.retention_policy(),
            clock: Arc::new(DefaultClock),
        })
    }

    /// Socket address the server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
