//! Viewer settings loaded via OrthoConfig.
//!
//! Every field is optional on the wire; accessors apply the defaults so a
//! bare environment still yields a working viewer against the public API.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::query_cache::{DEFAULT_CAPACITY, DEFAULT_TTL, RetentionPolicy};
use crate::outbound::catalogue_api::DEFAULT_API_BASE_URL;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// `api_base_url` is not an absolute URL.
    #[error("invalid api_base_url {raw:?}: {source}")]
    ApiBaseUrl {
        /// Configured value.
        raw: String,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },
    /// `bind_addr` is not a socket address.
    #[error("invalid bind_addr {raw:?}: {source}")]
    BindAddr {
        /// Configured value.
        raw: String,
        /// Parse failure.
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Configuration for the viewer process.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CHARACTER_VIEWER")]
pub struct ViewerSettings {
    /// Base URL of the remote character catalogue.
    pub api_base_url: Option<String>,
    /// Socket address the HTTP server listens on.
    pub bind_addr: Option<String>,
    /// Per-request timeout for catalogue calls, in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Entries retained per cache.
    pub cache_capacity: Option<usize>,
    /// Lifetime of cached results in seconds; `0` disables expiry.
    pub cache_ttl_secs: Option<u64>,
    /// Serve the built-in reference dataset instead of the remote API.
    #[ortho_config(default = false)]
    pub fixture_data: bool,
}

impl ViewerSettings {
    /// Return the catalogue base URL, falling back to the public API.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ApiBaseUrl`] when the value does not parse.
    pub fn api_base_url(&self) -> Result<Url, SettingsError> {
        let raw = self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL);
        Url::parse(raw).map_err(|source| SettingsError::ApiBaseUrl {
            raw: raw.to_owned(),
            source,
        })
    }

    /// Return the listen address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|source| SettingsError::BindAddr {
            raw: raw.to_owned(),
            source,
        })
    }

    /// Return the catalogue request timeout, if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Return the cache retention policy.
    pub fn retention_policy(&self) -> RetentionPolicy {
        let ttl = match self.cache_ttl_secs {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => Some(DEFAULT_TTL),
        };
        RetentionPolicy {
            capacity: self.cache_capacity.unwrap_or(DEFAULT_CAPACITY),
            ttl,
        }
    }
}
