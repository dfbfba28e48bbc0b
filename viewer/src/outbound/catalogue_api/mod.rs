//! Character catalogue outbound adapter.
//!
//! This module provides a thin HTTP implementation of the `CharacterSource`
//! port.

mod dto;
mod http_source;

pub use http_source::{CatalogueHttpSource, DEFAULT_API_BASE_URL};
