//! Outbound adapters implementing domain ports for external services.
//!
//! - **catalogue_api**: reqwest-backed reads from the remote character
//!   catalogue.
//!
//! Adapters translate between transport representations and domain types.
//! They contain no presentation or caching logic.

pub mod catalogue_api;
