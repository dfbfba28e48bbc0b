//! Server-rendered viewer for a public character catalogue.
//!
//! The crate is laid out as ports and adapters:
//! - `domain`: characters, navigation state, the query cache and the viewer
//!   service binding them.
//! - `outbound`: the reqwest adapter for the remote catalogue.
//! - `inbound`: actix-web handlers rendering screens as HTML.
//! - `server`: application assembly; `config` loads settings.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use middleware::Trace;
