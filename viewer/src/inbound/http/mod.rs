//! HTTP inbound adapter serving the rendered viewer screens.
//!
//! Handlers map request URLs onto navigation state, ask the viewer service for
//! the matching screen, and render it as HTML. They never talk to the remote
//! catalogue directly.

pub mod health;
pub mod pages;
pub mod render;
pub mod state;
