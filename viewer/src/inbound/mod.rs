//! Inbound adapters translating HTTP requests into viewer calls.

pub mod http;
