//! podinfo - a diagnostic HTTP endpoint
//!
//! Answers every request with the hostname, primary IPv4 address and
//! deployment namespace of the serving instance, followed by the request URI,
//! method and peer address, as plain text.

pub mod config;
pub mod error;
pub mod host;
pub mod http;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod templates;

pub use error::*;
