//! HTTP server module.
//!
//! Serves plain HTTP only; TLS is expected to be terminated in front of the
//! service. The server includes:
//! - Peer address capture for the RemoteAddr field
//! - Graceful shutdown on SIGTERM/SIGINT

mod server;
mod shutdown;

pub use server::{start_server, ServerError};
