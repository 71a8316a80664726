//! HTTP routing.
//!
//! There is a single handler: every path and every method reaches the report
//! fallback. Responses are marked uncacheable since each one describes the
//! instance that produced it.
//!
//! Request tracing is enabled via middleware that generates a unique request ID
//! for each incoming request, allowing correlation of all logs within a request.

pub mod report;

use axum::{middleware, Router};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::CACHE_CONTROL_REPORT;
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Creates the Axum router with the catch-all report handler.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .fallback(report::report)
        .with_state(state)
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_REPORT),
        ))
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
