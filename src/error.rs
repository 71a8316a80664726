use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::io;

/// Failure while gathering the facts that make up a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Error getting hostname: {0}")]
    Hostname(#[source] io::Error),

    #[error("Error getting interface addresses: {0}")]
    InterfaceAddrs(#[from] local_ip_address::Error),

    #[error("Error reading namespace file {path}: {source}")]
    Namespace {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Template rendering error: {0}")]
    Template(#[from] tera::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Report(#[from] ReportError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Details stay in the log; the client only learns that the lookup failed
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
        )
            .into_response()
    }
}
