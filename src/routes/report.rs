//! The report handler answering every request.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, OriginalUri, State},
    http::{header::HOST, HeaderMap, Method, Uri},
};
use tracing::instrument;

use crate::config::LookupErrorPolicy;
use crate::error::{AppError, ReportError};
use crate::host::{resolve_hostname, resolve_namespace, resolve_primary_ipv4};
use crate::state::AppState;
use crate::templates::{render, PodInfo};

/// Report handler, mounted as the router fallback for every path and method.
///
/// Host facts are looked up again on every call. A lookup failure is logged and
/// then either answered with 500 or, under [`LookupErrorPolicy::Exit`], ends the
/// whole process.
#[instrument(name = "report::report", skip_all)]
pub async fn report(
    State(state): State<AppState>,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Result<String, AppError> {
    let (hostname, ip, namespace) = match lookup_host_facts(&state).await {
        Ok(facts) => facts,
        Err(err) => return Err(lookup_failed(state.config.report.on_lookup_error, err)),
    };

    let info = PodInfo {
        hostname,
        ip,
        namespace,
        uri: uri.to_string(),
        method: method.as_str().to_string(),
        remote_addr: remote_addr.to_string(),
    };

    tracing::info!("{}", access_line(request_host(&headers, &uri), &info));

    render(&state.tera, &info).map_err(|err| {
        tracing::error!(error = %err, "Failed to render report");
        AppError::from(err)
    })
}

async fn lookup_host_facts(state: &AppState) -> Result<(String, String, String), ReportError> {
    let hostname = resolve_hostname()?;
    let ip = resolve_primary_ipv4()?;
    let namespace = resolve_namespace(&state.config.report.namespace_file).await?;
    Ok((hostname, ip, namespace))
}

fn lookup_failed(policy: LookupErrorPolicy, err: ReportError) -> AppError {
    tracing::error!(error = %err, %policy, "Host lookup failed");
    if policy == LookupErrorPolicy::Exit {
        std::process::exit(1);
    }
    AppError::from(err)
}

/// Access log line: `<host> - <remote addr> <method> <uri>`.
fn access_line(host: &str, info: &PodInfo) -> String {
    format!(
        "{} - {} {} {}",
        host, info.remote_addr, info.method, info.uri
    )
}

/// Host the client addressed: the Host header, else the authority of an
/// absolute-form request URI, else empty.
fn request_host<'a>(headers: &'a HeaderMap, uri: &'a Uri) -> &'a str {
    headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| uri.authority().map(|authority| authority.as_str()))
        .unwrap_or_default()
}
