//! Integration tests for the report endpoint.
//!
//! Uses `tower::ServiceExt` to drive the Axum router without a real HTTP
//! server. The peer address is supplied through a `ConnectInfo` extension,
//! exactly as the server's connect-info make service would insert it.
//!
//! Run with: cargo test --test report_tests

use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use podinfo::config::{AppConfig, LookupErrorPolicy};
use podinfo::middleware::REQUEST_ID_HEADER;
use podinfo::routes::create_router;
use podinfo::state::AppState;
use podinfo::templates::init_templates;

// ============================================================
// Helpers
// ============================================================

fn app_with_namespace_file(path: &Path) -> Router {
    let mut config = AppConfig::default();
    config.report.namespace_file = path.display().to_string();
    config.report.on_lookup_error = LookupErrorPolicy::Respond;
    create_router(AppState::new(config, init_templates().unwrap()))
}

fn request(method: &str, uri: &str, peer: &str) -> Request<Body> {
    let peer: SocketAddr = peer.parse().unwrap();
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, "podinfo.test")
        .extension(ConnectInfo(peer))
        .body(Body::empty())
        .unwrap()
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, String) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

/// Value of the line starting with `label`, if present.
fn field<'a>(body: &'a str, label: &str) -> Option<&'a str> {
    let prefix = format!("{}: ", label);
    body.lines().find_map(|line| line.strip_prefix(prefix.as_str()))
}

fn os_hostname() -> String {
    hostname::get().unwrap().to_string_lossy().into_owned()
}

// ============================================================
// Report contents
// ============================================================

#[tokio::test]
async fn test_report_layout_without_namespace() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with_namespace_file(&dir.path().join("namespace"));

    let (status, _, body) = send(app, request("GET", "/status", "10.0.0.5:54321")).await;

    assert_eq!(status, StatusCode::OK);
    let ip = field(&body, "IP").unwrap();
    let expected = format!(
        "\nHostname: {}\nIP: {}\nURI: /status\nMethod: GET\nRemoteAddr: 10.0.0.5:54321\n",
        os_hostname(),
        ip
    );
    assert_eq!(body, expected);
    assert!(field(&body, "Namespace").is_none());
}

#[tokio::test]
async fn test_hostname_matches_os() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with_namespace_file(&dir.path().join("namespace"));

    let (_, _, body) = send(app, request("GET", "/", "10.0.0.5:54321")).await;

    assert_eq!(field(&body, "Hostname"), Some(os_hostname().as_str()));
}

#[tokio::test]
async fn test_ip_is_configured_non_loopback_ipv4() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with_namespace_file(&dir.path().join("namespace"));

    let (_, _, body) = send(app, request("GET", "/", "10.0.0.5:54321")).await;

    let candidates: Vec<IpAddr> = local_ip_address::list_afinet_netifas()
        .unwrap()
        .into_iter()
        .map(|(_, ip)| ip)
        .filter(|ip| ip.is_ipv4() && !ip.is_loopback())
        .collect();
    let reported = field(&body, "IP").unwrap();
    if candidates.is_empty() {
        assert_eq!(reported, "");
    } else {
        let reported: IpAddr = reported.parse().unwrap();
        assert!(candidates.contains(&reported));
    }
}

#[tokio::test]
async fn test_namespace_line_present_when_file_exists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("namespace");
    std::fs::write(&path, "team-a").unwrap();
    let app = app_with_namespace_file(&path);

    let (status, _, body) = send(app, request("GET", "/", "10.0.0.5:54321")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.lines().any(|line| line == "Namespace: team-a"));
    // Namespace sits between IP and URI
    let ip_line = body.lines().position(|l| l.starts_with("IP:")).unwrap();
    let ns_line = body.lines().position(|l| l.starts_with("Namespace:")).unwrap();
    assert_eq!(ns_line, ip_line + 1);
}

#[tokio::test]
async fn test_empty_namespace_file_omits_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("namespace");
    std::fs::write(&path, "").unwrap();
    let app = app_with_namespace_file(&path);

    let (_, _, body) = send(app, request("GET", "/", "10.0.0.5:54321")).await;

    assert!(field(&body, "Namespace").is_none());
}

// ============================================================
// Request fields are echoed unchanged
// ============================================================

#[tokio::test]
async fn test_request_fields_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with_namespace_file(&dir.path().join("namespace"));

    let (status, _, body) = send(
        app,
        request("DELETE", "/a/b%20c/../d?x=1&y=%2F", "[2001:db8::7]:40000"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(field(&body, "URI"), Some("/a/b%20c/../d?x=1&y=%2F"));
    assert_eq!(field(&body, "Method"), Some("DELETE"));
    assert_eq!(field(&body, "RemoteAddr"), Some("[2001:db8::7]:40000"));
}

#[tokio::test]
async fn test_every_path_and_method_is_served() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with_namespace_file(&dir.path().join("namespace"));

    for (method, uri) in [
        ("GET", "/"),
        ("POST", "/deep/nested/path"),
        ("PUT", "/health"),
        ("PATCH", "/x?y"),
    ] {
        let (status, _, body) = send(app.clone(), request(method, uri, "10.0.0.5:1")).await;
        assert_eq!(status, StatusCode::OK, "{} {}", method, uri);
        assert_eq!(field(&body, "Method"), Some(method));
        assert_eq!(field(&body, "URI"), Some(uri));
    }
}

#[tokio::test]
async fn test_repeated_requests_are_identical() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("namespace");
    std::fs::write(&path, "team-a\n").unwrap();
    let app = app_with_namespace_file(&path);

    let (_, _, first) = send(app.clone(), request("GET", "/status", "10.0.0.5:54321")).await;
    let (_, _, second) = send(app, request("GET", "/status", "10.0.0.5:54321")).await;

    assert_eq!(first, second);
}

// ============================================================
// Headers and failures
// ============================================================

#[tokio::test]
async fn test_response_headers() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with_namespace_file(&dir.path().join("namespace"));

    let (_, headers, _) = send(app, request("GET", "/", "10.0.0.5:54321")).await;

    assert_eq!(headers[header::CACHE_CONTROL], "no-store");
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
}

#[tokio::test]
async fn test_each_response_carries_fresh_request_id() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with_namespace_file(&dir.path().join("namespace"));

    let (_, first, _) = send(app.clone(), request("GET", "/", "10.0.0.5:54321")).await;
    let (_, second, _) = send(app, request("GET", "/", "10.0.0.5:54321")).await;

    let first = uuid::Uuid::parse_str(first[REQUEST_ID_HEADER].to_str().unwrap()).unwrap();
    let second = uuid::Uuid::parse_str(second[REQUEST_ID_HEADER].to_str().unwrap()).unwrap();
    assert_eq!(first.get_version_num(), 4);
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_unreadable_namespace_returns_500() {
    // The directory exists but cannot be read line by line
    let dir = tempfile::tempdir().unwrap();
    let app = app_with_namespace_file(dir.path());

    let (status, headers, body) = send(app, request("GET", "/", "10.0.0.5:54321")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Internal server error");
    assert!(headers.contains_key(REQUEST_ID_HEADER));
}
