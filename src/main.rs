//! podinfo: a diagnostic HTTP endpoint.
//!
//! This is the application entry point. It initializes tracing, loads the
//! optional TOML configuration, compiles the report template, sets up the Axum
//! router and starts the HTTP server.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use podinfo::config::{AppConfig, LogFormat, DEFAULT_LOG_FILTER};
use podinfo::http::start_server;
use podinfo::routes::create_router;
use podinfo::state::AppState;
use podinfo::templates::init_templates;

/// podinfo: Report which instance answered a request
#[derive(Parser, Debug)]
#[command(name = "podinfo", version, about)]
struct Args {
    /// Path to configuration file (built-in defaults are used when omitted)
    #[arg(short, long)]
    config: Option<String>,

    /// Log level filter (e.g., "podinfo=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Configuration comes first so the log format can be applied
    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let json = config.logging.format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&log_filter))
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();

    match &args.config {
        Some(path) => tracing::info!(path = %path, "Loaded configuration"),
        None => tracing::info!("No configuration file given, using defaults"),
    }
    tracing::info!(
        namespace_file = %config.report.namespace_file,
        on_lookup_error = %config.report.on_lookup_error,
        "Report configured"
    );

    let tera = init_templates()?;
    tracing::info!("Initialized templates");

    let state = AppState::new(config.clone(), tera);
    let app = create_router(state);

    start_server(app, &config).await?;

    Ok(())
}
