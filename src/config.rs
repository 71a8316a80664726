//! Configuration loading and constants.
//!
//! Loads optional configuration from a TOML file. Every section and field has a
//! default, so the service runs unconfigured: it listens on `0.0.0.0:8080` and
//! reads the Kubernetes service account namespace file. `AppConfig` is the root
//! configuration struct containing all settings.

use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use serde::Deserialize;

// =============================================================================
// HTTP Defaults
// =============================================================================

/// Default bind address (all interfaces)
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Reports describe the instance that answered; upstream caches must not reuse them
pub const CACHE_CONTROL_REPORT: &str = "no-store";

/// Time allowed for in-flight requests to finish after SIGINT/SIGTERM
pub const SHUTDOWN_GRACE_SECS: u64 = 30;

// =============================================================================
// Report Defaults
// =============================================================================

/// Namespace file mounted into pods by the Kubernetes service account admission
pub const DEFAULT_NAMESPACE_FILE: &str = "/var/run/secrets/kubernetes.io/serviceaccount/namespace";

// =============================================================================
// Logging Defaults
// =============================================================================

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "podinfo=info,tower_http=info";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    /// Report contents and lookup failure handling
    #[serde(default)]
    pub report: ReportConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        DEFAULT_HTTP_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_HTTP_PORT
    }
}

/// What to do when a host lookup (hostname, interfaces, namespace file) fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupErrorPolicy {
    /// Log the error and answer that request with 500; keep serving
    #[default]
    Respond,
    /// Log the error and terminate the process with exit status 1
    Exit,
}

impl std::fmt::Display for LookupErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupErrorPolicy::Respond => f.write_str("respond"),
            LookupErrorPolicy::Exit => f.write_str("exit"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// File whose lines are concatenated into the Namespace field
    #[serde(default = "ReportConfig::default_namespace_file")]
    pub namespace_file: String,
    #[serde(default)]
    pub on_lookup_error: LookupErrorPolicy,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            namespace_file: Self::default_namespace_file(),
            on_lookup_error: LookupErrorPolicy::default(),
        }
    }
}

impl ReportConfig {
    fn default_namespace_file() -> String {
        DEFAULT_NAMESPACE_FILE.to_string()
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.http.host.trim().is_empty() {
            return Err(ConfigError::Validation(
                "http.host must not be empty".to_string(),
            ));
        }
        if self.report.namespace_file.trim().is_empty() {
            return Err(ConfigError::Validation(
                "report.namespace_file must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Socket address the server binds to.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.http.host.parse().map_err(|e| {
            ConfigError::Validation(format!("Invalid http.host '{}': {}", self.http.host, e))
        })?;
        Ok(SocketAddr::new(ip, self.http.port))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}
