//! Host facts gathered for every report.
//!
//! Nothing here is cached: the hostname, interface list and namespace file are
//! consulted again on each call so a report always reflects the current state
//! of the machine.

use std::net::IpAddr;
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::ReportError;

/// Returns the hostname configured in the operating system.
pub fn resolve_hostname() -> Result<String, ReportError> {
    let name = hostname::get().map_err(ReportError::Hostname)?;
    Ok(name.to_string_lossy().into_owned())
}

/// Returns the first non-loopback IPv4 address bound to any interface, or an
/// empty string when there is none.
///
/// Interfaces are visited in the order the OS reports them, which is not
/// stable across platforms; on multi-homed hosts any qualifying address may win.
pub fn resolve_primary_ipv4() -> Result<String, ReportError> {
    let interfaces = local_ip_address::list_afinet_netifas()?;
    Ok(first_non_loopback_ipv4(&interfaces)
        .map(|ip| ip.to_string())
        .unwrap_or_default())
}

/// Picks the first IPv4, non-loopback address from an interface listing.
pub fn first_non_loopback_ipv4(interfaces: &[(String, IpAddr)]) -> Option<IpAddr> {
    interfaces
        .iter()
        .map(|(_, ip)| *ip)
        .find(|ip| ip.is_ipv4() && !ip.is_loopback())
}

/// Reads the deployment namespace from `path`.
///
/// A path that cannot be stat'ed counts as absent and yields an empty string.
/// Once the file is known to exist, open and read failures are errors. Lines
/// are joined with no separator.
pub async fn resolve_namespace(path: impl AsRef<Path>) -> Result<String, ReportError> {
    let path = path.as_ref();
    if tokio::fs::metadata(path).await.is_err() {
        return Ok(String::new());
    }

    let to_error = |source| ReportError::Namespace {
        path: path.display().to_string(),
        source,
    };

    let file = File::open(path).await.map_err(to_error)?;
    let mut lines = BufReader::new(file).lines();
    let mut namespace = String::new();
    while let Some(line) = lines.next_line().await.map_err(to_error)? {
        namespace.push_str(&line);
    }
    Ok(namespace)
}
