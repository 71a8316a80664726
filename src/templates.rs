use serde::Serialize;
use tera::Tera;

use crate::error::ReportError;

/// Name the report template is registered under.
///
/// The `.txt` suffix keeps Tera's autoescaping off; values are written verbatim.
pub const REPORT_TEMPLATE_NAME: &str = "podinfo.txt";

/// Report layout. The `{%-` tags eat the newline before them so that the
/// Namespace line disappears completely when the namespace is empty.
pub const REPORT_TEMPLATE: &str = "
Hostname: {{ hostname }}
IP: {{ ip }}
{%- if namespace %}
Namespace: {{ namespace }}
{%- endif %}
URI: {{ uri }}
Method: {{ method }}
RemoteAddr: {{ remote_addr }}
";

/// Everything a single report shows. Built fresh for every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PodInfo {
    pub hostname: String,
    pub ip: String,
    pub namespace: String,
    pub uri: String,
    pub method: String,
    pub remote_addr: String,
}

/// Initialize the Tera template engine
pub fn init_templates() -> Result<Tera, ReportError> {
    let mut tera = Tera::default();
    tera.add_raw_template(REPORT_TEMPLATE_NAME, REPORT_TEMPLATE)?;
    Ok(tera)
}

/// Render `info` into the plain text report body.
pub fn render(tera: &Tera, info: &PodInfo) -> Result<String, ReportError> {
    let context = tera::Context::from_serialize(info)?;
    Ok(tera.render(REPORT_TEMPLATE_NAME, &context)?)
}
