use askama::Template;
use serde::Serialize;

use super::endpoint::RouteRecord;
use crate::error::Result;
use crate::naming::ServiceIdentity;

/// Name of the top-level dispatcher template
pub const DISPATCHER_TEMPLATE: &str = "Endpoints";

/// Base image of the built-in Dockerfile
pub const KRAKEND_IMAGE: &str = "devopsfaith/krakend:2.1.2";

/// Per-service fragment: binds `$host` and `$prefix`, then the route array body
#[derive(Template)]
#[template(path = "service.tmpl", syntax = "gotmpl", escape = "none")]
pub struct ServiceTemplateData<'a> {
    /// Template name, also the `service.json` key
    pub service_name: &'a str,
    /// Public prefix bound to `$prefix`
    pub path_prefix: &'a str,
    /// Comma-separated route records
    pub routes: String,
}

/// Dispatcher fragment invoking every service fragment with its settings entry
#[derive(Template)]
#[template(path = "Endpoints.tmpl", syntax = "gotmpl", escape = "none")]
pub struct DispatcherTemplateData<'a> {
    pub name: &'a str,
    /// Comma-separated `{{template ...}}` lines
    pub invocations: String,
}

/// Built-in Dockerfile used when no override is supplied
#[derive(Template)]
#[template(path = "Dockerfile.txt", syntax = "gotmpl", escape = "none")]
pub struct DockerfileTemplateData<'a> {
    pub image: &'a str,
}

/// Serialize with the 4-space indent used for every generated JSON artifact
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Body of a JSON array: each record serialized whole, joined by `,\n`
///
/// Records are serialized individually rather than as one array so the
/// fragments can be spliced into the manifest's `endpoints` array.
pub fn array_body(records: &[RouteRecord]) -> Result<String> {
    let rendered = records
        .iter()
        .map(to_pretty_json)
        .collect::<Result<Vec<_>>>()?;
    Ok(rendered.join(",\n"))
}

/// Assemble the named fragment for one service
pub fn assemble(identity: &ServiceIdentity, records: &[RouteRecord]) -> Result<String> {
    let rendered = ServiceTemplateData {
        service_name: &identity.service_name,
        path_prefix: &identity.path_prefix,
        routes: array_body(records)?,
    }
    .render()?;
    Ok(rendered)
}

/// Go template expression selecting a service's entry from `$service`
fn settings_lookup(service_name: &str) -> String {
    let is_identifier = service_name
        .chars()
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false)
        && service_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if is_identifier {
        format!("$service.{service_name}")
    } else {
        format!("(index $service {service_name:?})")
    }
}

/// Assemble the dispatcher fragment, one invocation per service in order
pub fn assemble_dispatcher<S: AsRef<str>>(service_names: &[S]) -> Result<String> {
    let invocations = service_names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            format!("{{{{template {name:?} {}}}}}", settings_lookup(name))
        })
        .collect::<Vec<_>>()
        .join(",\n");
    let rendered = DispatcherTemplateData {
        name: DISPATCHER_TEMPLATE,
        invocations,
    }
    .render()?;
    Ok(rendered)
}

pub fn render_dockerfile() -> Result<String> {
    Ok(DockerfileTemplateData {
        image: KRAKEND_IMAGE,
    }
    .render()?)
}
