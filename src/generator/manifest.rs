//! Manifest Writer: the gateway's top-level `krakend.json`, the
//! `service.json` backend map and the Dockerfile.

use super::registry::ServiceRegistry;
use super::templates::{render_dockerfile, to_pretty_json, DISPATCHER_TEMPLATE};
use crate::config::{ManifestOverrides, OverrideConfig};
use crate::error::{GenError, Result};
use crate::spec::SpecDocument;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

/// Placeholder serialized in place of the dispatcher reference
const ENDPOINTS_SENTINEL: &str = "__krakend_gen_endpoints__";

/// `extra_config` namespace of the OpenCensus telemetry component
pub const OPENCENSUS_NAMESPACE: &str = "telemetry/opencensus";

/// The raw `endpoints` value: the dispatcher invoked with the `service` settings
pub fn endpoints_reference() -> String {
    format!("[{{{{template \"{DISPATCHER_TEMPLATE}\" .service}}}}]")
}

#[derive(Serialize)]
struct Manifest<'a> {
    #[serde(flatten)]
    settings: &'a ManifestOverrides,
    endpoints: &'static str,
}

/// Manifest-level run options
#[derive(Debug, Clone, Default)]
pub struct ManifestOptions {
    /// Replaces the manifest `name`
    pub name: Option<String>,
    /// Enables the Stackdriver exporter for this Google Cloud project
    pub stackdriver_project_id: Option<String>,
}

/// Rendered contents of every run-level artifact
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestBundle {
    pub manifest: String,
    pub service_map: String,
    pub dockerfile: String,
}

/// Pick the backend URL for a document
///
/// With a selector, the first server whose `description` equals it wins.
/// Otherwise, or when nothing matches, the first server is used; an
/// unmatched selector is logged but never fails the run.
pub fn select_backend_url<'a>(doc: &'a SpecDocument, environment: Option<&str>) -> Result<&'a str> {
    let first = doc
        .servers
        .first()
        .ok_or_else(|| GenError::invalid(&doc.filename, "no servers defined"))?;

    let Some(env) = environment else {
        return Ok(&first.url);
    };
    match doc
        .servers
        .iter()
        .find(|s| s.description.as_deref() == Some(env))
    {
        Some(server) => {
            debug!(file = %doc.filename, env, url = %server.url, "Selected server by environment");
            Ok(&server.url)
        }
        None => {
            warn!(
                file = %doc.filename,
                env,
                fallback = %first.url,
                "No server matches environment, using the first server"
            );
            Ok(&first.url)
        }
    }
}

fn stackdriver_config(project_id: &str) -> Value {
    json!({
        "sample_rate": 100,
        "reporting_period": 60,
        "enabled_layers": {
            "backend": true,
            "router": true,
            "pipe": true
        },
        "exporters": {
            "stackdriver": {
                "project_id": project_id,
                "metric_prefix": "krakend",
                "default_labels": {
                    "env": "production"
                }
            }
        }
    })
}

/// Render `krakend.json` from the merged settings
pub fn render_manifest(overrides: &ManifestOverrides, options: &ManifestOptions) -> Result<String> {
    let mut settings = overrides.clone();
    if let Some(name) = &options.name {
        settings.name = Some(name.clone());
    }
    if let Some(project_id) = &options.stackdriver_project_id {
        debug!(project_id = %project_id, "Adding stackdriver configuration");
        settings
            .extra_config
            .get_or_insert_with(Map::new)
            .insert(OPENCENSUS_NAMESPACE.to_string(), stackdriver_config(project_id));
    }

    let rendered = to_pretty_json(&Manifest {
        settings: &settings,
        endpoints: ENDPOINTS_SENTINEL,
    })?;
    Ok(rendered.replace(&format!("\"{ENDPOINTS_SENTINEL}\""), &endpoints_reference()))
}

/// Render every run-level artifact
pub fn write(
    config: &OverrideConfig,
    registry: &ServiceRegistry,
    options: &ManifestOptions,
) -> Result<ManifestBundle> {
    let dockerfile = match &config.dockerfile {
        Some(custom) => {
            debug!("Using custom Dockerfile");
            custom.clone()
        }
        None => render_dockerfile()?,
    };
    Ok(ManifestBundle {
        manifest: render_manifest(&config.manifest, options)?,
        service_map: to_pretty_json(registry.backends())?,
        dockerfile,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::naming::resolve;
    use crate::spec::parse_document;

    fn doc() -> SpecDocument {
        parse_document(
            "BET.json",
            r#"{
                "info": {"version": "1.0"},
                "servers": [
                    {"url": "https://dev.bet", "description": "dev"},
                    {"url": "https://prod.bet", "description": "prod"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_select_backend_url() {
        let doc = doc();
        assert_eq!(select_backend_url(&doc, None).unwrap(), "https://dev.bet");
        assert_eq!(select_backend_url(&doc, Some("prod")).unwrap(), "https://prod.bet");
        assert_eq!(select_backend_url(&doc, Some("staging")).unwrap(), "https://dev.bet");
    }

    #[test]
    fn test_manifest_endpoints_unquoted() {
        let config = OverrideConfig::builtin().unwrap();
        let manifest = render_manifest(&config.manifest, &ManifestOptions::default()).unwrap();
        assert!(manifest.contains("\"endpoints\": [{{template \"Endpoints\" .service}}]"));
        assert!(!manifest.contains(ENDPOINTS_SENTINEL));
        assert!(manifest.contains("\"name\": \"KrakenD API Gateway\""));
        assert!(manifest.starts_with("{\n    \"version\": 3"));
    }

    #[test]
    fn test_manifest_name_and_stackdriver() {
        let config = OverrideConfig::builtin().unwrap();
        let options = ManifestOptions {
            name: Some("Betting Gateway".to_string()),
            stackdriver_project_id: Some("bet-prod".to_string()),
        };
        let manifest = render_manifest(&config.manifest, &options).unwrap();
        let parsable = manifest.replace(&endpoints_reference(), "[]");
        let value: Value = serde_json::from_str(&parsable).unwrap();

        assert_eq!(value["name"], "Betting Gateway");
        let opencensus = &value["extra_config"][OPENCENSUS_NAMESPACE];
        assert_eq!(opencensus["exporters"]["stackdriver"]["project_id"], "bet-prod");
        assert_eq!(opencensus["sample_rate"], 100);
        assert!(value["extra_config"]["security/cors"].is_object());
    }

    #[test]
    fn test_stackdriver_without_extra_config() {
        let overrides = ManifestOverrides {
            version: Some(3),
            ..ManifestOverrides::default()
        };
        let options = ManifestOptions {
            name: None,
            stackdriver_project_id: Some("p".to_string()),
        };
        let manifest = render_manifest(&overrides, &options).unwrap();
        assert!(manifest.contains(OPENCENSUS_NAMESPACE));
    }

    #[test]
    fn test_write_bundle() {
        let mut registry = ServiceRegistry::new();
        registry
            .claim(&resolve("BET", true, "1.0"), "BET.json", "https://dev.bet")
            .unwrap();
        let mut config = OverrideConfig::builtin().unwrap();

        let bundle = write(&config, &registry, &ManifestOptions::default()).unwrap();
        assert_eq!(bundle.service_map, "{\n    \"BETV1\": \"https://dev.bet\"\n}");
        assert!(bundle.dockerfile.starts_with("FROM devopsfaith/krakend"));

        config.dockerfile = Some("FROM scratch\n".to_string());
        let bundle = write(&config, &registry, &ManifestOptions::default()).unwrap();
        assert_eq!(bundle.dockerfile, "FROM scratch\n");
    }
}
