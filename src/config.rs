//! # Override Configuration
//!
//! Optional files under `<input>/config/` that tune the generated output:
//!
//! | File            | Applies to                         |
//! |-----------------|------------------------------------|
//! | `endpoint.json` | every route record (top level)     |
//! | `backend.json`  | the single backend of every route  |
//! | `krakend.json`  | the top-level gateway manifest     |
//! | `Dockerfile`    | copied verbatim to the output root |
//!
//! A missing file falls back to the built-in default shipped with the
//! binary. Only the keys enumerated on each struct are accepted; anything
//! else is rejected so overrides cannot inject arbitrary structure. Merging
//! is shallow: an override key replaces the whole base value at that key.

use crate::error::{GenError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info};

pub const CONFIG_DIR: &str = "config";
pub const ENDPOINT_FILE: &str = "endpoint.json";
pub const BACKEND_FILE: &str = "backend.json";
pub const MANIFEST_FILE: &str = "krakend.json";
pub const DOCKERFILE: &str = "Dockerfile";

const DEFAULT_ENDPOINT: &str = include_str!("defaults/endpoint.json");
const DEFAULT_BACKEND: &str = include_str!("defaults/backend.json");
const DEFAULT_MANIFEST: &str = include_str!("defaults/krakend.json");

/// Endpoint-level keys an override may set
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointOverrides {
    pub output_encoding: Option<String>,
    pub timeout: Option<String>,
    pub cache_ttl: Option<String>,
    pub concurrent_calls: Option<u32>,
    pub input_query_strings: Option<Vec<String>>,
    pub input_headers: Option<Vec<String>>,
    pub extra_config: Option<Map<String, Value>>,
}

/// Backend-level keys an override may set
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendOverrides {
    pub encoding: Option<String>,
    pub disable_host_sanitize: Option<bool>,
    pub sd: Option<String>,
    pub is_collection: Option<bool>,
    pub target: Option<String>,
    pub group: Option<String>,
    pub allow: Option<Vec<String>>,
    pub deny: Option<Vec<String>>,
    pub mapping: Option<Map<String, Value>>,
    pub extra_config: Option<Map<String, Value>>,
}

/// Top-level manifest keys an override may set
///
/// `endpoints` is deliberately absent: it always points at the dispatcher
/// template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestOverrides {
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_header_timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_rest: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_endpoint: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub echo_endpoint: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_config: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub async_agent: Option<Value>,
}

/// All override inputs for a run, loaded once before any output is written
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideConfig {
    pub endpoint: EndpointOverrides,
    pub backend: BackendOverrides,
    pub manifest: ManifestOverrides,
    /// Custom Dockerfile contents; `None` means render the built-in one
    pub dockerfile: Option<String>,
}

impl OverrideConfig {
    /// Built-in defaults only
    pub fn builtin() -> Result<Self> {
        Ok(OverrideConfig {
            endpoint: parse_override(ENDPOINT_FILE, DEFAULT_ENDPOINT)?,
            backend: parse_override(BACKEND_FILE, DEFAULT_BACKEND)?,
            manifest: parse_override(MANIFEST_FILE, DEFAULT_MANIFEST)?,
            dockerfile: None,
        })
    }

    /// Load overrides from `<input_dir>/config/`, falling back per file
    pub fn load(input_dir: &Path) -> Result<Self> {
        let config_dir = input_dir.join(CONFIG_DIR);
        Ok(OverrideConfig {
            endpoint: load_override(&config_dir, ENDPOINT_FILE, DEFAULT_ENDPOINT)?,
            backend: load_override(&config_dir, BACKEND_FILE, DEFAULT_BACKEND)?,
            manifest: load_override(&config_dir, MANIFEST_FILE, DEFAULT_MANIFEST)?,
            dockerfile: read_optional(&config_dir.join(DOCKERFILE))?,
        })
    }
}

fn parse_override<T: DeserializeOwned>(file: &str, content: &str) -> Result<T> {
    serde_json::from_str(content).map_err(|e| GenError::InvalidOverride {
        file: file.to_string(),
        reason: e.to_string(),
    })
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(GenError::io(path, e)),
    }
}

fn load_override<T: DeserializeOwned>(config_dir: &Path, file: &str, builtin: &str) -> Result<T> {
    match read_optional(&config_dir.join(file))? {
        Some(content) => {
            info!(file, "Using override configuration");
            parse_override(file, &content)
        }
        None => {
            debug!(file, "No override found, using built-in default");
            parse_override(file, builtin)
        }
    }
}
