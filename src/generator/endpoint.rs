//! Endpoint formatting: one KrakenD route record per (path, method).

use crate::config::{BackendOverrides, EndpointOverrides};
use crate::security::{headers_for, SecurityError};
use crate::spec::{Operation, SecurityScheme};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Go template variable holding the service path prefix
pub const PREFIX_PLACEHOLDER: &str = "{{ $prefix }}";
/// Go template variable holding the backend host, resolved by KrakenD at startup
pub const HOST_PLACEHOLDER: &str = "{{ $host }}";

/// A KrakenD endpoint entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteRecord {
    /// Public path, prefixed by [`PREFIX_PLACEHOLDER`]
    pub endpoint: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrent_calls: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_query_strings: Option<Vec<String>>,
    pub backend: Vec<BackendRecord>,
    pub input_headers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_config: Option<Map<String, Value>>,
}

/// The backend a route forwards to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendRecord {
    pub url_pattern: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    pub method: String,
    pub host: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_host_sanitize: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_collection: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deny: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_config: Option<Map<String, Value>>,
}

impl BackendRecord {
    fn new(path: &str, method: &str) -> Self {
        BackendRecord {
            url_pattern: path.to_string(),
            encoding: None,
            method: method.to_string(),
            host: vec![HOST_PLACEHOLDER.to_string()],
            disable_host_sanitize: None,
            sd: None,
            is_collection: None,
            target: None,
            group: None,
            allow: None,
            deny: None,
            mapping: None,
            extra_config: None,
        }
    }

    /// Shallow merge: every key the override sets replaces the base value
    pub fn apply(&mut self, overrides: &BackendOverrides) {
        if overrides.encoding.is_some() {
            self.encoding.clone_from(&overrides.encoding);
        }
        if overrides.disable_host_sanitize.is_some() {
            self.disable_host_sanitize.clone_from(&overrides.disable_host_sanitize);
        }
        if overrides.sd.is_some() {
            self.sd.clone_from(&overrides.sd);
        }
        if overrides.is_collection.is_some() {
            self.is_collection.clone_from(&overrides.is_collection);
        }
        if overrides.target.is_some() {
            self.target.clone_from(&overrides.target);
        }
        if overrides.group.is_some() {
            self.group.clone_from(&overrides.group);
        }
        if overrides.allow.is_some() {
            self.allow.clone_from(&overrides.allow);
        }
        if overrides.deny.is_some() {
            self.deny.clone_from(&overrides.deny);
        }
        if overrides.mapping.is_some() {
            self.mapping.clone_from(&overrides.mapping);
        }
        if overrides.extra_config.is_some() {
            self.extra_config.clone_from(&overrides.extra_config);
        }
    }
}

impl RouteRecord {
    /// Base record before overrides
    pub fn new(path: &str, method: &str, input_headers: Vec<String>) -> Self {
        let method = method.to_uppercase();
        RouteRecord {
            endpoint: format!("{PREFIX_PLACEHOLDER}{path}"),
            backend: vec![BackendRecord::new(path, &method)],
            method,
            output_encoding: None,
            timeout: None,
            cache_ttl: None,
            concurrent_calls: None,
            input_query_strings: None,
            input_headers,
            extra_config: None,
        }
    }

    /// Shallow merge: every key the override sets replaces the base value
    pub fn apply(&mut self, overrides: &EndpointOverrides) {
        if overrides.output_encoding.is_some() {
            self.output_encoding.clone_from(&overrides.output_encoding);
        }
        if overrides.timeout.is_some() {
            self.timeout.clone_from(&overrides.timeout);
        }
        if overrides.cache_ttl.is_some() {
            self.cache_ttl.clone_from(&overrides.cache_ttl);
        }
        if overrides.concurrent_calls.is_some() {
            self.concurrent_calls.clone_from(&overrides.concurrent_calls);
        }
        if overrides.input_query_strings.is_some() {
            self.input_query_strings.clone_from(&overrides.input_query_strings);
        }
        if let Some(headers) = &overrides.input_headers {
            self.input_headers.clone_from(headers);
        }
        if overrides.extra_config.is_some() {
            self.extra_config.clone_from(&overrides.extra_config);
        }
    }
}

/// Build the route record for one operation and merge the overrides into it
///
/// # Errors
///
/// Propagates [`SecurityError`] from header resolution.
pub fn format_endpoint(
    path: &str,
    method: &str,
    operation: &Operation,
    schemes: &HashMap<String, SecurityScheme>,
    endpoint_overrides: &EndpointOverrides,
    backend_overrides: &BackendOverrides,
) -> Result<RouteRecord, SecurityError> {
    let headers = headers_for(operation, schemes)?;
    let mut record = RouteRecord::new(path, method, headers);
    record.apply(endpoint_overrides);
    for backend in &mut record.backend {
        backend.apply(backend_overrides);
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::config::OverrideConfig;
    use serde_json::json;

    fn bearer_schemes() -> HashMap<String, SecurityScheme> {
        serde_json::from_value(json!({ "bearer": { "type": "http", "scheme": "bearer" } })).unwrap()
    }

    #[test]
    fn test_base_record_shape() {
        let op: Operation = serde_json::from_value(json!({ "security": [{ "bearer": [] }] })).unwrap();
        let record = format_endpoint(
            "/bet/{season}/{race}",
            "get",
            &op,
            &bearer_schemes(),
            &EndpointOverrides::default(),
            &BackendOverrides::default(),
        )
        .unwrap();

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "endpoint": "{{ $prefix }}/bet/{season}/{race}",
                "method": "GET",
                "backend": [{
                    "url_pattern": "/bet/{season}/{race}",
                    "method": "GET",
                    "host": ["{{ $host }}"]
                }],
                "input_headers": ["Authorization", "Content-Type"]
            })
        );
    }

    #[test]
    fn test_builtin_overrides_applied() {
        let config = OverrideConfig::builtin().unwrap();
        let record = format_endpoint(
            "/users",
            "post",
            &Operation::default(),
            &HashMap::new(),
            &config.endpoint,
            &config.backend,
        )
        .unwrap();

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["output_encoding"], "no-op");
        assert_eq!(value["timeout"], "3600s");
        assert_eq!(value["input_query_strings"], json!([]));
        assert_eq!(value["backend"][0]["encoding"], "no-op");
        assert_eq!(value["backend"][0]["disable_host_sanitize"], false);
        assert_eq!(value["backend"][0]["method"], "POST");
    }

    #[test]
    fn test_override_replaces_whole_value() {
        let mut record = RouteRecord::new("/a", "get", vec!["Content-Type".to_string()]);
        record.extra_config = Some(
            json!({ "qos/ratelimit/router": { "max_rate": 5 }, "auth/validator": {} })
                .as_object()
                .cloned()
                .unwrap(),
        );
        let overrides = EndpointOverrides {
            extra_config: json!({ "qos/ratelimit/router": { "every": "1m" } })
                .as_object()
                .cloned(),
            input_headers: Some(vec!["*".to_string()]),
            ..EndpointOverrides::default()
        };
        record.apply(&overrides);

        assert_eq!(
            serde_json::to_value(&record.extra_config).unwrap(),
            json!({ "qos/ratelimit/router": { "every": "1m" } })
        );
        assert_eq!(record.input_headers, vec!["*"]);
        assert_eq!(record.endpoint, "{{ $prefix }}/a");
    }

    #[test]
    fn test_backend_apply_keeps_unset_keys() {
        let mut backend = BackendRecord::new("/a", "GET");
        backend.sd = Some("dns".to_string());
        let overrides = BackendOverrides {
            encoding: Some("json".to_string()),
            allow: Some(vec!["id".to_string()]),
            ..BackendOverrides::default()
        };
        backend.apply(&overrides);
        backend.apply(&overrides);

        assert_eq!(backend.encoding.as_deref(), Some("json"));
        assert_eq!(backend.allow, Some(vec!["id".to_string()]));
        assert_eq!(backend.sd.as_deref(), Some("dns"));
        assert_eq!(backend.host, vec![HOST_PLACEHOLDER]);
        assert_eq!(overrides.encoding.as_deref(), Some("json"));
    }

    #[test]
    fn test_security_error_propagates() {
        let op: Operation = serde_json::from_value(json!({ "security": [{ "nope": [] }] })).unwrap();
        let err = format_endpoint(
            "/a",
            "get",
            &op,
            &HashMap::new(),
            &EndpointOverrides::default(),
            &BackendOverrides::default(),
        )
        .unwrap_err();
        assert_eq!(err, SecurityError::UnknownScheme("nope".to_string()));
    }
}
