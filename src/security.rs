//! # Security Module
//!
//! Maps the security requirements of an operation to the inbound header
//! names KrakenD must forward to the backend (`input_headers`).
//!
//! ## Scheme mapping
//!
//! | Scheme                                  | Header            |
//! |-----------------------------------------|-------------------|
//! | `http` (any `scheme`)                   | `Authorization`   |
//! | `apiKey` with `in: header`              | the declared name |
//! | `oauth2` declaring an `implicit` flow   | `Authorization`   |
//! | anything else                           | unsupported       |
//!
//! ## Header list
//!
//! 1. One header per referenced scheme, in requirement order. A header
//!    produced twice on the same operation is a conflict.
//! 2. Every parameter with `in: header`, appended without duplicate checks.
//! 3. `Content-Type`, always last.
//!
//! Scheme names are deduplicated across requirements before mapping, and
//! header names compare case-insensitively. An unsupported scheme is skipped
//! when another referenced scheme yields a header; if none does, the
//! operation is rejected so ambiguous auth never silently passes through.

use crate::spec::{ApiKeyLocation, Operation, SecurityScheme};
use std::collections::HashMap;
use tracing::debug;

/// Header forwarded on every route regardless of security
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";

const AUTHORIZATION_HEADER: &str = "Authorization";

/// Why an operation's security could not be turned into headers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SecurityError {
    #[error("security scheme {0:?} is not declared in components.securitySchemes")]
    UnknownScheme(String),
    #[error("security scheme {scheme:?} maps to header {header:?} which an earlier scheme already requires")]
    DuplicateHeader { scheme: String, header: String },
    #[error("security scheme {0:?} cannot be mapped to a header and no other referenced scheme can")]
    UnsupportedScheme(String),
}

/// The inbound header a scheme maps to, or `None` when unsupported
pub fn header_for_scheme(scheme: &SecurityScheme) -> Option<&str> {
    match scheme {
        SecurityScheme::Http { .. } => Some(AUTHORIZATION_HEADER),
        SecurityScheme::ApiKey {
            name,
            location: ApiKeyLocation::Header,
        } => Some(name.as_str()),
        SecurityScheme::ApiKey { .. } => None,
        SecurityScheme::OAuth2 { flows } if flows.implicit.is_some() => Some(AUTHORIZATION_HEADER),
        SecurityScheme::OAuth2 { .. } => None,
        SecurityScheme::OpenIdConnect { .. } => None,
        SecurityScheme::Unsupported => None,
    }
}

/// Resolve the ordered header list for one operation
///
/// # Errors
///
/// - [`SecurityError::UnknownScheme`] if a referenced scheme is not declared
/// - [`SecurityError::DuplicateHeader`] if two schemes produce the same header
/// - [`SecurityError::UnsupportedScheme`] if security is required but no referenced scheme maps to a header
pub fn headers_for(
    operation: &Operation,
    schemes: &HashMap<String, SecurityScheme>,
) -> Result<Vec<String>, SecurityError> {
    let mut headers: Vec<String> = Vec::new();

    let requirements = operation.security.as_deref().unwrap_or_default();
    let mut referenced: Vec<&str> = Vec::new();
    for name in requirements.iter().flat_map(|r| r.scheme_names()) {
        if !referenced.contains(&name) {
            referenced.push(name);
        }
    }

    let mut first_unsupported: Option<&str> = None;
    for name in &referenced {
        let scheme = schemes
            .get(*name)
            .ok_or_else(|| SecurityError::UnknownScheme(name.to_string()))?;
        match header_for_scheme(scheme) {
            Some(header) => {
                if headers.iter().any(|h| h.eq_ignore_ascii_case(header)) {
                    return Err(SecurityError::DuplicateHeader {
                        scheme: name.to_string(),
                        header: header.to_string(),
                    });
                }
                debug!(scheme = %name, header = %header, "Adding security header");
                headers.push(header.to_string());
            }
            None => {
                debug!(scheme = %name, "Skipping security scheme without header mapping");
                first_unsupported = first_unsupported.or(Some(*name));
            }
        }
    }
    if let Some(name) = first_unsupported.filter(|_| headers.is_empty()) {
        return Err(SecurityError::UnsupportedScheme(name.to_string()));
    }

    for name in operation.header_parameters() {
        debug!(header = %name, "Adding header parameter");
        headers.push(name.to_string());
    }

    headers.push(CONTENT_TYPE_HEADER.to_string());
    Ok(headers)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use serde_json::json;

    fn schemes(value: serde_json::Value) -> HashMap<String, SecurityScheme> {
        serde_json::from_value(value).unwrap()
    }

    fn operation(value: serde_json::Value) -> Operation {
        serde_json::from_value(value).unwrap()
    }

    fn all_schemes() -> HashMap<String, SecurityScheme> {
        schemes(json!({
            "bearer": { "type": "http", "scheme": "bearer" },
            "basic": { "type": "http", "scheme": "basic" },
            "key": { "type": "apiKey", "in": "header", "name": "X-Api-Key" },
            "queryKey": { "type": "apiKey", "in": "query", "name": "api_key" },
            "implicit": {
                "type": "oauth2",
                "flows": { "implicit": { "authorizationUrl": "https://auth", "scopes": {} } }
            },
            "machine": {
                "type": "oauth2",
                "flows": { "clientCredentials": { "tokenUrl": "https://auth", "scopes": {} } }
            }
        }))
    }

    fn resolve(op: serde_json::Value) -> Result<Vec<String>, SecurityError> {
        headers_for(&operation(op), &all_schemes())
    }

    #[test]
    fn test_scheme_mapping_table() {
        let s = all_schemes();
        assert_eq!(header_for_scheme(&s["bearer"]), Some("Authorization"));
        assert_eq!(header_for_scheme(&s["basic"]), Some("Authorization"));
        assert_eq!(header_for_scheme(&s["key"]), Some("X-Api-Key"));
        assert_eq!(header_for_scheme(&s["queryKey"]), None);
        assert_eq!(header_for_scheme(&s["implicit"]), Some("Authorization"));
        assert_eq!(header_for_scheme(&s["machine"]), None);
    }

    #[test]
    fn test_no_security_only_content_type() {
        assert_eq!(resolve(json!({})).unwrap(), vec!["Content-Type"]);
        assert_eq!(resolve(json!({ "security": null })).unwrap(), vec!["Content-Type"]);
        assert_eq!(resolve(json!({ "security": [{}] })).unwrap(), vec!["Content-Type"]);
    }

    #[test]
    fn test_bearer_requirement() {
        assert_eq!(
            resolve(json!({ "security": [{ "bearer": [] }] })).unwrap(),
            vec!["Authorization", "Content-Type"]
        );
    }

    #[test]
    fn test_security_then_parameters_then_content_type() {
        let headers = resolve(json!({
            "security": [{ "key": [] }],
            "parameters": [
                { "name": "user_id", "in": "header" },
                { "name": "page", "in": "query" },
                { "name": "X-Api-Key", "in": "header" }
            ]
        }))
        .unwrap();
        assert_eq!(headers, vec!["X-Api-Key", "user_id", "X-Api-Key", "Content-Type"]);
    }

    #[test]
    fn test_unknown_scheme_rejected() {
        assert_eq!(
            resolve(json!({ "security": [{ "missing": [] }] })).unwrap_err(),
            SecurityError::UnknownScheme("missing".to_string())
        );
    }

    #[test]
    fn test_duplicate_authorization_rejected() {
        let err = resolve(json!({ "security": [{ "bearer": [] }, { "implicit": [] }] })).unwrap_err();
        assert_eq!(
            err,
            SecurityError::DuplicateHeader {
                scheme: "implicit".to_string(),
                header: "Authorization".to_string(),
            }
        );
    }

    #[test]
    fn test_sole_unsupported_scheme_rejected() {
        assert_eq!(
            resolve(json!({ "security": [{ "machine": [] }] })).unwrap_err(),
            SecurityError::UnsupportedScheme("machine".to_string())
        );
    }

    #[test]
    fn test_repeated_unsupported_scheme_rejected() {
        assert_eq!(
            resolve(json!({ "security": [{ "machine": ["read"] }, { "machine": ["write"] }] }))
                .unwrap_err(),
            SecurityError::UnsupportedScheme("machine".to_string())
        );
    }

    #[test]
    fn test_only_unsupported_schemes_rejected() {
        assert_eq!(
            resolve(json!({ "security": [{ "machine": [] }, { "queryKey": [] }] })).unwrap_err(),
            SecurityError::UnsupportedScheme("machine".to_string())
        );
    }

    #[test]
    fn test_repeated_supported_scheme_adds_one_header() {
        assert_eq!(
            resolve(json!({ "security": [{ "bearer": ["read"] }, { "bearer": ["write"] }] })).unwrap(),
            vec!["Authorization", "Content-Type"]
        );
    }

    #[test]
    fn test_duplicate_header_ignores_case() {
        let mut s = all_schemes();
        s.extend(schemes(json!({
            "lowerAuth": { "type": "apiKey", "in": "header", "name": "authorization" }
        })));
        let op = operation(json!({ "security": [{ "bearer": [] }, { "lowerAuth": [] }] }));
        assert_eq!(
            headers_for(&op, &s).unwrap_err(),
            SecurityError::DuplicateHeader {
                scheme: "lowerAuth".to_string(),
                header: "authorization".to_string(),
            }
        );
    }

    #[test]
    fn test_unsupported_scheme_skipped_alongside_others() {
        assert_eq!(
            resolve(json!({ "security": [{ "machine": [] }, { "key": [] }] })).unwrap(),
            vec!["X-Api-Key", "Content-Type"]
        );
    }
}
