//! # Name Resolver
//!
//! Derives the service identity for a document: the uppercase service name
//! used for template names and the `service.json` key, and the lowercase
//! public path prefix. Both are rendered from the same `(base, version)`
//! pair so they can never drift apart.
//!
//! ## Versioning policy
//!
//! | filename           | spec version | versioning | prefix         | service name |
//! |--------------------|--------------|------------|----------------|--------------|
//! | `OPENAPI.json`     | `1.0`        | on         | `/openapi/v1`  | `OPENAPIV1`  |
//! | `OPENAPI.json`     | `1.0`        | off        | `/openapi`     | `OPENAPI`    |
//! | `OPENAPI.V1.json`  | `2.0`        | on         | `/openapi/v2`  | `OPENAPIV2`  |
//! | `OPENAPI.V1.json`  | `2.0`        | off        | `/openapi/v1`  | `OPENAPIV1`  |
//!
//! With versioning on, the version token comes from the first character of
//! `info.version`, so a spec bump overrides a filename that was never renamed.
//! With versioning off, a `.v<digits>` suffix in the filename is kept verbatim.

use once_cell::sync::Lazy;
use regex::Regex;

static FILENAME_VERSION: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"(?i)^(?P<base>.+)\.v(?P<version>\d+)$").expect("valid filename version regex")
});

/// Canonical identity of one document within a run
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceIdentity {
    /// Uppercase identifier, e.g. `OPENAPIV1`
    pub service_name: String,
    /// Lowercase public prefix, e.g. `/openapi/v1`
    pub path_prefix: String,
    /// Version digits without the `v`, if any
    pub version: Option<String>,
}

impl ServiceIdentity {
    fn render(base: &str, version: Option<String>) -> Self {
        let token = version.as_ref().map(|v| format!("V{v}"));
        let service_name = match &token {
            Some(t) => format!("{base}{t}"),
            None => base.to_string(),
        }
        .to_uppercase();
        let path_prefix = match &token {
            Some(t) => format!("/{base}/{t}"),
            None => format!("/{base}"),
        }
        .to_lowercase();
        ServiceIdentity {
            service_name,
            path_prefix,
            version,
        }
    }
}

/// Split a filename stem into its base and an embedded `.v<digits>` version
pub fn split_filename_version(stem: &str) -> (&str, Option<&str>) {
    match FILENAME_VERSION.captures(stem) {
        Some(caps) => match (caps.name("base"), caps.name("version")) {
            (Some(base), Some(version)) => (base.as_str(), Some(version.as_str())),
            _ => (stem, None),
        },
        None => (stem, None),
    }
}

/// Resolve the identity of a document from its filename stem
///
/// `stem` is the filename without its extension. `spec_version` is the
/// document's `info.version`; only its first character is used.
pub fn resolve(stem: &str, versioning_enabled: bool, spec_version: &str) -> ServiceIdentity {
    let (base, filename_version) = split_filename_version(stem);
    let spec_token = spec_version.trim().chars().next().map(String::from);

    match (filename_version, versioning_enabled) {
        (_, true) => ServiceIdentity::render(base, spec_token),
        (Some(v), false) => ServiceIdentity::render(base, Some(v.to_string())),
        (None, false) => ServiceIdentity::render(stem, None),
    }
}
