use super::types::{Info, Operation, OperationEntry, SecurityScheme, Server, SpecDocument, HTTP_METHODS};
use crate::error::{GenError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

const DOCUMENT_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    servers: Vec<Server>,
    #[serde(default)]
    info: Info,
    #[serde(default)]
    paths: Map<String, Value>,
    #[serde(default)]
    components: Option<RawComponents>,
}

#[derive(Debug, Default, Deserialize)]
struct RawComponents {
    #[serde(rename = "securitySchemes", default)]
    security_schemes: Map<String, Value>,
}

fn is_yaml(filename: &str) -> bool {
    filename.ends_with(".yaml") || filename.ends_with(".yml")
}

/// Strip a recognised document extension; other names are returned unchanged
pub fn strip_document_extension(filename: &str) -> &str {
    DOCUMENT_EXTENSIONS
        .iter()
        .find_map(|ext| {
            filename
                .strip_suffix(ext)
                .and_then(|rest| rest.strip_suffix('.'))
        })
        .unwrap_or(filename)
}

/// List the OpenAPI documents directly inside `dir`, sorted by filename
///
/// Sorting makes the dispatcher fragment independent of filesystem listing
/// order. Subdirectories (including `config/`) are not searched.
pub fn discover_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(GenError::NoInputFilesFound {
                dir: dir.to_path_buf(),
            })
        }
        Err(e) => return Err(GenError::io(dir, e)),
    };

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| GenError::io(dir, e))?.path();
        let recognised = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| DOCUMENT_EXTENSIONS.contains(&ext))
            .unwrap_or(false);
        if recognised && path.is_file() {
            paths.push(path);
        }
    }

    if paths.is_empty() {
        return Err(GenError::NoInputFilesFound {
            dir: dir.to_path_buf(),
        });
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

/// Parse a document from its text; `filename` picks the format and keys errors
pub fn parse_document(filename: &str, content: &str) -> Result<SpecDocument> {
    let malformed = |e: &dyn std::fmt::Display| {
        GenError::invalid(filename, format!("malformed document: {e}"))
    };

    let value: Value = if is_yaml(filename) {
        serde_yaml::from_str(content).map_err(|e| malformed(&e))?
    } else {
        serde_json::from_str(content).map_err(|e| malformed(&e))?
    };
    let raw: RawDocument = serde_json::from_value(value).map_err(|e| malformed(&e))?;

    let mut operations = Vec::new();
    for (path, item) in raw.paths {
        let Value::Object(item) = item else {
            return Err(GenError::invalid(
                filename,
                format!("path item {path} is not an object"),
            ));
        };
        for (method, operation) in item {
            if !HTTP_METHODS.contains(&method.to_ascii_lowercase().as_str()) {
                debug!(file = filename, path = %path, key = %method, "Skipping non-operation key");
                continue;
            }
            let operation: Operation = serde_json::from_value(operation).map_err(|e| {
                GenError::invalid(filename, format!("{path} {method}: malformed operation: {e}"))
            })?;
            operations.push(OperationEntry {
                path: path.clone(),
                method,
                operation,
            });
        }
    }

    let mut security_schemes = HashMap::new();
    for (name, scheme) in raw.components.unwrap_or_default().security_schemes {
        // an unreadable scheme only matters once an operation depends on it
        let scheme = serde_json::from_value(scheme).unwrap_or_else(|e| {
            debug!(file = filename, scheme = %name, error = %e, "Unrecognised security scheme");
            SecurityScheme::Unsupported
        });
        security_schemes.insert(name, scheme);
    }

    Ok(SpecDocument {
        filename: filename.to_string(),
        servers: raw.servers,
        info: raw.info,
        operations,
        security_schemes,
    })
}

pub fn load_document(path: &Path) -> Result<SpecDocument> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| GenError::invalid(path.display().to_string(), "filename is not valid UTF-8"))?;
    let content = std::fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
    debug!(file = filename, "Loaded document");
    parse_document(filename, &content)
}

/// Discover and parse every document in `dir`, in sorted filename order
pub fn load_documents(dir: &Path) -> Result<Vec<SpecDocument>> {
    discover_documents(dir)?
        .iter()
        .map(|path| load_document(path))
        .collect()
}
