//! Error taxonomy for a generator run.
//!
//! Every failure aborts the whole run. Spec-level problems surface as
//! [`GenError::InvalidSpecification`] naming the offending file, so the CLI
//! can print one readable line instead of a backtrace.

use std::path::{Path, PathBuf};

/// Errors produced while turning OpenAPI documents into a KrakenD bundle
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// The input directory holds no OpenAPI documents
    #[error("no OpenAPI documents found in {}", dir.display())]
    NoInputFilesFound {
        /// Directory that was scanned
        dir: PathBuf,
    },

    /// A document failed validation, naming, or header resolution
    #[error("{file}: {reason}")]
    InvalidSpecification {
        /// Document filename (not the full path)
        file: String,
        /// The violated rule
        reason: String,
    },

    /// An override file under `config/` could not be used
    #[error("{file}: invalid override configuration: {reason}")]
    InvalidOverride {
        /// Override filename
        file: String,
        /// Why it was rejected
        reason: String,
    },

    /// Filesystem failure while reading input or writing output
    #[error("{}: {source}", path.display())]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Template rendering failed
    #[error("template rendering failed: {0}")]
    Template(#[from] askama::Error),

    /// JSON serialization of generated output failed
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl GenError {
    pub fn invalid(file: impl Into<String>, reason: impl Into<String>) -> Self {
        GenError::InvalidSpecification {
            file: file.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: &Path, source: std::io::Error) -> Self {
        GenError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_specification_names_file() {
        let err = GenError::invalid("users.json", "no servers defined");
        assert_eq!(err.to_string(), "users.json: no servers defined");
    }

    #[test]
    fn test_no_input_files_names_directory() {
        let err = GenError::NoInputFilesFound {
            dir: PathBuf::from("specs"),
        };
        assert_eq!(err.to_string(), "no OpenAPI documents found in specs");
    }
}
