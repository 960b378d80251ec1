//! # Spec Validator
//!
//! Minimal acceptance check run on every document before anything is
//! generated. Only two things are required:
//!
//! - the **first** `servers` entry has an `http://` or `https://` URL (it is
//!   the default backend target; later entries are not scheme-checked)
//! - `info.version` is present and non-empty
//!
//! The first violation aborts the run.

use crate::error::{GenError, Result};
use crate::spec::SpecDocument;
use tracing::debug;

const ACCEPTED_SCHEMES: [&str; 2] = ["http://", "https://"];

pub fn validate(doc: &SpecDocument) -> Result<()> {
    debug!(file = %doc.filename, "Verifying server");
    let Some(server) = doc.servers.first() else {
        return Err(GenError::invalid(&doc.filename, "no servers defined"));
    };
    if !ACCEPTED_SCHEMES
        .iter()
        .any(|scheme| server.url.starts_with(scheme))
    {
        return Err(GenError::invalid(
            &doc.filename,
            format!(
                "invalid server url {:?}: must start with http:// or https://",
                server.url
            ),
        ));
    }

    debug!(file = %doc.filename, "Verifying version");
    if doc.version().is_none() {
        return Err(GenError::invalid(&doc.filename, "info.version is missing"));
    }
    Ok(())
}
