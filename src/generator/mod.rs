//! # Generator Module
//!
//! Turns a directory of OpenAPI 3 documents into a KrakenD flexible
//! configuration bundle.
//!
//! ## Pipeline
//!
//! ```text
//! discover → load → validate → name → format → assemble → write
//! ```
//!
//! 1. **Load** - every `*.json` / `*.yaml` / `*.yml` document directly in the
//!    input directory, sorted by filename, plus the override files under
//!    `config/`
//! 2. **Validate + name** - each document must pass [`crate::validator`];
//!    its [`ServiceIdentity`] must not collide with an earlier document
//! 3. **Format** - one [`RouteRecord`] per (path, method) with the endpoint
//!    and backend overrides merged in
//! 4. **Assemble** - one named template per service, the `Endpoints`
//!    dispatcher, the manifest, the service map and the Dockerfile
//! 5. **Write** - only once everything above has succeeded, so a failing
//!    run leaves no partial bundle behind
//!
//! ## Usage
//!
//! ```rust,ignore
//! use krakend_gen::generator::{generate, GenerateOptions};
//!
//! let report = generate(&GenerateOptions::new("specs", "build"))?;
//! for service in &report.services {
//!     println!("{} -> {}", service.service_name, service.path_prefix);
//! }
//! ```

pub mod endpoint;
pub mod manifest;
pub mod project;
pub mod registry;
pub mod templates;

pub use endpoint::{format_endpoint, BackendRecord, RouteRecord};
pub use manifest::{select_backend_url, ManifestBundle, ManifestOptions};
pub use project::{write_bundle, BundlePlan, OutputLayout, ServiceFragment};
pub use registry::ServiceRegistry;
pub use templates::{assemble, assemble_dispatcher};

use crate::config::OverrideConfig;
use crate::error::{GenError, Result};
use crate::naming::{self, ServiceIdentity};
use crate::spec::{load_documents, SpecDocument};
use crate::validator::validate;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Options of one generator run
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Derive the version token from `info.version` instead of the filename
    pub versioning: bool,
    /// Server `description` to select each backend URL by
    pub environment: Option<String>,
    /// Gateway name written to the manifest
    pub name: Option<String>,
    /// Google Cloud project for the Stackdriver exporter
    pub stackdriver_project_id: Option<String>,
}

impl GenerateOptions {
    /// Defaults: versioning on, no environment, built-in name, no telemetry
    pub fn new(input_dir: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> Self {
        GenerateOptions {
            input_dir: input_dir.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
            versioning: true,
            environment: None,
            name: None,
            stackdriver_project_id: None,
        }
    }
}

/// What a run produced for one input document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSummary {
    pub file: String,
    pub service_name: String,
    pub path_prefix: String,
    pub backend_url: String,
    pub routes: usize,
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub output_dir: PathBuf,
    /// In processing order (sorted by filename)
    pub services: Vec<ServiceSummary>,
}

impl GenerationReport {
    pub fn total_routes(&self) -> usize {
        self.services.iter().map(|s| s.routes).sum()
    }
}

struct ResolvedDocument {
    doc: SpecDocument,
    identity: ServiceIdentity,
    backend_url: String,
}

/// Validate, name and claim every document before anything is formatted
fn resolve_documents(
    documents: Vec<SpecDocument>,
    options: &GenerateOptions,
    registry: &mut ServiceRegistry,
) -> Result<Vec<ResolvedDocument>> {
    info!("Verifying OpenAPI files");
    let mut resolved = Vec::with_capacity(documents.len());
    for doc in documents {
        validate(&doc)?;
        let version = doc.version().unwrap_or_default();
        let identity = naming::resolve(doc.stem(), options.versioning, version);
        let backend_url =
            select_backend_url(&doc, options.environment.as_deref())?.to_string();
        registry.claim(&identity, &doc.filename, &backend_url)?;
        debug!(
            file = %doc.filename,
            service = %identity.service_name,
            prefix = %identity.path_prefix,
            "Resolved service identity"
        );
        resolved.push(ResolvedDocument {
            doc,
            identity,
            backend_url,
        });
    }
    info!(documents = resolved.len(), "OpenAPI files verified");
    Ok(resolved)
}

/// Format every operation of one document into route records
pub fn process_document(doc: &SpecDocument, config: &OverrideConfig) -> Result<Vec<RouteRecord>> {
    info!(file = %doc.filename, "Formatting endpoints");
    doc.operations
        .iter()
        .map(|entry| {
            debug!(path = %entry.path, method = %entry.method, "Formatting operation");
            format_endpoint(
                &entry.path,
                &entry.method,
                &entry.operation,
                &doc.security_schemes,
                &config.endpoint,
                &config.backend,
            )
            .map_err(|e| {
                GenError::invalid(
                    &doc.filename,
                    format!("{} {}: {e}", entry.path, entry.method.to_uppercase()),
                )
            })
        })
        .collect()
}

/// Render every output file in memory
fn plan_bundle(
    resolved: &[ResolvedDocument],
    config: &OverrideConfig,
    registry: &ServiceRegistry,
    options: &GenerateOptions,
) -> Result<(BundlePlan, Vec<ServiceSummary>)> {
    let mut fragments = Vec::with_capacity(resolved.len());
    let mut dispatched = Vec::with_capacity(resolved.len());
    let mut services = Vec::with_capacity(resolved.len());

    for entry in resolved {
        let records = process_document(&entry.doc, config)?;
        let service_name = &entry.identity.service_name;
        if records.is_empty() {
            warn!(
                file = %entry.doc.filename,
                service = %service_name,
                "Document has no operations, leaving it out of the dispatcher"
            );
        } else {
            dispatched.push(service_name.as_str());
        }
        fragments.push(ServiceFragment {
            service_name: service_name.clone(),
            content: assemble(&entry.identity, &records)?,
        });
        services.push(ServiceSummary {
            file: entry.doc.filename.clone(),
            service_name: service_name.clone(),
            path_prefix: entry.identity.path_prefix.clone(),
            backend_url: entry.backend_url.clone(),
            routes: records.len(),
        });
    }

    let manifest_options = ManifestOptions {
        name: options.name.clone(),
        stackdriver_project_id: options.stackdriver_project_id.clone(),
    };
    let plan = BundlePlan {
        fragments,
        dispatcher: assemble_dispatcher(&dispatched)?,
        artifacts: manifest::write(config, registry, &manifest_options)?,
    };
    Ok((plan, services))
}

/// Run the generator end to end
///
/// # Errors
///
/// Any [`GenError`]; the first failure aborts the run and nothing is written
/// unless every document has been validated and formatted.
pub fn generate(options: &GenerateOptions) -> Result<GenerationReport> {
    info!(input = %options.input_dir.display(), "Loading OpenAPI files");
    let documents = load_documents(&options.input_dir)?;
    let config = OverrideConfig::load(&options.input_dir)?;

    let mut registry = ServiceRegistry::new();
    let resolved = resolve_documents(documents, options, &mut registry)?;
    let (plan, services) = plan_bundle(&resolved, &config, &registry, options)?;

    let layout = OutputLayout::new(&options.output_dir);
    write_bundle(&layout, &plan)?;

    let report = GenerationReport {
        output_dir: options.output_dir.clone(),
        services,
    };
    info!(
        services = report.services.len(),
        routes = report.total_routes(),
        output = %report.output_dir.display(),
        "Generation finished"
    );
    Ok(report)
}
