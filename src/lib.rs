//! # krakend-gen
//!
//! **krakend-gen** turns a folder of [OpenAPI 3](https://spec.openapis.org/oas/v3.0.3)
//! documents into a [KrakenD](https://www.krakend.io) flexible-configuration
//! bundle: one Go template per service, an `Endpoints` dispatcher template,
//! the `service.json` backend map, the top-level `krakend.json` and a
//! Dockerfile.
//!
//! ## Architecture
//!
//! - **[`spec`]** - Loads OpenAPI documents (JSON or YAML) in document order
//! - **[`validator`]** - Server URL and `info.version` checks
//! - **[`naming`]** - Service name and path prefix per document
//! - **[`security`]** - Security requirements to forwarded headers
//! - **[`config`]** - Override files under `<input>/config/`
//! - **[`generator`]** - Route records, templates, manifest and output layout
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`cli`]** - The `krakend-gen` command line
//!
//! ### Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant CLI as CLI<br/>(krakend-gen)
//!     participant Spec as spec::load_documents
//!     participant Val as validator + naming
//!     participant Fmt as generator::endpoint
//!     participant Tpl as generator::templates
//!     participant Man as generator::manifest
//!     participant FS as File System
//!
//!     CLI->>Spec: load_documents(input)
//!     Spec-->>CLI: Vec<SpecDocument> (sorted)
//!     CLI->>Val: validate + resolve identity
//!     Val-->>CLI: ServiceIdentity per document
//!     CLI->>Fmt: format_endpoint per operation
//!     Fmt-->>CLI: Vec<RouteRecord>
//!     CLI->>Tpl: assemble / assemble_dispatcher
//!     CLI->>Man: krakend.json, service.json, Dockerfile
//!     CLI->>FS: write bundle (only after everything succeeded)
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! krakend-gen ./specs ./build
//! docker build -t gateway ./build
//! ```
//!
//! ```rust,ignore
//! use krakend_gen::{generate, GenerateOptions};
//!
//! let mut options = GenerateOptions::new("specs", "build");
//! options.environment = Some("production".into());
//! let report = generate(&options)?;
//! println!("{} routes", report.total_routes());
//! ```
//!
//! ## Versioning
//!
//! By default the version token comes from the first character of
//! `info.version`: `BET.json` at `1.4.0` is served under `/bet/v1` as
//! `BETV1`. With `--no-versioning` a `.v<digits>` filename suffix is kept
//! verbatim and unsuffixed files get no version at all.

pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod naming;
pub mod security;
pub mod spec;
pub mod validator;

pub use error::{GenError, Result};
pub use generator::{generate, GenerateOptions, GenerationReport, ServiceSummary};
pub use naming::ServiceIdentity;
pub use spec::{load_documents, SpecDocument};
