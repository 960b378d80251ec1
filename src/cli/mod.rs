//! # CLI Module
//!
//! Command-line front end of the generator.
//!
//! ```bash
//! krakend-gen [OPTIONS] <INPUT_FOLDER> <OUTPUT_FOLDER>
//! ```
//!
//! Options:
//! - `--debug` - Log per-path, per-method and per-header detail
//! - `--no-versioning` - Keep the version embedded in the filename instead of
//!   deriving it from `info.version`
//! - `--env <NAME>` - Select each backend URL by server `description`
//! - `--name <NAME>` - Gateway name written to `krakend.json`
//! - `--stackdriver-project-id <ID>` - Enable the Stackdriver exporter
//!
//! ## Examples
//!
//! ```bash
//! # Versioned prefixes (/bet/v1), first server of every document
//! krakend-gen specs build
//!
//! # Production servers, filename versions kept as-is
//! krakend-gen --env production --no-versioning specs build
//! ```
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use krakend_gen::cli::{run, Cli};
//! use clap::Parser;
//!
//! let report = run(&Cli::parse())?;
//! ```

mod commands;


pub use commands::{run, run_cli, Cli};
