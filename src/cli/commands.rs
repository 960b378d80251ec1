use crate::generator::{generate, GenerateOptions, GenerationReport};
use crate::logging::{init_logging_with_config, LogConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Generate a KrakenD flexible configuration from OpenAPI 3 documents
///
/// Every `*.json`, `*.yaml` and `*.yml` file in INPUT_FOLDER becomes one
/// service. Optional overrides are read from INPUT_FOLDER/config/.
#[derive(Parser, Debug)]
#[command(name = "krakend-gen", version)]
pub struct Cli {
    /// Folder holding the OpenAPI documents
    pub input_folder: PathBuf,

    /// Folder the configuration bundle is written to
    pub output_folder: PathBuf,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    pub debug: bool,

    /// Take the version token from the filename (e.g. users.v2.json)
    /// instead of the document's info.version
    #[arg(long, default_value_t = false)]
    pub no_versioning: bool,

    /// Server description used to pick each service's backend URL;
    /// falls back to the first server when nothing matches
    #[arg(long, value_name = "NAME")]
    pub env: Option<String>,

    /// Gateway name written to krakend.json
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Google Cloud project id; enables the Stackdriver telemetry exporter
    #[arg(long, value_name = "ID")]
    pub stackdriver_project_id: Option<String>,
}

impl Cli {
    pub fn options(&self) -> GenerateOptions {
        GenerateOptions {
            input_dir: self.input_folder.clone(),
            output_dir: self.output_folder.clone(),
            versioning: !self.no_versioning,
            environment: self.env.clone(),
            name: self.name.clone(),
            stackdriver_project_id: self.stackdriver_project_id.clone(),
        }
    }
}

/// Run the generator for already-parsed arguments
pub fn run(cli: &Cli) -> anyhow::Result<GenerationReport> {
    let report = generate(&cli.options())?;
    for service in &report.services {
        info!(
            service = %service.service_name,
            prefix = %service.path_prefix,
            backend = %service.backend_url,
            routes = service.routes,
            "Generated service"
        );
    }
    Ok(report)
}

/// Parse the process arguments, initialise logging and run
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging_with_config(&LogConfig::from_env().with_debug(cli.debug))?;
    run(&cli)?;
    Ok(())
}
