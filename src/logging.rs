//! Logging initialization
//!
//! Structured logging with `tracing`, written to stderr so the generated
//! bundle is the only thing a run produces on disk or stdout.
//!
//! | Variable                         | Default   | Values                         |
//! |----------------------------------|-----------|--------------------------------|
//! | `KRAKEND_GEN_LOG_LEVEL`          | `info`    | trace/debug/info/warn/error    |
//! | `KRAKEND_GEN_LOG_FORMAT`         | `compact` | compact/pretty/json            |
//! | `KRAKEND_GEN_LOG_TARGET_FILTER`  | unset     | comma-separated directives     |
//!
//! `RUST_LOG`, when set, takes precedence over the level unless `--debug`
//! forces debug output.

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: compact lines by default, pretty for humans, JSON for pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    pub format: LogFormat,
    /// Module filter (comma-separated)
    pub target_filter: Option<String>,
    /// Set by `--debug`; ignores `RUST_LOG`
    pub force_level: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Compact,
            target_filter: None,
            force_level: false,
        }
    }
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("KRAKEND_GEN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: LogFormat::parse(
                &env::var("KRAKEND_GEN_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
            ),
            target_filter: env::var("KRAKEND_GEN_LOG_TARGET_FILTER").ok(),
            force_level: false,
        }
    }

    /// Force debug output, as `--debug` does
    pub fn with_debug(mut self, debug: bool) -> Self {
        if debug {
            self.log_level = "debug".to_string();
            self.force_level = true;
        }
        self
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    fn base_directive(&self, rust_log: Option<String>) -> String {
        match rust_log {
            Some(directive) if !self.force_level && !directive.trim().is_empty() => directive,
            _ => self.level().as_str().to_lowercase(),
        }
    }

    fn env_filter(&self) -> EnvFilter {
        let base = self.base_directive(env::var(EnvFilter::DEFAULT_ENV).ok());
        let mut env_filter =
            EnvFilter::try_new(base).unwrap_or_else(|_| EnvFilter::new(self.level().as_str()));

        if let Some(target_filter) = &self.target_filter {
            for filter in target_filter.split(',').map(str::trim).filter(|f| !f.is_empty()) {
                match filter.parse() {
                    Ok(directive) => env_filter = env_filter.add_directive(directive),
                    Err(_) => eprintln!("Warning: Invalid log filter directive: {filter}"),
                }
            }
        }
        env_filter
    }
}

/// Install the global subscriber
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_logging_with_config(config: &LogConfig) -> Result<()> {
    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")
}
