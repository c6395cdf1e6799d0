//! # Logging Module
//!
//! Structured logging setup for binaries and services embedding the router.
//! The library itself only emits `tracing` events; nothing is printed until a
//! subscriber is installed, either by the host application or with
//! [`init_logging`].
//!
//! ## Configuration
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `SPECROUTER_LOG_LEVEL` | `info` | trace/debug/info/warn/error |
//! | `SPECROUTER_LOG_FORMAT` | `json` | `json` or `pretty` |
//! | `SPECROUTER_LOG_TARGET_FILTER` | unset | extra comma-separated filter directives |
//! | `SPECROUTER_LOG_INCLUDE_LOCATION` | `false` | include file and line |
//! | `SPECROUTER_LOG_TARGET` | `stdout` | `stdout` or `stderr` |
//!
//! `RUST_LOG`, when set, takes precedence over `SPECROUTER_LOG_LEVEL`.
//!
//! ```rust,ignore
//! use specrouter::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::from_env())?;
//! ```

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Output format of log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

/// Stream log lines are written to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    Stderr,
}

impl LogTarget {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "stderr" => LogTarget::Stderr,
            _ => LogTarget::Stdout,
        }
    }

    fn make_writer(self) -> BoxMakeWriter {
        match self {
            LogTarget::Stdout => BoxMakeWriter::new(std::io::stdout),
            LogTarget::Stderr => BoxMakeWriter::new(std::io::stderr),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    pub format: LogFormat,
    /// Additional filter directives, e.g. `specrouter::router=debug`
    pub target_filter: Option<String>,
    pub include_location: bool,
    pub target: LogTarget,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            target_filter: None,
            include_location: false,
            target: LogTarget::Stdout,
        }
    }
}

impl LogConfig {
    /// Read configuration from `SPECROUTER_LOG_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("SPECROUTER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: LogFormat::parse(
                &env::var("SPECROUTER_LOG_FORMAT").unwrap_or_else(|_| "json".to_string()),
            ),
            target_filter: env::var("SPECROUTER_LOG_TARGET_FILTER").ok(),
            include_location: env::var("SPECROUTER_LOG_INCLUDE_LOCATION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
            target: LogTarget::parse(
                &env::var("SPECROUTER_LOG_TARGET").unwrap_or_else(|_| "stdout".to_string()),
            ),
        }
    }

    /// Human-friendly settings for local development
    #[must_use]
    pub fn default_dev() -> Self {
        Self {
            log_level: "debug".to_string(),
            format: LogFormat::Pretty,
            target_filter: None,
            include_location: true,
            target: LogTarget::Stdout,
        }
    }

    /// Level parsed from `log_level`, `INFO` when unrecognized
    #[must_use]
    pub fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// Filter combining `RUST_LOG` (or the configured level) with `target_filter`.
    ///
    /// Invalid directives in `target_filter` are skipped.
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        let mut env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level().as_str()));
        if let Some(target_filter) = &self.target_filter {
            for filter in target_filter.split(',').map(str::trim) {
                if filter.is_empty() {
                    continue;
                }
                match filter.parse() {
                    Ok(directive) => env_filter = env_filter.add_directive(directive),
                    Err(_) => eprintln!("Warning: Invalid log filter directive: {filter}"),
                }
            }
        }
        env_filter
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails if a global subscriber is already installed, including by an earlier
/// call to this function.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let writer = config.target.make_writer();
    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_span_list(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;
    Ok(())
}
