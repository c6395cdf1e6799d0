use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::DocumentConfig;
use crate::logging::{init_logging, LogConfig, LogTarget};
use crate::router::Router;
use crate::spec::normalize;

/// Command-line interface for specrouter
#[derive(Parser)]
#[command(name = "specrouter")]
#[command(about = "Route documentation utilities", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Normalize an informal schema into a published definition
    Normalize {
        /// Schema file (YAML or JSON)
        #[arg(short, long)]
        schema: PathBuf,

        /// Nesting level the schema is normalized at
        #[arg(long, default_value_t = 0)]
        level: usize,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Print the base document of a router
    Spec {
        /// Document configuration file (YAML, TOML or JSON)
        #[arg(short, long, env = "SPECROUTER_CONFIG")]
        config: Option<PathBuf>,

        /// Definitions to register, as NAME=FILE (repeatable)
        #[arg(short, long = "definition", value_name = "NAME=FILE")]
        definitions: Vec<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

/// Output encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

/// Entry point of the `specrouter` binary.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    // stdout carries the command output
    let config = LogConfig {
        target: LogTarget::Stderr,
        ..LogConfig::from_env()
    };
    if let Err(err) = init_logging(&config) {
        eprintln!("Warning: {err}");
    }
    let output = execute(&cli.command)?;
    println!("{output}");
    Ok(())
}

/// Run one command and return what it prints.
pub fn execute(command: &Commands) -> Result<String> {
    match command {
        Commands::Normalize {
            schema,
            level,
            format,
        } => {
            let source = load_schema(schema)?;
            render(&normalize(&source, *level), *format)
        }
        Commands::Spec {
            config,
            definitions,
            format,
        } => {
            let config = match config {
                Some(path) => DocumentConfig::load(path)?,
                None => DocumentConfig::default(),
            };
            let router = Router::with_config(config)?;
            for definition in definitions {
                let (name, path) = definition
                    .split_once('=')
                    .ok_or_else(|| anyhow!("definition `{definition}` must be NAME=FILE"))?;
                let schema = load_schema(Path::new(path))?;
                router.add_definition(name, &schema);
                info!(definition = %name, file = %path, "Loaded definition");
            }
            render(&router.spec(), *format)
        }
    }
}

/// Read a schema file; `.yaml`/`.yml` are parsed as YAML, anything else as JSON.
pub fn load_schema(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read schema file {}", path.display()))?;
    let schema = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
            .with_context(|| format!("invalid YAML schema {}", path.display()))?,
        _ => serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON schema {}", path.display()))?,
    };
    Ok(schema)
}

/// Encode `value` for printing.
pub fn render(value: &Value, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).context("failed to encode JSON output")
        }
        OutputFormat::Yaml => serde_yaml::to_string(value).context("failed to encode YAML output"),
    }
}
