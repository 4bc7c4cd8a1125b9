use std::sync::Arc;

use clap::Parser;
use reshape_api::dynamic::DynamicObject;
use reshape_api::error::FieldError;
use reshape_engine::{AdapterRegistry, Mapper, MapperConfig};

#[derive(Debug, thiserror::Error)]
enum SourceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Field(#[from] FieldError),
}

#[derive(Parser)]
#[command(name = "reshape", about = "Map a JSON document onto a schema-described type")]
struct Cli {
    /// Path to the source JSON document.
    #[arg(long)]
    source: String,

    /// Path to the TOML schema describing the destination types.
    #[arg(long)]
    target: String,

    /// Path to a TOML mapping configuration (bindings, transforms, fallback).
    #[arg(long, env = "RESHAPE_CONFIG")]
    config: Option<String>,

    /// Pretty-print the output.
    #[arg(long)]
    pretty: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            tracing::info!(config = %path, "loading mapping configuration");
            match MapperConfig::load(path) {
                Ok(c) => c,
                Err(e) => {
                    tracing::error!(error = %e, "failed to load config");
                    std::process::exit(1);
                }
            }
        }
        None => MapperConfig::default(),
    };

    let mapper = match Mapper::with_config(config, AdapterRegistry::with_builtins()) {
        Ok(m) => m,
        Err(e) => {
            tracing::error!(error = %e, "invalid mapping configuration");
            std::process::exit(1);
        }
    };

    let schema = match reshape_engine::config::load_schema(&cli.target) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            tracing::error!(error = %e, "failed to load target schema");
            std::process::exit(1);
        }
    };

    if let Err(e) = mapper.check_schema(&schema) {
        tracing::error!(error = %e, "target schema names an unknown adapter");
        std::process::exit(1);
    }

    let source = match read_source(&cli.source) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(source = %cli.source, error = %e, "failed to read source document");
            std::process::exit(1);
        }
    };

    let mut destination = match DynamicObject::root(schema) {
        Ok(d) => d,
        Err(e) => {
            tracing::error!(error = %e, "failed to construct destination");
            std::process::exit(1);
        }
    };

    tracing::info!(
        source = %cli.source,
        destination = destination.type_name(),
        "mapping"
    );
    if let Err(e) = mapper.map(&source, &mut destination) {
        tracing::error!(error = %e, cause = %e.cause(), "mapping failed");
        std::process::exit(1);
    }

    let json = destination.to_json();
    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&json)
    } else {
        serde_json::to_string(&json)
    };
    match rendered {
        Ok(text) => println!("{text}"),
        Err(e) => {
            tracing::error!(error = %e, "failed to render output");
            std::process::exit(1);
        }
    }
}

fn read_source(path: &str) -> Result<DynamicObject, SourceError> {
    let content = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    Ok(DynamicObject::from_json(&value)?)
}
