//! mediascore - score generated media against its prompt and brand
//!
//! ## Commands
//!
//! - `evaluate`: score one asset described by a YAML/JSON descriptor
//! - `check-config`: validate runtime configuration and provider credentials
//!
//! Results go to stdout as JSON; logs go to stderr.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use mediascore_core::AssetDescriptor;
use mediascore_runtime::{RuntimeConfig, ScoringOrchestrator};

#[derive(Parser)]
#[command(name = "mediascore")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Score generated images and videos against prompt and brand", long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one asset
    Evaluate {
        /// Asset descriptor (YAML or JSON)
        #[arg(short, long)]
        asset: PathBuf,

        /// Runtime configuration (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Media file to read instead of the descriptor's location
        #[arg(long)]
        media: Option<PathBuf>,

        /// Never call a model; score with heuristics only
        #[arg(long)]
        offline: bool,

        /// Include the per-criterion attempt trace
        #[arg(long)]
        report: bool,
    },

    /// Validate configuration and provider credentials
    CheckConfig {
        /// Runtime configuration (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct ConfigSummary<'a> {
    provider: Option<&'a str>,
    model: String,
    vision: &'a mediascore_runtime::StepConfig,
    text: &'a mediascore_runtime::StepConfig,
    evaluation_deadline_ms: Option<u128>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Evaluate {
            asset,
            config,
            media,
            offline,
            report,
        } => cmd_evaluate(&asset, config.as_deref(), media.as_deref(), offline, report).await,
        Commands::CheckConfig { config } => cmd_check_config(config.as_deref()).await,
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<RuntimeConfig> {
    let mut config = match path {
        Some(path) => RuntimeConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => RuntimeConfig::default(),
    };
    config.apply_env_overrides();
    Ok(config)
}

async fn cmd_evaluate(
    asset_path: &Path,
    config_path: Option<&Path>,
    media_path: Option<&Path>,
    offline: bool,
    report: bool,
) -> Result<()> {
    let descriptor = AssetDescriptor::from_file(asset_path)
        .with_context(|| format!("Failed to load asset descriptor {}", asset_path.display()))?;

    let media_file = match media_path {
        Some(path) => Some(path.to_path_buf()),
        None => resolve_media(asset_path, &descriptor.location),
    };
    let media = match media_file {
        Some(path) => Some(
            std::fs::read(&path)
                .with_context(|| format!("Failed to read media {}", path.display()))?,
        ),
        None => {
            tracing::warn!(
                location = %descriptor.location,
                "Media not found locally, scoring without pixel data"
            );
            None
        }
    };

    let mut config = load_config(config_path)?;
    if offline {
        config.provider = None;
    }
    let orchestrator = ScoringOrchestrator::from_config(config)?;

    let asset = descriptor.into_asset(media);
    let output = if report {
        serde_json::to_string_pretty(&orchestrator.evaluate_with_report(&asset).await)?
    } else {
        serde_json::to_string_pretty(&orchestrator.evaluate(&asset).await)?
    };
    println!("{}", output);

    Ok(())
}

/// Local file for a descriptor location, resolved against the descriptor's directory.
fn resolve_media(descriptor_path: &Path, location: &str) -> Option<PathBuf> {
    if location.contains("://") {
        return None;
    }
    let location = Path::new(location);
    let candidate = if location.is_absolute() {
        location.to_path_buf()
    } else {
        descriptor_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(location)
    };
    candidate.is_file().then_some(candidate)
}

async fn cmd_check_config(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let orchestrator = ScoringOrchestrator::from_config(config)?;
    let config = orchestrator.config();

    let summary = ConfigSummary {
        provider: config.provider.as_ref().map(|p| p.provider_type.as_str()),
        model: config.completion_config().model,
        vision: &config.vision,
        text: &config.text,
        evaluation_deadline_ms: config.evaluation_deadline.map(|d| d.as_millis()),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    match orchestrator.check_provider().await {
        Some(true) => tracing::info!("Model provider ready"),
        Some(false) => anyhow::bail!("Model provider failed its health check"),
        None => {
            tracing::warn!("No model provider configured; evaluations will use heuristics only")
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_evaluate() {
        let cli = Cli::try_parse_from([
            "mediascore",
            "evaluate",
            "--asset",
            "asset.yaml",
            "--offline",
            "--report",
        ])
        .unwrap();

        match cli.command {
            Commands::Evaluate {
                asset,
                offline,
                report,
                config,
                ..
            } => {
                assert_eq!(asset, PathBuf::from("asset.yaml"));
                assert!(offline);
                assert!(report);
                assert!(config.is_none());
            }
            _ => panic!("Expected evaluate command"),
        }
    }

    #[test]
    fn test_resolve_media_relative_to_descriptor() {
        let dir = std::env::temp_dir().join("mediascore-cli-resolve");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("shoe.png"), b"not really a png").unwrap();

        let descriptor = dir.join("asset.yaml");
        assert_eq!(
            resolve_media(&descriptor, "shoe.png"),
            Some(dir.join("shoe.png"))
        );
        assert_eq!(resolve_media(&descriptor, "missing.png"), None);
        assert_eq!(resolve_media(&descriptor, "https://cdn.example.com/shoe.png"), None);
    }
}
