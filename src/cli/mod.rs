//! # Command Line Interface
//!
//! Validates ingress manifests and plans or applies listener reconciliation
//! against a local provider state file.

pub mod commands;
pub mod manifest;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::observability::{init_logging, log_config_info};
use commands::TargetArgs;

#[derive(Parser)]
#[command(name = "albsync")]
#[command(about = "Reconcile load balancer listeners from ingress manifests")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse an ingress manifest and its annotations
    Validate {
        /// Ingress manifest (YAML)
        #[arg(long, value_name = "FILE")]
        ingress: PathBuf,

        /// Output format (json or yaml)
        #[arg(short, long, default_value = "json", value_parser = ["json", "yaml"])]
        output: String,
    },

    /// Show the listener changes reconcile would make
    Plan(TargetArgs),

    /// Create or update listeners and their rules
    #[command(
        after_help = "EXAMPLES:\n    albsync reconcile --ingress web.yaml --target-groups tgs.yaml \\\n        --load-balancer-arn arn:aws:elasticloadbalancing:us-east-1:123:loadbalancer/app/web/abc \\\n        --state state.json"
    )]
    Reconcile(TargetArgs),
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    initialise_logging(cli.verbose, &config)?;
    log_config_info(&config);

    match cli.command {
        Commands::Validate { ingress, output } => {
            let report = commands::handle_validate(&ingress, &config)?;
            output::print_output(&report, &output)?;
        }
        Commands::Plan(args) => {
            let report = commands::handle_plan(&args, &config).await?;
            output::print_output(&report, &args.output)?;
        }
        Commands::Reconcile(args) if config.reconciler.dry_run => {
            info!("Dry run enabled, planning only");
            let report = commands::handle_plan(&args, &config).await?;
            output::print_output(&report, &args.output)?;
        }
        Commands::Reconcile(args) => {
            let cancellation = cancel_on_ctrl_c();
            let report = commands::handle_reconcile(&args, &config, cancellation).await?;
            output::print_output(&report, &args.output)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<AppConfig> {
    use anyhow::Context;

    match path {
        Some(path) => AppConfig::load_from_path(path)
            .with_context(|| format!("Failed to load config file: {}", path.display())),
        None => AppConfig::from_env().context("Failed to load configuration from environment"),
    }
}

fn initialise_logging(verbose: bool, config: &AppConfig) -> anyhow::Result<()> {
    let mut observability = config.observability.clone();
    if verbose {
        observability.log_level = "debug".to_string();
    }
    init_logging(&observability)?;
    Ok(())
}

/// Token cancelled on the first Ctrl-C
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling reconciliation");
            trigger.cancel();
        }
    });
    token
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_reconcile_arguments() {
        let cli = Cli::try_parse_from([
            "albsync",
            "reconcile",
            "--ingress",
            "web.yaml",
            "--target-groups",
            "tgs.yaml",
            "--load-balancer-arn",
            "lb-1",
            "--output",
            "yaml",
            "--verbose",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Reconcile(args) => {
                assert_eq!(args.load_balancer_arn, "lb-1");
                assert_eq!(args.output, "yaml");
                assert!(args.state.is_none());
            }
            _ => panic!("expected reconcile"),
        }
    }

    #[test]
    fn rejects_unknown_output_format() {
        let result = Cli::try_parse_from(["albsync", "validate", "--ingress", "web.yaml", "-o", "table"]);
        assert!(result.is_err());
    }
}
