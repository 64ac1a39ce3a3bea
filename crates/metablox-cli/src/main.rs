//! MetaBlox CLI — command-line interface for chain-anchored identity.
//!
//! Subcommands: init, demo, did, verify.

mod anchors;
mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use metablox_core::MetabloxConfig;

/// MetaBlox — DIDs, Verifiable Credentials and Presentations.
#[derive(Parser, Debug)]
#[command(name = "metablox", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, global = true, default_value = "metablox.toml")]
    config: PathBuf,

    /// Override the configured log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file.
    Init(commands::init::InitArgs),
    /// Run the issue → verify → present → tamper flow with in-memory anchors.
    Demo(commands::demo::DemoArgs),
    /// Encode or decode DIDs.
    Did(commands::did::DidArgs),
    /// Verify a credential or presentation file.
    Verify(commands::verify::VerifyArgs),
}

fn init_tracing(config: &MetabloxConfig, level_override: Option<&str>) {
    let level = level_override.unwrap_or(&config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if config.logging.format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = MetabloxConfig::load(&cli.config)?;
    init_tracing(&config, cli.log_level.as_deref());

    match &cli.command {
        Commands::Init(args) => commands::init::run(args, &cli.config),
        Commands::Demo(args) => commands::demo::run(args, &config).await,
        Commands::Did(args) => commands::did::run(args),
        Commands::Verify(args) => commands::verify::run(args, &config).await,
    }
}
