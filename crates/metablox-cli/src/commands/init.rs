//! `metablox init` — Write a default configuration file.

use clap::Args;
use std::path::Path;

use metablox_core::MetabloxConfig;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file.
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: &InitArgs, config_path: &Path) -> anyhow::Result<()> {
    if config_path.exists() && !args.force {
        anyhow::bail!(
            "configuration file already exists at {} (use --force to overwrite)",
            config_path.display()
        );
    }

    MetabloxConfig::default().save(config_path)?;
    tracing::info!(path = %config_path.display(), "wrote default config");
    println!("Initialized MetaBlox configuration at {}", config_path.display());
    println!("Add issuer DIDs under [registry] and run 'metablox demo' to try the flow.");
    Ok(())
}
