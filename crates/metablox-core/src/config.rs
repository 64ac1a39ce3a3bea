//! Configuration loading and management.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CoreError;
use crate::types::{ChainName, Did, ETHEREUM_CHAIN, SOLANA_CHAIN};

/// Full configuration for a MetaBlox process.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MetabloxConfig {
    /// Chains and issuer identities initialized at startup.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Verifier policy.
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Chains that get a bound contract at startup.
    #[serde(default = "default_chains")]
    pub chains: Vec<String>,
    /// Issuer DIDs, at most one per chain.
    #[serde(default)]
    pub issuer_dids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// Only accept credentials whose issuer is one of the registry's issuer DIDs.
    #[serde(default)]
    pub require_trusted_issuer: bool,
    /// Treat credentials past their expiration date as invalid.
    #[serde(default = "default_true")]
    pub enforce_expiration: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_chains() -> Vec<String> {
    vec![SOLANA_CHAIN.into(), ETHEREUM_CHAIN.into()]
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            chains: default_chains(),
            issuer_dids: Vec::new(),
        }
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            require_trusted_issuer: false,
            enforce_expiration: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl RegistryConfig {
    /// Parse the configured chain names.
    pub fn chain_names(&self) -> Result<Vec<ChainName>, CoreError> {
        self.chains.iter().map(|c| ChainName::new(c.as_str())).collect()
    }

    /// Parse the configured issuer DIDs.
    pub fn issuer_dids(&self) -> Result<Vec<Did>, CoreError> {
        self.issuer_dids.iter().map(|d| Did::new(d.as_str())).collect()
    }
}

impl MetabloxConfig {
    /// Load config from a TOML file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file missing, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config: MetabloxConfig =
            toml::from_str(&contents).map_err(|e| CoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| CoreError::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Check that chain names and issuer DIDs parse, and that every issuer
    /// DID lives on a configured chain.
    pub fn validate(&self) -> Result<(), CoreError> {
        let chains = self.registry.chain_names()?;
        for did in self.registry.issuer_dids()? {
            if !chains.contains(&did.chain()) {
                return Err(CoreError::Config(format!(
                    "issuer DID {} is on chain {} which is not configured",
                    did,
                    did.chain()
                )));
            }
        }
        Ok(())
    }
}
