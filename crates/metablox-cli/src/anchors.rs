//! In-memory chain anchors for the CLI: one bound contract per configured
//! chain, optionally seeded from an anchors JSON file.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use metablox_core::config::RegistryConfig;
use metablox_core::ChainName;
use metablox_identity::{AnchorRecord, BoundContract, ChainRegistry, InMemoryBoundContract};

pub struct LocalAnchors {
    pub contracts: HashMap<ChainName, Arc<InMemoryBoundContract>>,
}

impl LocalAnchors {
    /// Empty contracts for every configured chain.
    pub fn from_config(config: &RegistryConfig) -> anyhow::Result<Self> {
        let contracts = config
            .chain_names()?
            .into_iter()
            .map(|chain| (chain.clone(), Arc::new(InMemoryBoundContract::new(chain))))
            .collect();
        Ok(Self { contracts })
    }

    pub fn contract(&self, chain: &ChainName) -> anyhow::Result<&Arc<InMemoryBoundContract>> {
        self.contracts
            .get(chain)
            .with_context(|| format!("chain {} is not configured", chain))
    }

    /// Register every record of an anchors file (a JSON array of records).
    pub fn load_file(&self, path: &Path) -> anyhow::Result<usize> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading anchors file {}", path.display()))?;
        let records: Vec<AnchorRecord> =
            serde_json::from_str(&json).context("invalid anchors JSON")?;
        let count = records.len();
        for record in records {
            self.contract(&record.chain)?.register(record)?;
        }
        tracing::info!(path = %path.display(), records = count, "anchors loaded");
        Ok(count)
    }

    /// Records for the given identifiers, for writing an anchors file.
    pub async fn records(&self, identifiers: &[(ChainName, String)]) -> anyhow::Result<Vec<AnchorRecord>> {
        let mut out = Vec::with_capacity(identifiers.len());
        for (chain, identifier) in identifiers {
            if let Some(record) = self.contract(chain)?.lookup(identifier).await? {
                out.push(record);
            }
        }
        Ok(out)
    }

    /// A registry over these contracts with the given issuer DIDs.
    pub fn registry(&self, config: &RegistryConfig) -> anyhow::Result<ChainRegistry> {
        let mut registry = ChainRegistry::new();
        registry.init_issuer_dids(config.issuer_dids()?);
        registry.init_bound_contracts(
            self.contracts
                .values()
                .map(|c| c.clone() as Arc<dyn BoundContract>),
        );
        Ok(registry)
    }
}
