//! Chain anchoring: the per-chain bound contracts that hold DID keys, and the
//! registry that maps chain names to them.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use metablox_core::{utc_now, ChainName, Did, SuiteTag};
use metablox_crypto::multibase;
use serde::{Deserialize, Serialize};

use crate::codec::IdentifierScheme;
use crate::error::IdentityError;

/// What a bound contract stores for one DID identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorRecord {
    pub chain: ChainName,
    pub identifier: String,
    pub suite: SuiteTag,
    pub public_key_multibase: String,
    pub registered_at: DateTime<Utc>,
}

impl AnchorRecord {
    pub fn new(chain: ChainName, identifier: String, suite: SuiteTag, public_key: &[u8]) -> Self {
        Self {
            chain,
            identifier,
            suite,
            public_key_multibase: multibase::encode_base58btc(public_key),
            registered_at: utc_now(),
        }
    }

    /// Raw public key bytes.
    pub fn public_key(&self) -> Result<Vec<u8>, IdentityError> {
        let (_, bytes) = multibase::decode(&self.public_key_multibase)?;
        Ok(bytes)
    }

    pub fn did(&self) -> Result<Did, IdentityError> {
        Ok(Did::from_parts(&self.chain, &self.identifier)?)
    }
}

/// Handle to the on-chain registry of DID keys for one chain.
///
/// Implementations may block on network I/O. Errors are returned as-is;
/// retrying is up to the caller.
#[async_trait]
pub trait BoundContract: Send + Sync {
    /// Chain this contract is deployed on.
    fn chain(&self) -> &ChainName;

    /// Fetch the anchor record for an identifier, `None` if unregistered.
    async fn lookup(&self, identifier: &str) -> Result<Option<AnchorRecord>, IdentityError>;
}

/// Bound contract backed by an in-process map.
pub struct InMemoryBoundContract {
    chain: ChainName,
    records: DashMap<String, AnchorRecord>,
}

impl InMemoryBoundContract {
    pub fn new(chain: ChainName) -> Self {
        Self {
            chain,
            records: DashMap::new(),
        }
    }

    /// Store a record. The record must belong to this contract's chain.
    pub fn register(&self, record: AnchorRecord) -> Result<(), IdentityError> {
        if record.chain != self.chain {
            return Err(IdentityError::ContractChainMismatch {
                did_chain: record.chain,
                contract: self.chain.clone(),
            });
        }
        tracing::debug!(
            chain = %self.chain,
            identifier = %record.identifier,
            "anchor record registered"
        );
        self.records.insert(record.identifier.clone(), record);
        Ok(())
    }

    /// Anchor a public key under the identifier `scheme` derives for it.
    pub fn anchor_key(
        &self,
        scheme: &dyn IdentifierScheme,
        public_key: &[u8],
    ) -> Result<AnchorRecord, IdentityError> {
        let identifier = scheme.encode(public_key)?;
        let record = AnchorRecord::new(self.chain.clone(), identifier, scheme.suite(), public_key);
        self.register(record.clone())?;
        Ok(record)
    }

    pub fn remove(&self, identifier: &str) -> Option<AnchorRecord> {
        self.records.remove(identifier).map(|(_, r)| r)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl BoundContract for InMemoryBoundContract {
    fn chain(&self) -> &ChainName {
        &self.chain
    }

    async fn lookup(&self, identifier: &str) -> Result<Option<AnchorRecord>, IdentityError> {
        Ok(self.records.get(identifier).map(|r| r.value().clone()))
    }
}

impl std::fmt::Debug for InMemoryBoundContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBoundContract")
            .field("chain", &self.chain)
            .field("records", &self.records.len())
            .finish()
    }
}

/// Issuer DIDs and bound contracts per chain.
///
/// Populated once through the `init_*` methods (which need `&mut self`) and
/// then shared behind an `Arc`, after which it is read-only.
#[derive(Default)]
pub struct ChainRegistry {
    issuer_dids: HashMap<ChainName, Did>,
    contracts: HashMap<ChainName, Arc<dyn BoundContract>>,
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the issuer DIDs. A later DID for the same chain wins.
    pub fn init_issuer_dids(&mut self, dids: impl IntoIterator<Item = Did>) {
        self.issuer_dids.clear();
        for did in dids {
            let chain = did.chain();
            if let Some(previous) = self.issuer_dids.insert(chain.clone(), did) {
                tracing::warn!(chain = %chain, previous = %previous, "issuer DID replaced");
            }
        }
        tracing::info!(count = self.issuer_dids.len(), "issuer DIDs initialized");
    }

    /// Replace the bound contracts, keyed by each contract's own chain.
    pub fn init_bound_contracts(
        &mut self,
        contracts: impl IntoIterator<Item = Arc<dyn BoundContract>>,
    ) {
        self.contracts = contracts
            .into_iter()
            .map(|c| (c.chain().clone(), c))
            .collect();
        tracing::info!(count = self.contracts.len(), "bound contracts initialized");
    }

    /// Contract handle for a chain.
    pub fn bound_contract(
        &self,
        chain: &ChainName,
    ) -> Result<Arc<dyn BoundContract>, IdentityError> {
        if self.contracts.is_empty() {
            return Err(IdentityError::RegistryNotInitialized);
        }
        self.contracts
            .get(chain)
            .cloned()
            .ok_or_else(|| IdentityError::UnregisteredChain(chain.clone()))
    }

    pub fn issuer_did(&self, chain: &ChainName) -> Option<&Did> {
        self.issuer_dids.get(chain)
    }

    /// All issuer DIDs, in no particular order.
    pub fn issuer_dids(&self) -> impl Iterator<Item = &Did> {
        self.issuer_dids.values()
    }

    /// Whether `did` is the issuer DID registered for its chain.
    pub fn is_issuer(&self, did: &Did) -> bool {
        self.issuer_dids.get(&did.chain()) == Some(did)
    }

    /// Chains with a bound contract, sorted.
    pub fn chains(&self) -> Vec<ChainName> {
        let mut chains: Vec<ChainName> = self.contracts.keys().cloned().collect();
        chains.sort();
        chains
    }

    pub fn is_initialized(&self) -> bool {
        !self.contracts.is_empty()
    }
}

impl std::fmt::Debug for ChainRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainRegistry")
            .field("chains", &self.chains())
            .field("issuer_dids", &self.issuer_dids)
            .finish()
    }
}
