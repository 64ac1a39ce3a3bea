use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metablox_core::{utc_now, ChainName};
use serde::{Deserialize, Serialize};

use crate::cache::DocumentCache;
use crate::chain_anchor::{BoundContract, ChainRegistry};
use crate::codec::{DecodedDid, DidCodec};
use crate::document::DidDocument;
use crate::error::IdentityError;

/// Trait for resolving DIDs to their documents.
#[async_trait]
pub trait DidResolver: Send + Sync {
    /// Resolve a DID URI to its DID Document.
    async fn resolve(&self, did: &str) -> Result<DidDocument, IdentityError>;
}

/// Where a resolved document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolutionSource {
    Cache,
    ChainAnchor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionMetadata {
    pub source: ResolutionSource,
    pub chain: ChainName,
    pub resolved_at: DateTime<Utc>,
}

impl ResolutionMetadata {
    fn new(source: ResolutionSource, chain: ChainName) -> Self {
        Self {
            source,
            chain,
            resolved_at: utc_now(),
        }
    }
}

/// Resolves DIDs against the bound contracts of a [`ChainRegistry`].
///
/// This is the only place key material for a DID enters the system: a
/// document is produced either from the cache or from an anchor record that
/// matches the key material encoded in the DID itself.
pub struct DidDocumentResolver {
    codec: DidCodec,
    registry: Arc<ChainRegistry>,
    cache: Option<Arc<DocumentCache>>,
}

impl DidDocumentResolver {
    pub fn new(registry: Arc<ChainRegistry>) -> Self {
        Self {
            codec: DidCodec::new(),
            registry,
            cache: None,
        }
    }

    /// Replace the default codec (for chains registered at runtime).
    pub fn with_codec(mut self, codec: DidCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Cache consulted by [`DidResolver::resolve`].
    pub fn with_cache(mut self, cache: Arc<DocumentCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn codec(&self) -> &DidCodec {
        &self.codec
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    /// Resolve against an explicit bound contract.
    ///
    /// The cache, when given, is checked first. Otherwise the contract must be
    /// deployed on the DID's chain.
    pub async fn resolve_with(
        &self,
        did: &str,
        cache: Option<&DocumentCache>,
        contract: &dyn BoundContract,
    ) -> Result<(ResolutionMetadata, DidDocument), IdentityError> {
        let decoded = self.codec.decode(did)?;
        if let Some(hit) = Self::from_cache(&decoded, cache) {
            return Ok(hit);
        }
        self.resolve_on_chain(decoded, contract).await
    }

    /// Resolve using the registry's bound contract for the DID's chain.
    pub async fn resolve_in(
        &self,
        did: &str,
        cache: Option<&DocumentCache>,
    ) -> Result<(ResolutionMetadata, DidDocument), IdentityError> {
        let decoded = self.codec.decode(did)?;
        if let Some(hit) = Self::from_cache(&decoded, cache) {
            return Ok(hit);
        }
        let contract = self
            .registry
            .bound_contract(&decoded.chain)
            .map_err(|e| match e {
                IdentityError::UnregisteredChain(chain) => IdentityError::UnsupportedChain(chain),
                other => other,
            })?;
        self.resolve_on_chain(decoded, contract.as_ref()).await
    }

    fn from_cache(
        decoded: &DecodedDid,
        cache: Option<&DocumentCache>,
    ) -> Option<(ResolutionMetadata, DidDocument)> {
        let document = cache?.get(&decoded.did)?;
        tracing::debug!(did = %decoded.did, "DID resolved from cache");
        Some((
            ResolutionMetadata::new(ResolutionSource::Cache, decoded.chain.clone()),
            document,
        ))
    }

    async fn resolve_on_chain(
        &self,
        decoded: DecodedDid,
        contract: &dyn BoundContract,
    ) -> Result<(ResolutionMetadata, DidDocument), IdentityError> {
        if contract.chain() != &decoded.chain {
            tracing::warn!(
                did = %decoded.did,
                contract = %contract.chain(),
                "bound contract is for another chain"
            );
            return Err(IdentityError::UnsupportedChain(decoded.chain));
        }

        let record = contract
            .lookup(decoded.did.identifier())
            .await?
            .ok_or_else(|| IdentityError::DidNotFound(decoded.did.to_string()))?;

        let scheme = self.codec.scheme(&decoded.chain)?;
        if record.suite != scheme.suite() {
            return Err(IdentityError::KeyMismatch {
                did: decoded.did.to_string(),
                detail: format!("anchored key is {}, chain uses {}", record.suite, scheme.suite()),
            });
        }
        let public_key = record.public_key()?;
        let material = scheme
            .material_for(&public_key)
            .map_err(|e| IdentityError::KeyMismatch {
                did: decoded.did.to_string(),
                detail: e.to_string(),
            })?;
        if material != decoded.material {
            return Err(IdentityError::KeyMismatch {
                did: decoded.did.to_string(),
                detail: "anchored key does not derive to the DID identifier".into(),
            });
        }

        tracing::debug!(did = %decoded.did, chain = %decoded.chain, "DID resolved from chain anchor");
        let document = DidDocument::new(decoded.did, record.suite, &public_key);
        Ok((
            ResolutionMetadata::new(ResolutionSource::ChainAnchor, decoded.chain),
            document,
        ))
    }
}

#[async_trait]
impl DidResolver for DidDocumentResolver {
    async fn resolve(&self, did: &str) -> Result<DidDocument, IdentityError> {
        let (_, document) = self.resolve_in(did, self.cache.as_deref()).await?;
        Ok(document)
    }
}

impl std::fmt::Debug for DidDocumentResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DidDocumentResolver")
            .field("codec", &self.codec)
            .field("registry", &self.registry)
            .field("cached", &self.cache.as_ref().map(|c| c.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain_anchor::{AnchorRecord, InMemoryBoundContract};
    use crate::codec::{Base58KeyScheme, KeccakAddressScheme};
    use metablox_core::{ErrorKind, SuiteTag};
    use metablox_crypto::{Ed25519Suite, KeyPair, Secp256k1Suite};

    struct Fixture {
        solana: Arc<InMemoryBoundContract>,
        ethereum: Arc<InMemoryBoundContract>,
        resolver: DidDocumentResolver,
    }

    fn fixture() -> Fixture {
        let solana = Arc::new(InMemoryBoundContract::new(ChainName::solana()));
        let ethereum = Arc::new(InMemoryBoundContract::new(ChainName::ethereum()));
        let mut registry = ChainRegistry::new();
        registry.init_bound_contracts([
            solana.clone() as Arc<dyn BoundContract>,
            ethereum.clone() as Arc<dyn BoundContract>,
        ]);
        Fixture {
            solana,
            ethereum,
            resolver: DidDocumentResolver::new(Arc::new(registry)),
        }
    }

    #[tokio::test]
    async fn test_resolve_solana_from_anchor() {
        let fx = fixture();
        let kp = KeyPair::generate(SuiteTag::Ed25519Signature2020);
        let did = fx.solana.anchor_key(&Base58KeyScheme, kp.public_key()).unwrap().did().unwrap();

        let (meta, doc) = fx.resolver.resolve_in(did.uri(), None).await.unwrap();
        assert_eq!(meta.source, ResolutionSource::ChainAnchor);
        assert_eq!(meta.chain, ChainName::solana());
        assert_eq!(doc.id, did);
        assert_eq!(doc.verification_method.len(), 1);
        assert!(doc.has_verification_key(&Ed25519Suite, kp.public_key()));
    }

    #[tokio::test]
    async fn test_resolve_ethereum_from_anchor() {
        let fx = fixture();
        let kp = KeyPair::generate(SuiteTag::EcdsaSecp256k1Signature2019);
        let did = fx
            .ethereum
            .anchor_key(&KeccakAddressScheme, kp.public_key())
            .unwrap()
            .did()
            .unwrap();

        let doc = fx.resolver.resolve(did.uri()).await.unwrap();
        assert_eq!(
            doc.primary().unwrap().method_type,
            "EcdsaSecp256k1VerificationKey2019"
        );
        assert!(doc.has_verification_key(&Secp256k1Suite, kp.public_key()));
    }

    #[tokio::test]
    async fn test_cache_takes_precedence() {
        let fx = fixture();
        let kp = KeyPair::generate(SuiteTag::Ed25519Signature2020);
        let did = DidCodec::new().encode(kp.public_key(), &ChainName::solana()).unwrap();
        let cache = DocumentCache::new();
        cache.insert(DidDocument::new(did.clone(), SuiteTag::Ed25519Signature2020, kp.public_key()));

        // Nothing anchored: only the cache can answer.
        let (meta, doc) = fx.resolver.resolve_in(did.uri(), Some(&cache)).await.unwrap();
        assert_eq!(meta.source, ResolutionSource::Cache);
        assert_eq!(doc.id, did);

        let cached = DidDocumentResolver::new(fx.resolver.registry.clone())
            .with_cache(Arc::new(cache));
        assert!(cached.resolve(did.uri()).await.is_ok());
    }

    #[tokio::test]
    async fn test_not_found() {
        let fx = fixture();
        let kp = KeyPair::generate(SuiteTag::Ed25519Signature2020);
        let did = DidCodec::new().encode(kp.public_key(), &ChainName::solana()).unwrap();
        let err = fx.resolver.resolve(did.uri()).await.unwrap_err();
        assert!(matches!(err, IdentityError::DidNotFound(_)));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_unknown_chain_is_not_found() {
        let fx = fixture();
        let err = fx.resolver.resolve("did:metablox:bitcoin:abc").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_uninitialized_chain_is_unsupported() {
        let solana = Arc::new(InMemoryBoundContract::new(ChainName::solana()));
        let mut registry = ChainRegistry::new();
        registry.init_bound_contracts([solana as Arc<dyn BoundContract>]);
        let resolver = DidDocumentResolver::new(Arc::new(registry));

        let kp = KeyPair::generate(SuiteTag::EcdsaSecp256k1Signature2019);
        let did = DidCodec::new().encode(kp.public_key(), &ChainName::ethereum()).unwrap();
        let err = resolver.resolve(did.uri()).await.unwrap_err();
        assert!(matches!(err, IdentityError::UnsupportedChain(_)));
    }

    #[tokio::test]
    async fn test_empty_registry_is_configuration_error() {
        let resolver = DidDocumentResolver::new(Arc::new(ChainRegistry::new()));
        let kp = KeyPair::generate(SuiteTag::Ed25519Signature2020);
        let did = DidCodec::new().encode(kp.public_key(), &ChainName::solana()).unwrap();
        let err = resolver.resolve(did.uri()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_resolve_with_rejects_foreign_contract() {
        let fx = fixture();
        let kp = KeyPair::generate(SuiteTag::Ed25519Signature2020);
        let did = fx.solana.anchor_key(&Base58KeyScheme, kp.public_key()).unwrap().did().unwrap();

        let err = fx
            .resolver
            .resolve_with(did.uri(), None, fx.ethereum.as_ref())
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::UnsupportedChain(_)));

        let (_, doc) = fx
            .resolver
            .resolve_with(did.uri(), None, fx.solana.as_ref())
            .await
            .unwrap();
        assert_eq!(doc.id, did);
    }

    #[tokio::test]
    async fn test_substituted_anchor_key_rejected() {
        let fx = fixture();
        let owner = KeyPair::generate(SuiteTag::Ed25519Signature2020);
        let attacker = KeyPair::generate(SuiteTag::Ed25519Signature2020);
        let did = DidCodec::new().encode(owner.public_key(), &ChainName::solana()).unwrap();

        fx.solana
            .register(AnchorRecord::new(
                ChainName::solana(),
                did.identifier().to_string(),
                SuiteTag::Ed25519Signature2020,
                attacker.public_key(),
            ))
            .unwrap();

        let err = fx.resolver.resolve(did.uri()).await.unwrap_err();
        assert!(matches!(err, IdentityError::KeyMismatch { .. }));
    }

    #[tokio::test]
    async fn test_anchor_with_wrong_suite_rejected() {
        let fx = fixture();
        let kp = KeyPair::generate(SuiteTag::EcdsaSecp256k1Signature2019);
        let did = DidCodec::new().encode(kp.public_key(), &ChainName::ethereum()).unwrap();
        fx.ethereum
            .register(AnchorRecord::new(
                ChainName::ethereum(),
                did.identifier().to_string(),
                SuiteTag::Ed25519Signature2020,
                &[3u8; 32],
            ))
            .unwrap();
        let err = fx.resolver.resolve(did.uri()).await.unwrap_err();
        assert!(matches!(err, IdentityError::KeyMismatch { .. }));
    }
}
