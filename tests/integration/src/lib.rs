//! Shared fixtures for the cross-crate tests: a two-chain in-memory network
//! with anchored identities.

use std::sync::Arc;

use metablox_core::{ChainName, SuiteTag};
use metablox_credentials::{CredentialIssuer, CredentialVerifier, CredentialWallet};
use metablox_crypto::{KeyPair, SuiteRegistry};
use metablox_identity::{
    Base58KeyScheme, BoundContract, ChainRegistry, DidDocument, DidDocumentResolver, DidResolver,
    InMemoryBoundContract, KeccakAddressScheme,
};

/// Bound contracts for `solana` and `ethereum`, a registry over them, and a
/// resolver reading that registry.
pub struct TestNetwork {
    pub solana: Arc<InMemoryBoundContract>,
    pub ethereum: Arc<InMemoryBoundContract>,
    pub registry: Arc<ChainRegistry>,
    pub resolver: Arc<DidDocumentResolver>,
    pub suites: Arc<SuiteRegistry>,
}

impl TestNetwork {
    pub fn new() -> Self {
        let solana = Arc::new(InMemoryBoundContract::new(ChainName::solana()));
        let ethereum = Arc::new(InMemoryBoundContract::new(ChainName::ethereum()));
        let mut registry = ChainRegistry::new();
        registry.init_bound_contracts([
            solana.clone() as Arc<dyn BoundContract>,
            ethereum.clone() as Arc<dyn BoundContract>,
        ]);
        let registry = Arc::new(registry);
        Self {
            solana,
            ethereum,
            resolver: Arc::new(DidDocumentResolver::new(registry.clone())),
            registry,
            suites: Arc::new(SuiteRegistry::new()),
        }
    }

    /// Generate a key for `suite`, anchor it on the matching chain, and
    /// return the resolved document with the key.
    pub async fn identity(&self, suite: SuiteTag) -> (DidDocument, KeyPair) {
        let key = KeyPair::generate(suite);
        let record = match suite {
            SuiteTag::Ed25519Signature2020 => self.solana.anchor_key(&Base58KeyScheme, key.public_key()),
            SuiteTag::EcdsaSecp256k1Signature2019 => {
                self.ethereum.anchor_key(&KeccakAddressScheme, key.public_key())
            }
        }
        .expect("anchor key");
        let did = record.did().expect("anchored DID");
        let document = self.resolver.resolve(did.uri()).await.expect("resolve anchored DID");
        (document, key)
    }

    pub async fn issuer(&self, suite: SuiteTag) -> CredentialIssuer {
        let (document, key) = self.identity(suite).await;
        CredentialIssuer::new(document, key, self.suites.clone())
    }

    pub async fn wallet(&self, suite: SuiteTag) -> CredentialWallet {
        let (document, key) = self.identity(suite).await;
        CredentialWallet::new(document, key)
    }

    pub fn verifier(&self) -> CredentialVerifier {
        CredentialVerifier::new(self.resolver.clone(), self.suites.clone())
    }
}

impl Default for TestNetwork {
    fn default() -> Self {
        Self::new()
    }
}
