use std::collections::HashMap;
use std::sync::Arc;

use metablox_core::SuiteTag;

use crate::ed25519::Ed25519Suite;
use crate::error::CryptoError;
use crate::secp256k1::Secp256k1Suite;

/// A signature algorithm paired with the digest it signs.
///
/// Payloads are always hashed with [`SignatureSuite::digest`] first and the
/// digest is what gets signed. The pairing is part of the wire format: an
/// issuer and a verifier using different digests will never agree.
pub trait SignatureSuite: Send + Sync {
    /// Proof type tag this suite produces.
    fn tag(&self) -> SuiteTag;

    /// Hash a canonical payload.
    fn digest(&self, payload: &[u8]) -> Vec<u8>;

    /// Sign a digest. Fails with `InvalidKey` when the secret key has the
    /// wrong length or is not valid for this suite.
    fn sign(&self, secret_key: &[u8], digest: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Verify a signature over a digest. Malformed keys or signatures yield `false`.
    fn verify(&self, public_key: &[u8], digest: &[u8], signature: &[u8]) -> bool;

    /// Derive the public key for a secret key.
    fn public_key(&self, secret_key: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Bring a public key into the single form used for equality checks.
    fn normalize_public_key(&self, public_key: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Hash then sign.
    fn sign_payload(&self, secret_key: &[u8], payload: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.sign(secret_key, &self.digest(payload))
    }

    /// Hash then verify.
    fn verify_payload(&self, public_key: &[u8], payload: &[u8], signature: &[u8]) -> bool {
        self.verify(public_key, &self.digest(payload), signature)
    }
}

/// Suites available to signers and verifiers, looked up by proof tag.
#[derive(Clone)]
pub struct SuiteRegistry {
    suites: HashMap<SuiteTag, Arc<dyn SignatureSuite>>,
}

impl SuiteRegistry {
    /// Registry with every suite built into this crate.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(Ed25519Suite));
        registry.register(Arc::new(Secp256k1Suite));
        registry
    }

    /// Registry with no suites.
    pub fn empty() -> Self {
        Self {
            suites: HashMap::new(),
        }
    }

    /// Register a suite under its own tag, replacing any previous one.
    pub fn register(&mut self, suite: Arc<dyn SignatureSuite>) {
        self.suites.insert(suite.tag(), suite);
    }

    /// Look up the suite for a proof tag.
    pub fn get(&self, tag: SuiteTag) -> Result<Arc<dyn SignatureSuite>, CryptoError> {
        self.suites
            .get(&tag)
            .cloned()
            .ok_or(CryptoError::UnsupportedSuite(tag))
    }

    pub fn supports(&self, tag: SuiteTag) -> bool {
        self.suites.contains_key(&tag)
    }

    pub fn tags(&self) -> Vec<SuiteTag> {
        self.suites.keys().copied().collect()
    }
}

impl Default for SuiteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SuiteRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiteRegistry")
            .field("suites", &self.tags())
            .finish()
    }
}
