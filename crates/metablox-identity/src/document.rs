use metablox_core::{Did, SuiteTag};
use metablox_crypto::multibase;
use metablox_crypto::SignatureSuite;
use serde::{Deserialize, Serialize};

/// JSON-LD context of a DID Document.
pub const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";

/// A verification method within a DID Document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// Method identifier (e.g., "did:metablox:solana:<id>#keys-1").
    pub id: String,
    /// Key type (e.g., "Ed25519VerificationKey2020").
    #[serde(rename = "type")]
    pub method_type: String,
    /// The DID that controls this key.
    pub controller: Did,
    /// Multibase (base58btc) public key.
    pub public_key_multibase: String,
}

impl VerificationMethod {
    /// Suite whose verification key type this method carries, if known.
    pub fn suite(&self) -> Option<SuiteTag> {
        SuiteTag::ALL
            .into_iter()
            .find(|tag| tag.verification_key_type() == self.method_type)
    }

    /// Decoded public key bytes, or `None` if the multibase value is invalid.
    pub fn public_key(&self) -> Option<Vec<u8>> {
        multibase::decode(&self.public_key_multibase)
            .ok()
            .map(|(_, bytes)| bytes)
    }
}

/// Resolved DID Document: the subject DID and its verification methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub id: Did,
    pub verification_method: Vec<VerificationMethod>,
    /// Method ids usable for authentication (presentations).
    #[serde(default)]
    pub authentication: Vec<String>,
    /// Method ids usable for assertions (credential issuance).
    #[serde(default)]
    pub assertion_method: Vec<String>,
}

impl DidDocument {
    /// Document with a single verification method `#keys-1`.
    pub fn new(id: Did, suite: SuiteTag, public_key: &[u8]) -> Self {
        let mut doc = Self {
            context: vec![DID_CONTEXT.to_string()],
            id,
            verification_method: Vec::new(),
            authentication: Vec::new(),
            assertion_method: Vec::new(),
        };
        doc.add_verification_method(suite, public_key);
        doc
    }

    /// Append a verification method and return its id.
    pub fn add_verification_method(&mut self, suite: SuiteTag, public_key: &[u8]) -> String {
        let idx = self.verification_method.len() + 1;
        let id = format!("{}#keys-{}", self.id, idx);
        self.verification_method.push(VerificationMethod {
            id: id.clone(),
            method_type: suite.verification_key_type().to_string(),
            controller: self.id.clone(),
            public_key_multibase: multibase::encode_base58btc(public_key),
        });
        self.authentication.push(id.clone());
        self.assertion_method.push(id.clone());
        id
    }

    /// The first verification method.
    pub fn primary(&self) -> Option<&VerificationMethod> {
        self.verification_method.first()
    }

    pub fn verification_method(&self, id: &str) -> Option<&VerificationMethod> {
        self.verification_method.iter().find(|vm| vm.id == id)
    }

    /// Whether `public_key` is one of this document's keys for `suite`.
    ///
    /// Keys are compared in the suite's normalized form, so a compressed and
    /// an uncompressed secp256k1 encoding of the same point match.
    pub fn has_verification_key(&self, suite: &dyn SignatureSuite, public_key: &[u8]) -> bool {
        let Ok(wanted) = suite.normalize_public_key(public_key) else {
            return false;
        };
        self.verification_method
            .iter()
            .filter(|vm| vm.suite() == Some(suite.tag()))
            .filter_map(|vm| vm.public_key())
            .filter_map(|pk| suite.normalize_public_key(&pk).ok())
            .any(|pk| pk == wanted)
    }
}
