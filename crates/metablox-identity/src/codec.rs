//! DID codec: turns a public key plus chain into a DID and back.
//!
//! How the identifier segment is derived from a key is chain specific, so
//! each chain gets an [`IdentifierScheme`]:
//!
//! | chain      | suite     | identifier                                   | decodes to            |
//! |------------|-----------|----------------------------------------------|-----------------------|
//! | `solana`   | Ed25519   | base58btc(32-byte key), no multibase prefix  | `KeyMaterial::PublicKey` |
//! | `ethereum` | secp256k1 | `0x` + hex(keccak256(X‖Y)[12..])             | `KeyMaterial::Address`   |
//!
//! For address chains the public key itself only becomes known when the
//! chain anchor record is fetched during resolution.

use std::collections::HashMap;
use std::sync::Arc;

use metablox_core::{ChainName, Did, SuiteTag};
use metablox_crypto::secp256k1::uncompressed_public_key;
use metablox_crypto::{keccak256, Ed25519Suite, SignatureSuite};

use crate::error::IdentityError;

/// Key material recoverable from a DID identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyMaterial {
    /// The raw public key.
    PublicKey(Vec<u8>),
    /// A chain address derived from the public key.
    Address(Vec<u8>),
}

impl KeyMaterial {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::PublicKey(b) | Self::Address(b) => b,
        }
    }
}

/// Chain-specific identifier encoding.
pub trait IdentifierScheme: Send + Sync {
    /// Suite of the keys anchored on this chain.
    fn suite(&self) -> SuiteTag;

    /// Identifier segment for a public key.
    fn encode(&self, public_key: &[u8]) -> Result<String, IdentityError>;

    /// Key material carried by an identifier segment.
    fn decode(&self, identifier: &str) -> Result<KeyMaterial, IdentityError>;

    /// What `decode(encode(public_key))` yields, without the string step.
    fn material_for(&self, public_key: &[u8]) -> Result<KeyMaterial, IdentityError>;
}

/// Raw Ed25519 keys in base58 (Solana account format).
#[derive(Debug, Clone, Copy, Default)]
pub struct Base58KeyScheme;

impl IdentifierScheme for Base58KeyScheme {
    fn suite(&self) -> SuiteTag {
        SuiteTag::Ed25519Signature2020
    }

    fn encode(&self, public_key: &[u8]) -> Result<String, IdentityError> {
        let key = Ed25519Suite.normalize_public_key(public_key)?;
        Ok(bs58::encode(key).into_string())
    }

    fn decode(&self, identifier: &str) -> Result<KeyMaterial, IdentityError> {
        let bytes = bs58::decode(identifier)
            .into_vec()
            .map_err(|e| IdentityError::InvalidDid(format!("invalid base58 identifier: {}", e)))?;
        let key = Ed25519Suite
            .normalize_public_key(&bytes)
            .map_err(|e| IdentityError::InvalidDid(format!("identifier is not a key: {}", e)))?;
        Ok(KeyMaterial::PublicKey(key))
    }

    fn material_for(&self, public_key: &[u8]) -> Result<KeyMaterial, IdentityError> {
        Ok(KeyMaterial::PublicKey(
            Ed25519Suite.normalize_public_key(public_key)?,
        ))
    }
}

/// 20-byte Keccak address of a secp256k1 key (Ethereum account format).
#[derive(Debug, Clone, Copy, Default)]
pub struct KeccakAddressScheme;

impl KeccakAddressScheme {
    fn address(public_key: &[u8]) -> Result<Vec<u8>, IdentityError> {
        let uncompressed = uncompressed_public_key(public_key)?;
        let hash = keccak256(&uncompressed[1..]);
        Ok(hash[12..].to_vec())
    }
}

impl IdentifierScheme for KeccakAddressScheme {
    fn suite(&self) -> SuiteTag {
        SuiteTag::EcdsaSecp256k1Signature2019
    }

    fn encode(&self, public_key: &[u8]) -> Result<String, IdentityError> {
        Ok(format!("0x{}", hex::encode(Self::address(public_key)?)))
    }

    fn decode(&self, identifier: &str) -> Result<KeyMaterial, IdentityError> {
        let body = identifier
            .strip_prefix("0x")
            .ok_or_else(|| IdentityError::InvalidDid("address must start with 0x".into()))?;
        if body.len() != 40 || body.bytes().any(|b| b.is_ascii_uppercase()) {
            return Err(IdentityError::InvalidDid(
                "address must be 40 lowercase hex characters".into(),
            ));
        }
        let bytes = hex::decode(body)
            .map_err(|e| IdentityError::InvalidDid(format!("invalid address hex: {}", e)))?;
        Ok(KeyMaterial::Address(bytes))
    }

    fn material_for(&self, public_key: &[u8]) -> Result<KeyMaterial, IdentityError> {
        Ok(KeyMaterial::Address(Self::address(public_key)?))
    }
}

/// Result of decoding a DID string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDid {
    pub did: Did,
    pub chain: ChainName,
    pub material: KeyMaterial,
}

/// Per-chain identifier schemes.
#[derive(Clone)]
pub struct DidCodec {
    schemes: HashMap<ChainName, Arc<dyn IdentifierScheme>>,
}

impl DidCodec {
    /// Codec with the built-in `solana` and `ethereum` schemes.
    pub fn new() -> Self {
        let mut codec = Self::empty();
        codec.register(ChainName::solana(), Arc::new(Base58KeyScheme));
        codec.register(ChainName::ethereum(), Arc::new(KeccakAddressScheme));
        codec
    }

    pub fn empty() -> Self {
        Self {
            schemes: HashMap::new(),
        }
    }

    /// Register (or replace) the scheme for a chain.
    pub fn register(&mut self, chain: ChainName, scheme: Arc<dyn IdentifierScheme>) {
        self.schemes.insert(chain, scheme);
    }

    pub fn scheme(&self, chain: &ChainName) -> Result<Arc<dyn IdentifierScheme>, IdentityError> {
        self.schemes
            .get(chain)
            .cloned()
            .ok_or_else(|| IdentityError::UnknownChain(chain.clone()))
    }

    /// Build the DID for `public_key` on `chain`.
    pub fn encode(&self, public_key: &[u8], chain: &ChainName) -> Result<Did, IdentityError> {
        let identifier = self.scheme(chain)?.encode(public_key)?;
        Ok(Did::from_parts(chain, &identifier)?)
    }

    /// Split a DID into its chain and key material.
    pub fn decode(&self, did: &str) -> Result<DecodedDid, IdentityError> {
        let did = Did::new(did).map_err(|e| IdentityError::InvalidDid(e.to_string()))?;
        let chain = did.chain();
        let material = self.scheme(&chain)?.decode(did.identifier())?;
        Ok(DecodedDid {
            did,
            chain,
            material,
        })
    }
}

impl Default for DidCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DidCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut chains: Vec<&ChainName> = self.schemes.keys().collect();
        chains.sort();
        f.debug_struct("DidCodec").field("chains", &chains).finish()
    }
}
