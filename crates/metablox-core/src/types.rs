use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// The fixed DID method literal for this system.
pub const DID_METHOD: &str = "metablox";

/// Chain label for Solana.
pub const SOLANA_CHAIN: &str = "solana";

/// Chain label for Ethereum.
pub const ETHEREUM_CHAIN: &str = "ethereum";

/// Current UTC time truncated to whole seconds.
///
/// Every timestamp that ends up in a signed payload goes through here so the
/// RFC 3339 rendering is identical on the issuing and verifying side.
pub fn utc_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Name of a chain a DID can be anchored on (e.g. `solana`, `ethereum`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChainName(String);

impl ChainName {
    /// Create a chain name. Must be non-empty lowercase ASCII letters, digits or `-`.
    pub fn new(name: impl Into<String>) -> Result<Self, CoreError> {
        let name = name.into();
        let valid = !name.is_empty()
            && name
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
        if !valid {
            return Err(CoreError::InvalidChain(name));
        }
        Ok(Self(name))
    }

    pub fn solana() -> Self {
        Self(SOLANA_CHAIN.to_string())
    }

    pub fn ethereum() -> Self {
        Self(ETHEREUM_CHAIN.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ChainName {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChainName> for String {
    fn from(value: ChainName) -> Self {
        value.0
    }
}

impl FromStr for ChainName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for ChainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decentralized Identifier.
/// Format: `did:metablox:<chain>:<identifier>`
///
/// Only the grammar is checked here. Whether the identifier is a valid
/// encoding for its chain is decided by the DID codec in `metablox-identity`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Did(String);

impl Did {
    /// Create a new DID from a full URI string.
    pub fn new(uri: impl Into<String>) -> Result<Self, CoreError> {
        let uri = uri.into();
        let parts: Vec<&str> = uri.split(':').collect();
        if parts.len() != 4 {
            return Err(CoreError::InvalidDid(format!(
                "DID must have format 'did:{}:<chain>:<identifier>', got: {}",
                DID_METHOD, uri
            )));
        }
        if parts[0] != "did" || parts[1] != DID_METHOD {
            return Err(CoreError::InvalidDid(format!(
                "DID must start with 'did:{}:', got: {}",
                DID_METHOD, uri
            )));
        }
        ChainName::new(parts[2])
            .map_err(|_| CoreError::InvalidDid(format!("invalid chain segment in {}", uri)))?;
        if parts[3].is_empty() {
            return Err(CoreError::InvalidDid(format!("empty identifier in {}", uri)));
        }
        Ok(Self(uri))
    }

    /// Create a DID from chain and identifier components.
    pub fn from_parts(chain: &ChainName, identifier: &str) -> Result<Self, CoreError> {
        Self::new(format!("did:{}:{}:{}", DID_METHOD, chain, identifier))
    }

    /// Get the full DID URI.
    pub fn uri(&self) -> &str {
        &self.0
    }

    /// The chain segment.
    pub fn chain(&self) -> ChainName {
        // Validated in `new`.
        ChainName(self.segment(2).to_string())
    }

    /// The chain-specific identifier segment.
    pub fn identifier(&self) -> &str {
        self.segment(3)
    }

    fn segment(&self, idx: usize) -> &str {
        self.0.split(':').nth(idx).unwrap_or_default()
    }
}

impl TryFrom<String> for Did {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Did> for String {
    fn from(value: Did) -> Self {
        value.0
    }
}

impl FromStr for Did {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signature suites a proof can be produced with.
///
/// The variant name is the proof `type` tag carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuiteTag {
    /// Ed25519 over a SHA-512 digest of the canonical payload.
    Ed25519Signature2020,
    /// ECDSA secp256k1 over a SHA-256 digest of the canonical payload.
    EcdsaSecp256k1Signature2019,
}

impl SuiteTag {
    /// All suites known to this build.
    pub const ALL: [SuiteTag; 2] = [
        SuiteTag::Ed25519Signature2020,
        SuiteTag::EcdsaSecp256k1Signature2019,
    ];

    /// Verification method type used in DID Documents for keys of this suite.
    pub fn verification_key_type(&self) -> &'static str {
        match self {
            Self::Ed25519Signature2020 => "Ed25519VerificationKey2020",
            Self::EcdsaSecp256k1Signature2019 => "EcdsaSecp256k1VerificationKey2019",
        }
    }

    /// JOSE `alg` value written into the detached JWS header.
    pub fn jws_alg(&self) -> &'static str {
        match self {
            Self::Ed25519Signature2020 => "EdDSA",
            Self::EcdsaSecp256k1Signature2019 => "ES256K",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ed25519Signature2020 => "Ed25519Signature2020",
            Self::EcdsaSecp256k1Signature2019 => "EcdsaSecp256k1Signature2019",
        }
    }
}

impl FromStr for SuiteTag {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SuiteTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| CoreError::UnknownSuite(s.to_string()))
    }
}

impl fmt::Display for SuiteTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
