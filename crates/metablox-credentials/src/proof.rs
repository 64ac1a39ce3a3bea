//! Proof objects attached to credentials and presentations.
//!
//! A proof is tagged on the wire by its suite (`"type": "Ed25519Signature2020"`)
//! and carries the signature as a detached JWS. The signing payload of the
//! enclosing document covers the whole proof except `jws` and
//! `publicKeyMultibase`, see [`strip_signature`].

use chrono::{DateTime, Utc};
use metablox_core::{utc_now, SuiteTag};
use metablox_crypto::{decode_detached, encode_detached, SignatureSuite};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::error::CredentialError;

/// Proof purpose for credential issuance.
pub const ASSERTION_METHOD: &str = "assertionMethod";
/// Proof purpose for presentations.
pub const AUTHENTICATION: &str = "authentication";

/// Fields shared by every proof suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofValue {
    pub created: DateTime<Utc>,
    /// DID URL of the signing key (e.g. `did:metablox:solana:<id>#keys-1`).
    pub verification_method: String,
    pub proof_purpose: String,
    /// Multibase public key of the signer. Empty until signed.
    #[serde(default)]
    pub public_key_multibase: String,
    /// Detached JWS over the signing payload. Empty until signed.
    #[serde(default)]
    pub jws: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Proof {
    Ed25519Signature2020(ProofValue),
    EcdsaSecp256k1Signature2019(ProofValue),
}

impl Proof {
    /// Unsigned proof skeleton with `created` set to now.
    pub fn new(suite: SuiteTag, verification_method: String, proof_purpose: &str) -> Self {
        let value = ProofValue {
            created: utc_now(),
            verification_method,
            proof_purpose: proof_purpose.to_string(),
            public_key_multibase: String::new(),
            jws: String::new(),
        };
        match suite {
            SuiteTag::Ed25519Signature2020 => Self::Ed25519Signature2020(value),
            SuiteTag::EcdsaSecp256k1Signature2019 => Self::EcdsaSecp256k1Signature2019(value),
        }
    }

    pub fn suite(&self) -> SuiteTag {
        match self {
            Self::Ed25519Signature2020(_) => SuiteTag::Ed25519Signature2020,
            Self::EcdsaSecp256k1Signature2019(_) => SuiteTag::EcdsaSecp256k1Signature2019,
        }
    }

    pub fn value(&self) -> &ProofValue {
        match self {
            Self::Ed25519Signature2020(v) | Self::EcdsaSecp256k1Signature2019(v) => v,
        }
    }

    pub fn value_mut(&mut self) -> &mut ProofValue {
        match self {
            Self::Ed25519Signature2020(v) | Self::EcdsaSecp256k1Signature2019(v) => v,
        }
    }

    /// Whether both the signature and the signer key are filled in.
    pub fn is_signed(&self) -> bool {
        let v = self.value();
        !v.jws.is_empty() && !v.public_key_multibase.is_empty()
    }
}

/// Remove the signature fields from the `proof` member of a serialized document.
pub(crate) fn strip_signature(document: &mut Value) {
    if let Some(proof) = document.get_mut("proof").and_then(Value::as_object_mut) {
        proof.remove("jws");
        proof.remove("publicKeyMultibase");
    }
}

/// Fail with a suite error if `document.proof.type` names no known suite.
///
/// Serde would reject such a proof with a generic "unknown variant" message;
/// this gives callers the suite-mismatch kind instead.
pub(crate) fn check_proof_type(document: &Value) -> Result<(), CredentialError> {
    if let Some(tag) = document
        .get("proof")
        .and_then(|p| p.get("type"))
        .and_then(Value::as_str)
    {
        SuiteTag::from_str(tag)?;
    }
    Ok(())
}

/// Sign a payload digest and wrap the signature in a detached JWS.
pub fn create_signature(
    suite: &dyn SignatureSuite,
    secret_key: &[u8],
    digest: &[u8],
) -> Result<String, CredentialError> {
    let signature = suite.sign(secret_key, digest)?;
    Ok(encode_detached(suite.tag(), &signature)?)
}

/// Check a detached JWS over a digest. Malformed input yields `false`.
pub fn verify_signature(
    suite: &dyn SignatureSuite,
    public_key: &[u8],
    digest: &[u8],
    jws: &str,
) -> bool {
    match decode_detached(jws) {
        Ok(parsed) if parsed.matches_suite(suite.tag()) => {
            suite.verify(public_key, digest, &parsed.signature)
        }
        _ => false,
    }
}
