use metablox_core::{CanonicalBytes, Did};
use metablox_crypto::{KeyPair, SignatureSuite, SuiteRegistry};
use metablox_identity::DidDocument;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::credential::{VerifiableCredential, CREDENTIALS_CONTEXT};
use crate::error::CredentialError;
use crate::proof::{self, Proof, AUTHENTICATION};

/// First entry of every presentation's `type`.
pub const VERIFIABLE_PRESENTATION: &str = "VerifiablePresentation";

/// A holder-signed bundle of credentials, bound to a verifier-chosen nonce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiablePresentation {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    pub holder: Did,
    pub verifiable_credential: Vec<VerifiableCredential>,
    pub nonce: String,
    pub proof: Proof,
}

impl VerifiablePresentation {
    /// Build and sign a presentation of `credentials` by the holder of
    /// `holder_document`, using the suite of `holder_key`.
    pub fn create(
        credentials: Vec<VerifiableCredential>,
        holder_document: &DidDocument,
        holder_key: &KeyPair,
        nonce: impl Into<String>,
        suites: &SuiteRegistry,
    ) -> Result<Self, CredentialError> {
        let tag = holder_key.suite();
        let suite = suites.get(tag)?;
        let method = holder_document
            .verification_method
            .iter()
            .find(|vm| vm.suite() == Some(tag))
            .ok_or_else(|| CredentialError::NoVerificationMethod {
                did: holder_document.id.clone(),
                suite: tag,
            })?;

        let mut vp = Self {
            context: vec![CREDENTIALS_CONTEXT.to_string()],
            types: vec![VERIFIABLE_PRESENTATION.to_string()],
            holder: holder_document.id.clone(),
            verifiable_credential: credentials,
            nonce: nonce.into(),
            proof: Proof::new(tag, method.id.clone(), AUTHENTICATION),
        };

        let payload = vp.signing_payload()?;
        let digest = suite.digest(payload.as_bytes());
        let jws = proof::create_signature(suite.as_ref(), holder_key.secret_bytes(), &digest)?;
        let value = vp.proof.value_mut();
        value.jws = jws;
        value.public_key_multibase = holder_key.public_key_multibase();

        tracing::info!(
            holder = %vp.holder,
            credentials = vp.verifiable_credential.len(),
            suite = %tag,
            "presentation created"
        );
        Ok(vp)
    }

    /// Parse a presentation, reporting an unknown proof suite (on the
    /// presentation or any embedded credential) as such.
    pub fn from_json(json: &str) -> Result<Self, CredentialError> {
        let value: Value = serde_json::from_str(json)?;
        proof::check_proof_type(&value)?;
        if let Some(vcs) = value.get("verifiableCredential").and_then(Value::as_array) {
            for vc in vcs {
                proof::check_proof_type(vc)?;
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Canonical bytes covered by the holder's signature: holder, nonce,
    /// every embedded credential in full, and the proof without its
    /// signature fields.
    pub fn signing_payload(&self) -> Result<CanonicalBytes, CredentialError> {
        let mut value = serde_json::to_value(self)?;
        proof::strip_signature(&mut value);
        Ok(CanonicalBytes::from_value(value)?)
    }

    pub fn is_signed(&self) -> bool {
        self.proof.is_signed()
    }
}
