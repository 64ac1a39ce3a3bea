use chrono::{DateTime, Utc};
use metablox_core::{utc_now, CanonicalBytes, Did, SuiteTag};
use metablox_crypto::{KeyPair, SignatureSuite, SuiteRegistry};
use metablox_identity::DidDocument;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::CredentialError;
use crate::proof::{self, Proof, ASSERTION_METHOD};

/// JSON-LD context of credentials and presentations.
pub const CREDENTIALS_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";
/// First entry of every credential's `type`.
pub const VERIFIABLE_CREDENTIAL: &str = "VerifiableCredential";

/// A W3C Verifiable Credential anchored to a MetaBlox issuer DID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableCredential {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub id: String,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    pub issuer: Did,
    pub issuance_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub credential_subject: Value,
    pub proof: Proof,
}

impl VerifiableCredential {
    /// Unsigned credential issued by `issuer`, with a proof skeleton for
    /// `suite` pointing at the issuer's first key of that suite.
    pub fn create(issuer: &DidDocument, suite: SuiteTag) -> Result<Self, CredentialError> {
        let method = issuer
            .verification_method
            .iter()
            .find(|vm| vm.suite() == Some(suite))
            .ok_or_else(|| CredentialError::NoVerificationMethod {
                did: issuer.id.clone(),
                suite,
            })?;

        Ok(Self {
            context: vec![CREDENTIALS_CONTEXT.to_string()],
            id: format!("urn:uuid:{}", Uuid::now_v7()),
            types: vec![VERIFIABLE_CREDENTIAL.to_string()],
            issuer: issuer.id.clone(),
            issuance_date: utc_now(),
            expiration_date: None,
            description: None,
            credential_subject: Value::Object(Default::default()),
            proof: Proof::new(suite, method.id.clone(), ASSERTION_METHOD),
        })
    }

    /// Parse a credential, reporting an unknown proof suite as such.
    pub fn from_json(json: &str) -> Result<Self, CredentialError> {
        let value: Value = serde_json::from_str(json)?;
        proof::check_proof_type(&value)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Replace the subject claims.
    pub fn set_subject(&mut self, subject: &impl Serialize) -> Result<(), CredentialError> {
        let value = serde_json::to_value(subject)?;
        if !value.is_object() {
            return Err(CredentialError::InvalidCredential(
                "credential subject must be a JSON object".into(),
            ));
        }
        self.credential_subject = value;
        Ok(())
    }

    /// Append a type. Duplicates are ignored.
    pub fn add_type(&mut self, credential_type: impl Into<String>) {
        let t = credential_type.into();
        if !self.types.contains(&t) {
            self.types.push(t);
        }
    }

    pub fn with_expiration(mut self, expiration: DateTime<Utc>) -> Self {
        self.expiration_date = Some(expiration);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// `credentialSubject.id`, if present.
    pub fn subject_id(&self) -> Option<&str> {
        self.credential_subject.get("id").and_then(Value::as_str)
    }

    /// Canonical bytes covered by the issuer's signature.
    ///
    /// Everything except `proof.jws` and `proof.publicKeyMultibase`.
    pub fn signing_payload(&self) -> Result<CanonicalBytes, CredentialError> {
        let mut value = serde_json::to_value(self)?;
        proof::strip_signature(&mut value);
        Ok(CanonicalBytes::from_value(value)?)
    }

    /// Fill in the signature fields of the proof.
    pub fn attach_signature(&mut self, jws: String, public_key_multibase: String) {
        let value = self.proof.value_mut();
        value.jws = jws;
        value.public_key_multibase = public_key_multibase;
    }

    /// Hash the payload with the proof's suite, sign it and attach the result.
    pub fn sign(&mut self, key: &KeyPair, suites: &SuiteRegistry) -> Result<(), CredentialError> {
        let tag = self.proof.suite();
        if key.suite() != tag {
            return Err(CredentialError::KeySuiteMismatch {
                key: key.suite(),
                proof: tag,
            });
        }
        let suite = suites.get(tag)?;
        let payload = self.signing_payload()?;
        let digest = suite.digest(payload.as_bytes());
        let jws = proof::create_signature(suite.as_ref(), key.secret_bytes(), &digest)?;
        self.attach_signature(jws, key.public_key_multibase());
        Ok(())
    }

    pub fn is_signed(&self) -> bool {
        self.proof.is_signed()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration_date.is_some_and(|exp| now > exp)
    }
}
