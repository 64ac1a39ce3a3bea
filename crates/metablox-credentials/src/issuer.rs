use chrono::{DateTime, Utc};
use std::sync::Arc;

use metablox_core::Did;
use metablox_crypto::{KeyPair, SuiteRegistry};
use metablox_identity::DidDocument;
use serde::Serialize;

use crate::credential::VerifiableCredential;
use crate::error::CredentialError;
use crate::subject::TypedSubject;

/// Issues verifiable credentials signed by the issuer's key pair.
pub struct CredentialIssuer {
    /// Resolved document of the issuer DID.
    document: DidDocument,
    /// Issuer's signing key pair.
    keypair: KeyPair,
    suites: Arc<SuiteRegistry>,
}

impl CredentialIssuer {
    pub fn new(document: DidDocument, keypair: KeyPair, suites: Arc<SuiteRegistry>) -> Self {
        Self {
            document,
            keypair,
            suites,
        }
    }

    pub fn did(&self) -> &Did {
        &self.document.id
    }

    pub fn document(&self) -> &DidDocument {
        &self.document
    }

    /// Issue a credential over arbitrary claims.
    pub fn issue(
        &self,
        subject: &impl Serialize,
        credential_types: &[&str],
    ) -> Result<VerifiableCredential, CredentialError> {
        self.issue_inner(subject, credential_types, None)
    }

    /// Issue a credential that stops verifying after `expiration`.
    pub fn issue_with_expiration(
        &self,
        subject: &impl Serialize,
        credential_types: &[&str],
        expiration: DateTime<Utc>,
    ) -> Result<VerifiableCredential, CredentialError> {
        self.issue_inner(subject, credential_types, Some(expiration))
    }

    /// Issue a credential for a typed subject, tagging it with the subject's type.
    ///
    /// The subject must name a well-formed DID.
    pub fn issue_typed<S: TypedSubject>(
        &self,
        subject: &S,
    ) -> Result<VerifiableCredential, CredentialError> {
        Did::new(subject.subject_id()).map_err(|e| {
            CredentialError::InvalidCredential(format!("{} subject: {}", S::CREDENTIAL_TYPE, e))
        })?;
        self.issue_inner(subject, &[S::CREDENTIAL_TYPE], None)
    }

    fn issue_inner(
        &self,
        subject: &impl Serialize,
        credential_types: &[&str],
        expiration: Option<DateTime<Utc>>,
    ) -> Result<VerifiableCredential, CredentialError> {
        let mut vc = VerifiableCredential::create(&self.document, self.keypair.suite())?;
        vc.set_subject(subject)?;
        for t in credential_types {
            vc.add_type(*t);
        }
        if let Some(exp) = expiration {
            vc = vc.with_expiration(exp);
        }
        vc.sign(&self.keypair, &self.suites)?;

        tracing::info!(
            issuer = %self.document.id,
            subject = vc.subject_id().unwrap_or("-"),
            credential_id = %vc.id,
            suite = %vc.proof.suite(),
            "credential issued"
        );

        Ok(vc)
    }
}

impl std::fmt::Debug for CredentialIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialIssuer")
            .field("did", &self.document.id)
            .field("keypair", &self.keypair)
            .finish()
    }
}
