use dashmap::DashMap;

use metablox_core::Did;
use metablox_crypto::{KeyPair, SuiteRegistry};
use metablox_identity::DidDocument;

use crate::credential::VerifiableCredential;
use crate::error::CredentialError;
use crate::presentation::VerifiablePresentation;

/// Credential wallet for a holder: stores credentials issued to the holder
/// and wraps them into presentations.
pub struct CredentialWallet {
    /// Resolved document of the wallet owner.
    owner: DidDocument,
    /// Key used to sign presentations.
    keypair: KeyPair,
    /// Credential ID → VerifiableCredential.
    credentials: DashMap<String, VerifiableCredential>,
}

impl CredentialWallet {
    pub fn new(owner: DidDocument, keypair: KeyPair) -> Self {
        Self {
            owner,
            keypair,
            credentials: DashMap::new(),
        }
    }

    pub fn owner_did(&self) -> &Did {
        &self.owner.id
    }

    /// Store a credential. Its subject must be the wallet owner.
    pub fn store(&self, credential: VerifiableCredential) -> Result<(), CredentialError> {
        let subject = credential.subject_id().unwrap_or_default();
        if subject != self.owner.id.uri() {
            return Err(CredentialError::SubjectMismatch {
                subject: subject.to_string(),
                owner: self.owner.id.clone(),
            });
        }
        let id = credential.id.clone();
        self.credentials.insert(id.clone(), credential);
        tracing::debug!(credential_id = %id, "credential stored in wallet");
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<VerifiableCredential> {
        self.credentials.get(id).map(|e| e.clone())
    }

    pub fn list(&self) -> Vec<String> {
        self.credentials.iter().map(|e| e.key().clone()).collect()
    }

    /// Credentials carrying `credential_type`.
    pub fn list_by_type(&self, credential_type: &str) -> Vec<VerifiableCredential> {
        self.credentials
            .iter()
            .filter(|e| e.types.iter().any(|t| t == credential_type))
            .map(|e| e.value().clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    pub fn remove(&self, id: &str) -> Option<VerifiableCredential> {
        self.credentials.remove(id).map(|(_, vc)| vc)
    }

    /// Present the credentials with the given ids, in that order.
    pub fn present(
        &self,
        ids: &[&str],
        nonce: &str,
        suites: &SuiteRegistry,
    ) -> Result<VerifiablePresentation, CredentialError> {
        let credentials = ids
            .iter()
            .map(|id| {
                self.get(id)
                    .ok_or_else(|| CredentialError::CredentialNotFound(id.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        VerifiablePresentation::create(credentials, &self.owner, &self.keypair, nonce, suites)
    }
}
