use metablox_core::{CoreError, Did, ErrorKind, SuiteTag};
use metablox_crypto::CryptoError;
use metablox_identity::IdentityError;

/// Credential system errors.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    #[error("{did} has no {suite} verification method")]
    NoVerificationMethod { did: Did, suite: SuiteTag },

    #[error("key is for {key}, proof expects {proof}")]
    KeySuiteMismatch { key: SuiteTag, proof: SuiteTag },

    #[error("credential not found: {0}")]
    CredentialNotFound(String),

    #[error("credential subject {subject} does not match wallet owner {owner}")]
    SubjectMismatch { subject: String, owner: Did },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),
}

impl CredentialError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCredential(_)
            | Self::SubjectMismatch { .. }
            | Self::Serialization(_) => ErrorKind::MalformedInput,
            Self::NoVerificationMethod { .. } | Self::CredentialNotFound(_) => ErrorKind::NotFound,
            Self::KeySuiteMismatch { .. } => ErrorKind::SuiteMismatch,
            Self::Core(e) => e.kind(),
            Self::Crypto(e) => e.kind(),
            Self::Identity(e) => e.kind(),
        }
    }
}
