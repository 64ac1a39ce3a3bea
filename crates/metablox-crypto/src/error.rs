use metablox_core::{ErrorKind, SuiteTag};

/// Cryptographic operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid {suite} key: {detail}")]
    InvalidKey { suite: SuiteTag, detail: String },

    #[error("signing failed: {0}")]
    SigningError(String),

    #[error("unsupported multibase encoding prefix: {0:?}")]
    UnsupportedEncoding(char),

    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("unsupported signature suite: {0}")]
    UnsupportedSuite(SuiteTag),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl CryptoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidKey { .. }
            | Self::UnsupportedEncoding(_)
            | Self::InvalidEncoding(_)
            | Self::InvalidInput(_) => ErrorKind::MalformedInput,
            Self::UnsupportedSuite(_) => ErrorKind::SuiteMismatch,
            Self::SigningError(_) => ErrorKind::Internal,
        }
    }
}
