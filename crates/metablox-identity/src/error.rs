use metablox_core::{ChainName, CoreError, ErrorKind};
use metablox_crypto::CryptoError;

/// Identity-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("invalid DID format: {0}")]
    InvalidDid(String),

    #[error("no identifier scheme for chain: {0}")]
    UnknownChain(ChainName),

    #[error("chain is not initialized: {0}")]
    UnsupportedChain(ChainName),

    #[error("no bound contract registered for chain: {0}")]
    UnregisteredChain(ChainName),

    #[error("chain registry used before initialization")]
    RegistryNotInitialized,

    #[error("bound contract for {contract} cannot resolve a DID on {did_chain}")]
    ContractChainMismatch {
        did_chain: ChainName,
        contract: ChainName,
    },

    #[error("DID not found: {0}")]
    DidNotFound(String),

    #[error("anchor record does not match {did}: {detail}")]
    KeyMismatch { did: String, detail: String },

    #[error("chain anchor lookup failed: {0}")]
    AnchorLookup(String),

    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

impl IdentityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDid(_) | Self::KeyMismatch { .. } => ErrorKind::MalformedInput,
            Self::UnknownChain(_)
            | Self::UnsupportedChain(_)
            | Self::UnregisteredChain(_)
            | Self::DidNotFound(_) => ErrorKind::NotFound,
            Self::RegistryNotInitialized | Self::ContractChainMismatch { .. } => {
                ErrorKind::Configuration
            }
            Self::AnchorLookup(_) => ErrorKind::Internal,
            Self::Core(e) => e.kind(),
            Self::Crypto(e) => e.kind(),
        }
    }
}
