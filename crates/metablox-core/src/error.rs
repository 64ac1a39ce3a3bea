/// Coarse error classification shared by every crate in the workspace.
///
/// Callers match on the kind when they only care whether a failure came from
/// bad input, a missing record, an unsupported algorithm or a setup mistake.
/// Signature and binding failures are never errors; they surface as a
/// verification result with `valid == false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad DID grammar, bad multibase, bad payload shape.
    MalformedInput,
    /// Unresolved DID, unregistered chain, missing anchor record.
    NotFound,
    /// A proof names a suite the verifier does not support.
    SuiteMismatch,
    /// The registry or configuration was not set up before use.
    Configuration,
    /// Anything else (I/O, unexpected backend failures).
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedInput => write!(f, "malformed-input"),
            Self::NotFound => write!(f, "not-found"),
            Self::SuiteMismatch => write!(f, "suite-mismatch"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

/// Core protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid DID format: {0}")]
    InvalidDid(String),

    #[error("invalid chain name: {0}")]
    InvalidChain(String),

    #[error("unknown signature suite: {0}")]
    UnknownSuite(String),

    #[error("floating point values cannot be canonicalized: {0}")]
    FloatRejected(f64),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDid(_)
            | Self::InvalidChain(_)
            | Self::FloatRejected(_)
            | Self::Serialization(_) => ErrorKind::MalformedInput,
            Self::UnknownSuite(_) => ErrorKind::SuiteMismatch,
            Self::Config(_) => ErrorKind::Configuration,
            Self::Io(_) => ErrorKind::Internal,
        }
    }
}
