//! MetaBlox Core — Fundamental types, errors, canonical encoding and
//! configuration for the MetaBlox DID trust layer.

pub mod canonical;
pub mod config;
pub mod error;
pub mod types;

pub use canonical::CanonicalBytes;
pub use config::MetabloxConfig;
pub use error::{CoreError, ErrorKind};
pub use types::{utc_now, ChainName, Did, SuiteTag, DID_METHOD, ETHEREUM_CHAIN, SOLANA_CHAIN};
