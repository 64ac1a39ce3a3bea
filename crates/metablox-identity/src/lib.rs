//! MetaBlox Identity Layer
//!
//! Chain-anchored decentralized identifiers:
//! - DID codec with per-chain identifier schemes
//! - DID Documents (W3C-compatible)
//! - Bound contracts and the chain registry
//! - DID resolution (cache first, then chain anchor)

pub mod cache;
pub mod chain_anchor;
pub mod codec;
pub mod did_resolver;
pub mod document;
pub mod error;

pub use cache::DocumentCache;
pub use chain_anchor::{AnchorRecord, BoundContract, ChainRegistry, InMemoryBoundContract};
pub use codec::{
    Base58KeyScheme, DecodedDid, DidCodec, IdentifierScheme, KeccakAddressScheme, KeyMaterial,
};
pub use did_resolver::{DidDocumentResolver, DidResolver, ResolutionMetadata, ResolutionSource};
pub use document::{DidDocument, VerificationMethod};
pub use error::IdentityError;
