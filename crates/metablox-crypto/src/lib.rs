//! MetaBlox cryptography: pluggable signature suites, digests, multibase
//! key encoding and detached JWS signatures.

pub mod ed25519;
pub mod error;
pub mod hashing;
pub mod jws;
pub mod keys;
pub mod multibase;
pub mod secp256k1;
pub mod suite;

pub use ed25519::Ed25519Suite;
pub use error::CryptoError;
pub use hashing::{keccak256, sha256, sha512};
pub use jws::{decode_detached, encode_detached, DetachedJws};
pub use keys::KeyPair;
pub use secp256k1::Secp256k1Suite;
pub use suite::{SignatureSuite, SuiteRegistry};
