//! MetaBlox Credentials: credential issuance, presentations, holder wallet,
//! and verification against chain-anchored DIDs.

pub mod credential;
pub mod error;
pub mod holder;
pub mod issuer;
pub mod presentation;
pub mod proof;
pub mod subject;
pub mod verifier;

pub use credential::{VerifiableCredential, CREDENTIALS_CONTEXT, VERIFIABLE_CREDENTIAL};
pub use error::CredentialError;
pub use holder::CredentialWallet;
pub use issuer::CredentialIssuer;
pub use presentation::{VerifiablePresentation, VERIFIABLE_PRESENTATION};
pub use proof::{create_signature, verify_signature, Proof, ProofValue};
pub use subject::{MiningLicenseInfo, TypedSubject};
pub use verifier::{
    CredentialVerifier, PresentationVerificationResult, VerificationCheck, VerificationPolicy,
    VerificationResult,
};
