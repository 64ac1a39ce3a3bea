use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use metablox_core::SuiteTag;

use crate::error::CryptoError;
use crate::hashing::sha256;
use crate::suite::SignatureSuite;

/// ECDSA over secp256k1. Signs the SHA-256 digest of the payload; signatures
/// are 64-byte `r || s` with low S.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Suite;

pub const SECRET_KEY_LENGTH: usize = 32;
pub const COMPRESSED_PUBLIC_KEY_LENGTH: usize = 33;
pub const UNCOMPRESSED_PUBLIC_KEY_LENGTH: usize = 65;

fn invalid_key(detail: impl ToString) -> CryptoError {
    CryptoError::InvalidKey {
        suite: SuiteTag::EcdsaSecp256k1Signature2019,
        detail: detail.to_string(),
    }
}

fn signing_key(secret: &[u8]) -> Result<SigningKey, CryptoError> {
    if secret.len() != SECRET_KEY_LENGTH {
        return Err(invalid_key(format!(
            "expected {} secret key bytes, got {}",
            SECRET_KEY_LENGTH,
            secret.len()
        )));
    }
    SigningKey::from_slice(secret).map_err(invalid_key)
}

fn verifying_key(public_key: &[u8]) -> Result<VerifyingKey, CryptoError> {
    VerifyingKey::from_sec1_bytes(public_key).map_err(invalid_key)
}

/// SEC1 uncompressed form (`0x04 || X || Y`) of a compressed or uncompressed key.
pub fn uncompressed_public_key(public_key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    Ok(verifying_key(public_key)?
        .to_encoded_point(false)
        .as_bytes()
        .to_vec())
}

impl SignatureSuite for Secp256k1Suite {
    fn tag(&self) -> SuiteTag {
        SuiteTag::EcdsaSecp256k1Signature2019
    }

    fn digest(&self, payload: &[u8]) -> Vec<u8> {
        sha256(payload).to_vec()
    }

    fn sign(&self, secret_key: &[u8], digest: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let key = signing_key(secret_key)?;
        let sig: Signature = key
            .sign_prehash(digest)
            .map_err(|e| CryptoError::SigningError(e.to_string()))?;
        let sig = sig.normalize_s().unwrap_or(sig);
        Ok(sig.to_bytes().to_vec())
    }

    fn verify(&self, public_key: &[u8], digest: &[u8], signature: &[u8]) -> bool {
        let Ok(key) = verifying_key(public_key) else {
            return false;
        };
        let Ok(sig) = Signature::from_slice(signature) else {
            return false;
        };
        key.verify_prehash(digest, &sig).is_ok()
    }

    fn public_key(&self, secret_key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(signing_key(secret_key)?
            .verifying_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec())
    }

    fn normalize_public_key(&self, public_key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(verifying_key(public_key)?
            .to_encoded_point(true)
            .as_bytes()
            .to_vec())
    }
}
