use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use metablox_core::SuiteTag;

use crate::error::CryptoError;
use crate::hashing::sha512;
use crate::suite::SignatureSuite;

/// Ed25519 suite. Signs the SHA-512 digest of the payload, not the payload itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Suite;

pub const PUBLIC_KEY_LENGTH: usize = 32;
pub const SIGNATURE_LENGTH: usize = 64;

/// Accepts a 32-byte seed or the 64-byte `seed || public` form.
pub(crate) fn signing_key(secret: &[u8]) -> Result<SigningKey, CryptoError> {
    match secret.len() {
        32 => {
            let mut seed = [0u8; 32];
            seed.copy_from_slice(secret);
            let key = SigningKey::from_bytes(&seed);
            zeroize::Zeroize::zeroize(&mut seed);
            Ok(key)
        }
        64 => {
            let mut keypair = [0u8; 64];
            keypair.copy_from_slice(secret);
            let key = SigningKey::from_keypair_bytes(&keypair).map_err(|_| {
                CryptoError::InvalidKey {
                    suite: SuiteTag::Ed25519Signature2020,
                    detail: "public half does not match seed".into(),
                }
            });
            zeroize::Zeroize::zeroize(&mut keypair);
            key
        }
        n => Err(CryptoError::InvalidKey {
            suite: SuiteTag::Ed25519Signature2020,
            detail: format!("expected 32 or 64 secret key bytes, got {}", n),
        }),
    }
}

fn verifying_key(public_key: &[u8]) -> Result<VerifyingKey, CryptoError> {
    let bytes: [u8; PUBLIC_KEY_LENGTH] =
        public_key
            .try_into()
            .map_err(|_| CryptoError::InvalidKey {
                suite: SuiteTag::Ed25519Signature2020,
                detail: format!(
                    "expected {} public key bytes, got {}",
                    PUBLIC_KEY_LENGTH,
                    public_key.len()
                ),
            })?;
    VerifyingKey::from_bytes(&bytes).map_err(|e| CryptoError::InvalidKey {
        suite: SuiteTag::Ed25519Signature2020,
        detail: e.to_string(),
    })
}

impl SignatureSuite for Ed25519Suite {
    fn tag(&self) -> SuiteTag {
        SuiteTag::Ed25519Signature2020
    }

    fn digest(&self, payload: &[u8]) -> Vec<u8> {
        sha512(payload).to_vec()
    }

    fn sign(&self, secret_key: &[u8], digest: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let key = signing_key(secret_key)?;
        Ok(key.sign(digest).to_bytes().to_vec())
    }

    fn verify(&self, public_key: &[u8], digest: &[u8], signature: &[u8]) -> bool {
        let Ok(key) = verifying_key(public_key) else {
            return false;
        };
        let Ok(sig_bytes) = <[u8; SIGNATURE_LENGTH]>::try_from(signature) else {
            return false;
        };
        key.verify(digest, &Signature::from_bytes(&sig_bytes)).is_ok()
    }

    fn public_key(&self, secret_key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(signing_key(secret_key)?.verifying_key().to_bytes().to_vec())
    }

    fn normalize_public_key(&self, public_key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(verifying_key(public_key)?.to_bytes().to_vec())
    }
}
