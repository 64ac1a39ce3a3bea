use metablox_core::SuiteTag;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::ed25519::Ed25519Suite;
use crate::error::CryptoError;
use crate::multibase;
use crate::secp256k1::Secp256k1Suite;
use crate::suite::SignatureSuite;

/// A secret key together with the suite it belongs to and its public key.
/// Secret material is zeroized on drop.
pub struct KeyPair {
    suite: SuiteTag,
    secret: Zeroizing<Vec<u8>>,
    public: Vec<u8>,
}

impl KeyPair {
    /// Generate a new random key pair using OS-provided entropy.
    pub fn generate(suite: SuiteTag) -> Self {
        let (secret, public) = match suite {
            SuiteTag::Ed25519Signature2020 => {
                let key = ed25519_dalek::SigningKey::generate(&mut OsRng);
                (
                    Zeroizing::new(key.to_bytes().to_vec()),
                    key.verifying_key().to_bytes().to_vec(),
                )
            }
            SuiteTag::EcdsaSecp256k1Signature2019 => {
                let key = k256::ecdsa::SigningKey::random(&mut OsRng);
                (
                    Zeroizing::new(key.to_bytes().to_vec()),
                    key.verifying_key()
                        .to_encoded_point(true)
                        .as_bytes()
                        .to_vec(),
                )
            }
        };
        Self {
            suite,
            secret,
            public,
        }
    }

    /// Wrap existing secret key bytes.
    pub fn from_secret(suite: SuiteTag, secret: &[u8]) -> Result<Self, CryptoError> {
        let public = match suite {
            SuiteTag::Ed25519Signature2020 => Ed25519Suite.public_key(secret)?,
            SuiteTag::EcdsaSecp256k1Signature2019 => Secp256k1Suite.public_key(secret)?,
        };
        Ok(Self {
            suite,
            secret: Zeroizing::new(secret.to_vec()),
            public,
        })
    }

    pub fn suite(&self) -> SuiteTag {
        self.suite
    }

    /// Public key bytes (Ed25519: 32 bytes; secp256k1: 33-byte compressed SEC1).
    pub fn public_key(&self) -> &[u8] {
        &self.public
    }

    /// Public key as base58btc multibase.
    pub fn public_key_multibase(&self) -> String {
        multibase::encode_base58btc(&self.public)
    }

    /// Raw secret key bytes. Prefer passing the key pair to signing helpers.
    pub fn secret_bytes(&self) -> &[u8] {
        &self.secret
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("suite", &self.suite)
            .field("public", &self.public_key_multibase())
            .finish_non_exhaustive()
    }
}
