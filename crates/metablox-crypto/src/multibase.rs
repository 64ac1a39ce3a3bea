//! Self-describing multibase text encoding for public keys.
//!
//! The first character names the alphabet. Keys are always written as
//! base58btc (`z`); lowercase base16 (`f`) is accepted on input.

use crate::error::CryptoError;

/// Supported multibase alphabets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base {
    Base58Btc,
    Base16Lower,
}

impl Base {
    pub fn prefix(&self) -> char {
        match self {
            Self::Base58Btc => 'z',
            Self::Base16Lower => 'f',
        }
    }

    fn from_prefix(c: char) -> Result<Self, CryptoError> {
        match c {
            'z' => Ok(Self::Base58Btc),
            'f' => Ok(Self::Base16Lower),
            other => Err(CryptoError::UnsupportedEncoding(other)),
        }
    }
}

/// Encode bytes with the given alphabet.
pub fn encode(base: Base, bytes: &[u8]) -> String {
    let body = match base {
        Base::Base58Btc => bs58::encode(bytes).into_string(),
        Base::Base16Lower => hex::encode(bytes),
    };
    format!("{}{}", base.prefix(), body)
}

/// Encode bytes as base58btc (`z...`).
pub fn encode_base58btc(bytes: &[u8]) -> String {
    encode(Base::Base58Btc, bytes)
}

/// Decode a multibase string, returning the alphabet it used.
pub fn decode(input: &str) -> Result<(Base, Vec<u8>), CryptoError> {
    let mut chars = input.chars();
    let prefix = chars
        .next()
        .ok_or_else(|| CryptoError::InvalidEncoding("empty multibase string".into()))?;
    let base = Base::from_prefix(prefix)?;
    let body = chars.as_str();
    if body.is_empty() {
        return Err(CryptoError::InvalidEncoding("multibase string has no payload".into()));
    }
    let bytes = match base {
        Base::Base58Btc => bs58::decode(body)
            .into_vec()
            .map_err(|e| CryptoError::InvalidEncoding(format!("invalid base58: {}", e)))?,
        Base::Base16Lower => {
            if body.bytes().any(|b| b.is_ascii_uppercase()) {
                return Err(CryptoError::InvalidEncoding(
                    "base16 multibase must be lowercase".into(),
                ));
            }
            hex::decode(body)
                .map_err(|e| CryptoError::InvalidEncoding(format!("invalid hex: {}", e)))?
        }
    };
    Ok((base, bytes))
}
