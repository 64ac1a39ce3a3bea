//! Detached JWS (RFC 7515 + RFC 7797 `b64: false`) carrying a raw signature.
//!
//! Form: `base64url(header) ".." base64url(signature)`. The payload segment is
//! empty because the signed bytes are re-derived by the verifier.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use metablox_core::SuiteTag;
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct JwsHeader {
    alg: String,
    b64: bool,
    crit: Vec<String>,
}

/// Parsed detached JWS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetachedJws {
    /// JOSE algorithm from the protected header.
    pub alg: String,
    /// Raw signature bytes.
    pub signature: Vec<u8>,
}

impl DetachedJws {
    /// Whether the header algorithm is the one the suite writes.
    pub fn matches_suite(&self, suite: SuiteTag) -> bool {
        self.alg == suite.jws_alg()
    }
}

/// Wrap a raw signature produced by `suite` into a detached JWS string.
pub fn encode_detached(suite: SuiteTag, signature: &[u8]) -> Result<String, CryptoError> {
    let header = JwsHeader {
        alg: suite.jws_alg().to_string(),
        b64: false,
        crit: vec!["b64".to_string()],
    };
    let header_json = serde_json::to_vec(&header)
        .map_err(|e| CryptoError::InvalidInput(format!("jws header: {}", e)))?;
    Ok(format!(
        "{}..{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

/// Parse a detached JWS string.
pub fn decode_detached(jws: &str) -> Result<DetachedJws, CryptoError> {
    let (header_b64, signature_b64) = jws
        .split_once("..")
        .ok_or_else(|| CryptoError::InvalidEncoding("JWS is not in detached form".into()))?;
    if signature_b64.contains('.') {
        return Err(CryptoError::InvalidEncoding("JWS has extra segments".into()));
    }
    let header_json = URL_SAFE_NO_PAD
        .decode(header_b64)
        .map_err(|e| CryptoError::InvalidEncoding(format!("JWS header: {}", e)))?;
    let header: JwsHeader = serde_json::from_slice(&header_json)
        .map_err(|e| CryptoError::InvalidEncoding(format!("JWS header: {}", e)))?;
    if header.b64 || !header.crit.iter().any(|c| c == "b64") {
        return Err(CryptoError::InvalidEncoding(
            "JWS must declare an unencoded detached payload".into(),
        ));
    }
    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|e| CryptoError::InvalidEncoding(format!("JWS signature: {}", e)))?;
    Ok(DetachedJws {
        alg: header.alg,
        signature,
    })
}
