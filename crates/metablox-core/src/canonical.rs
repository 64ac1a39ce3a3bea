//! Canonical byte encoding for signing payloads.
//!
//! Signature validity depends bit-exactly on the issuer and the verifier
//! producing the same bytes, so every payload that gets hashed is built as a
//! [`CanonicalBytes`]:
//!
//! - the value is first rendered through serde into a JSON tree,
//! - non-integer numbers are rejected (their textual form is not stable),
//! - the tree is written as RFC 8785 JCS: object keys sorted, no whitespace.
//!
//! Timestamps are rendered by chrono as RFC 3339 strings with a `Z` suffix;
//! callers create them with [`crate::types::utc_now`] so they carry whole
//! seconds only.

use serde::Serialize;
use serde_json::Value;

use crate::error::CoreError;

/// Bytes produced by the canonicalization pipeline. The inner buffer is
/// private, so the only way to get one is [`CanonicalBytes::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    pub fn new(obj: &impl Serialize) -> Result<Self, CoreError> {
        let value = serde_json::to_value(obj)?;
        Self::from_value(value)
    }

    /// Canonicalize an already-built JSON tree.
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        reject_floats(&value)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn reject_floats(value: &Value) -> Result<(), CoreError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
        Value::Number(n) => {
            if !n.is_i64() && !n.is_u64() {
                return Err(CoreError::FloatRejected(n.as_f64().unwrap_or(f64::NAN)));
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(reject_floats),
        Value::Object(map) => map.values().try_for_each(reject_floats),
    }
}
