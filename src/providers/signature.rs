//! Webhook signature helpers shared by the adapters

use crate::error::{Error, Result};
use hmac::{Hmac, Mac};
use reqwest::header::HeaderMap;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 of `message` under `key`
pub(crate) fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|e| Error::InvalidSignature {
        message: e.to_string(),
    })?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Constant-time check of an HMAC-SHA256 tag
pub(crate) fn verify_hmac_sha256(key: &[u8], message: &[u8], tag: &[u8]) -> Result<bool> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|e| Error::InvalidSignature {
        message: e.to_string(),
    })?;
    mac.update(message);
    Ok(mac.verify_slice(tag).is_ok())
}

/// SHA-256 digest of the concatenated parts
pub(crate) fn sha256(parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().to_vec()
}

/// Compare a SHA-256 digest against a hex-encoded one in constant time
///
/// Returns `false` when `expected_hex` is not valid hex.
pub(crate) fn digest_matches_hex(actual: &[u8], expected_hex: &str) -> bool {
    match hex::decode(expected_hex.trim()) {
        Ok(expected) => actual.ct_eq(&expected).into(),
        Err(_) => false,
    }
}

/// A required signature header as text
pub(crate) fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::MissingSignature {
            header: name.to_string(),
        })
}
