//! Low-level helpers: random secrets, hashing, key derivation, comparison.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::TokenError;

type HmacSha256 = Hmac<Sha256>;

/// Domain label for the device-token key.
pub const DEVICE_KEY_LABEL: &str = "classnet/device-token/v1";

/// Domain label for the enrollment-ticket key.
pub const ENROLLMENT_KEY_LABEL: &str = "classnet/enrollment-ticket/v1";

/// `len` random bytes from the thread-local CSPRNG.
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

/// A URL-safe random secret carrying `bytes * 8` bits of entropy.
pub fn random_secret(bytes: usize) -> String {
    URL_SAFE_NO_PAD.encode(random_bytes(bytes))
}

/// Hash a token using SHA-256, hex encoded.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// HMAC-SHA256 of `message` under `key`.
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<Vec<u8>, TokenError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|_| TokenError::InvalidKey("HMAC key rejected".to_string()))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Derive an independent subkey of `secret` for one purpose.
pub fn derive_key(secret: &str, label: &str) -> Result<Vec<u8>, TokenError> {
    hmac_sha256(secret.as_bytes(), label.as_bytes())
}

/// Constant-time comparison against an optional configured secret.
///
/// An unconfigured or empty expected value rejects everything.
pub fn matches_configured(expected: Option<&str>, provided: &str) -> bool {
    match expected {
        Some(expected) if !expected.is_empty() => {
            constant_time_eq::constant_time_eq(expected.as_bytes(), provided.as_bytes())
        }
        _ => false,
    }
}
