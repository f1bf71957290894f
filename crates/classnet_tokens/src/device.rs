//! Device bearer tokens.
//!
//! The registry stores a random per-device seed and the SHA-256 of the token.
//! The token itself is `base64url(HMAC-SHA256(device_key, seed))`, so the
//! server can hand the live token back on re-registration while the store on
//! its own never reveals it.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use crate::error::TokenError;
use crate::secrets::{hash_token, hmac_sha256, random_bytes};

/// Seed length in bytes.
pub const SEED_LEN: usize = 32;

/// Length of an encoded device token (32 bytes, unpadded base64url).
pub const TOKEN_LEN: usize = 43;

/// Token material for one device.
#[derive(Clone, PartialEq, Eq)]
pub struct DeviceCredential {
    /// Plaintext bearer token. Only ever sent to the device.
    pub token: String,
    /// Hex seed persisted in the registry.
    pub seed: String,
    /// SHA-256 hex of `token`, persisted for lookup.
    pub hash: String,
}

impl std::fmt::Debug for DeviceCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceCredential")
            .field("hash", &self.hash)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct DeviceTokenDeriver {
    key: Vec<u8>,
}

impl std::fmt::Debug for DeviceTokenDeriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceTokenDeriver").finish_non_exhaustive()
    }
}

impl DeviceTokenDeriver {
    pub fn new(key: Vec<u8>) -> Self {
        Self { key }
    }

    /// Mint a credential from a fresh random seed.
    pub fn issue(&self) -> Result<DeviceCredential, TokenError> {
        self.from_seed(&hex::encode(random_bytes(SEED_LEN)))
    }

    /// Recompute the credential for a stored seed.
    pub fn from_seed(&self, seed_hex: &str) -> Result<DeviceCredential, TokenError> {
        let seed = hex::decode(seed_hex)
            .map_err(|e| TokenError::Malformed(format!("device token seed: {}", e)))?;
        let token = URL_SAFE_NO_PAD.encode(hmac_sha256(&self.key, &seed)?);
        Ok(DeviceCredential {
            hash: hash_token(&token),
            seed: seed_hex.to_string(),
            token,
        })
    }
}

/// Cheap shape check before a registry lookup.
pub fn looks_like_device_token(value: &str) -> bool {
    value.len() == TOKEN_LEN
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
