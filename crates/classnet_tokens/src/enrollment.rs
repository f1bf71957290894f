//! Classroom-scoped enrollment tickets.
//!
//! A ticket is `v1.<payload>.<mac>` where `payload` is the base64url JSON of
//! [`EnrollmentClaims`] and `mac` the base64url HMAC-SHA256 of `v1.<payload>`
//! under the enrollment key. Tickets are stateless: validity is the MAC plus
//! the expiry, and the classroom binding is part of the signed payload.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TokenError;
use crate::secrets::hmac_sha256;

const VERSION: &str = "v1";

// Anything longer is not one of ours.
const MAX_TICKET_LEN: usize = 2048;

/// Signed content of an enrollment ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentClaims {
    #[serde(rename = "cid")]
    pub classroom_id: String,
    /// Expiry as Unix seconds.
    #[serde(rename = "exp")]
    pub expires_at: i64,
    /// Random ticket id, keeps two tickets minted in the same second distinct.
    #[serde(rename = "jti")]
    pub ticket_id: String,
}

/// A freshly minted ticket.
#[derive(Debug, Clone)]
pub struct EnrollmentTicket {
    pub token: String,
    pub classroom_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Result of checking a ticket against a classroom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentVerdict {
    Ok(EnrollmentClaims),
    /// Authentic and unexpired, but bound to another classroom.
    ScopeMismatch,
    /// Malformed, forged or expired.
    Invalid,
}

/// Encodes and decodes tickets under one key.
#[derive(Clone)]
pub struct EnrollmentCodec {
    key: Vec<u8>,
}

impl std::fmt::Debug for EnrollmentCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrollmentCodec").finish_non_exhaustive()
    }
}

impl EnrollmentCodec {
    pub fn new(key: Vec<u8>) -> Self {
        Self { key }
    }

    pub fn encode(&self, claims: &EnrollmentClaims) -> Result<String, TokenError> {
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);
        let signed = format!("{}.{}", VERSION, payload);
        let mac = URL_SAFE_NO_PAD.encode(hmac_sha256(&self.key, signed.as_bytes())?);
        Ok(format!("{}.{}", signed, mac))
    }

    /// Authentic, unexpired claims of `token`, or `None`.
    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> Option<EnrollmentClaims> {
        if token.len() > MAX_TICKET_LEN {
            return None;
        }

        let mut parts = token.split('.');
        let (version, payload, mac) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() || version != VERSION {
            return None;
        }

        let signed = format!("{}.{}", version, payload);
        let expected = hmac_sha256(&self.key, signed.as_bytes()).ok()?;
        let provided = URL_SAFE_NO_PAD.decode(mac).ok()?;
        if !constant_time_eq::constant_time_eq(&expected, &provided) {
            return None;
        }

        let claims: EnrollmentClaims =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).ok()?).ok()?;
        if claims.expires_at <= now.timestamp() {
            return None;
        }
        Some(claims)
    }

    /// Check `token` for use on `classroom_id`.
    pub fn verify(&self, token: &str, classroom_id: &str, now: DateTime<Utc>) -> EnrollmentVerdict {
        match self.decode(token, now) {
            Some(claims) if claims.classroom_id == classroom_id => EnrollmentVerdict::Ok(claims),
            Some(_) => EnrollmentVerdict::ScopeMismatch,
            None => EnrollmentVerdict::Invalid,
        }
    }
}
