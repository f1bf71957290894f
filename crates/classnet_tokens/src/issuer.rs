//! The token issuer: one place that mints and checks every credential type.

use chrono::{DateTime, Duration, Utc};
use classnet_common::models::AdminPrincipal;
use classnet_config::TokensConfig;
use tracing::{debug, info};

use crate::device::{DeviceCredential, DeviceTokenDeriver};
use crate::enrollment::{EnrollmentClaims, EnrollmentCodec, EnrollmentTicket, EnrollmentVerdict};
use crate::error::TokenError;
use crate::secrets::{
    derive_key, hash_token, matches_configured, DEVICE_KEY_LABEL, ENROLLMENT_KEY_LABEL,
};

pub struct TokenIssuer {
    registration_token: Option<String>,
    shared_secret: Option<String>,
    enrollment: EnrollmentCodec,
    devices: DeviceTokenDeriver,
    enrollment_ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("registration_token_configured", &self.registration_token.is_some())
            .field("shared_secret_configured", &self.shared_secret.is_some())
            .field("enrollment_ttl", &self.enrollment_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn from_config(config: &TokensConfig) -> Result<Self, TokenError> {
        if config.server_secret.is_empty() {
            return Err(TokenError::InvalidKey(
                "tokens.server_secret is empty".to_string(),
            ));
        }
        if config.enrollment_ttl_minutes <= 0 {
            return Err(TokenError::InvalidKey(
                "tokens.enrollment_ttl_minutes must be positive".to_string(),
            ));
        }

        let issuer = Self {
            registration_token: config.registration_token.clone().filter(|t| !t.is_empty()),
            shared_secret: config.shared_secret.clone().filter(|s| !s.is_empty()),
            enrollment: EnrollmentCodec::new(derive_key(
                &config.server_secret,
                ENROLLMENT_KEY_LABEL,
            )?),
            devices: DeviceTokenDeriver::new(derive_key(&config.server_secret, DEVICE_KEY_LABEL)?),
            enrollment_ttl: Duration::minutes(config.enrollment_ttl_minutes),
        };
        info!(
            registration = issuer.registration_token.is_some(),
            rotation = issuer.shared_secret.is_some(),
            ttl_minutes = config.enrollment_ttl_minutes,
            "Token issuer ready"
        );
        Ok(issuer)
    }

    /// Constant-time check against the installation-wide registration token.
    pub fn validate_registration_token(&self, value: &str) -> bool {
        matches_configured(self.registration_token.as_deref(), value)
    }

    /// Constant-time check against the rotation shared secret.
    pub fn validate_shared_secret(&self, value: &str) -> bool {
        matches_configured(self.shared_secret.as_deref(), value)
    }

    /// Mint a ticket for `classroom_id` on behalf of `principal`.
    pub fn issue_enrollment_ticket(
        &self,
        classroom_id: &str,
        principal: &AdminPrincipal,
    ) -> Result<EnrollmentTicket, TokenError> {
        self.issue_enrollment_ticket_at(classroom_id, principal, Utc::now())
    }

    pub fn issue_enrollment_ticket_at(
        &self,
        classroom_id: &str,
        principal: &AdminPrincipal,
        now: DateTime<Utc>,
    ) -> Result<EnrollmentTicket, TokenError> {
        if !principal.can_manage(classroom_id) {
            return Err(TokenError::NotPermitted {
                principal: principal.name.clone(),
                classroom_id: classroom_id.to_string(),
            });
        }

        let expires_at = now + self.enrollment_ttl;
        let claims = EnrollmentClaims {
            classroom_id: classroom_id.to_string(),
            expires_at: expires_at.timestamp(),
            ticket_id: uuid::Uuid::new_v4().to_string(),
        };
        let token = self.enrollment.encode(&claims)?;
        info!(
            classroom = %classroom_id,
            admin = %principal.name,
            ticket = %claims.ticket_id,
            "Enrollment ticket issued"
        );

        Ok(EnrollmentTicket {
            token,
            classroom_id: classroom_id.to_string(),
            expires_at,
        })
    }

    pub fn verify_enrollment_token(&self, token: &str, classroom_id: &str) -> EnrollmentVerdict {
        self.verify_enrollment_token_at(token, classroom_id, Utc::now())
    }

    pub fn verify_enrollment_token_at(
        &self,
        token: &str,
        classroom_id: &str,
        now: DateTime<Utc>,
    ) -> EnrollmentVerdict {
        let verdict = self.enrollment.verify(token, classroom_id, now);
        if !matches!(verdict, EnrollmentVerdict::Ok(_)) {
            debug!(classroom = %classroom_id, ?verdict, "Enrollment ticket rejected");
        }
        verdict
    }

    /// Claims of any authentic, unexpired ticket regardless of classroom.
    ///
    /// Used where the request does not name a classroom, e.g. bootstrap downloads.
    pub fn decode_enrollment_token(&self, token: &str) -> Option<EnrollmentClaims> {
        self.enrollment.decode(token, Utc::now())
    }

    /// Mint a new device credential.
    pub fn issue_device_token(&self) -> Result<DeviceCredential, TokenError> {
        self.devices.issue()
    }

    /// Recompute a device's live credential from its stored seed.
    pub fn device_credential(&self, seed_hex: &str) -> Result<DeviceCredential, TokenError> {
        self.devices.from_seed(seed_hex)
    }

    /// Lookup key for a presented device token.
    pub fn device_token_hash(&self, token: &str) -> String {
        hash_token(token)
    }
}
