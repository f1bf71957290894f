// --- File: crates/classnet_machines/src/logic.rs ---

use chrono::{DateTime, Utc};
use classnet_common::models::{Classroom, Device, DeviceUpsert};
use classnet_common::{auth_invalid, not_found, validation_error, ClassnetError};
use classnet_tokens::{EnrollmentClaims, TokenIssuer};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::handlers::MachinesState;

// Longest DNS name.
const MAX_HOSTNAME_LEN: usize = 253;

// --- Request / response types ---

/// Body of `POST /api/machines/register`.
///
/// Every field is optional at the type level so that a missing field is
/// reported as a validation error after authentication, never before.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub hostname: Option<String>,
    pub classroom_name: Option<String>,
    pub classroom_id: Option<String>,
    pub version: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MachineInfo {
    pub hostname: String,
    pub classroom_id: String,
    pub version: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl From<&Device> for MachineInfo {
    fn from(device: &Device) -> Self {
        Self {
            hostname: device.hostname.clone(),
            classroom_id: device.classroom_id.clone(),
            version: device.installed_version.clone(),
            registered_at: device.registered_at,
            last_seen_at: device.last_seen_at,
        }
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub whitelist_url: String,
    pub machine: MachineInfo,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotateResponse {
    pub success: bool,
    pub whitelist_url: String,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidateTokenRequest {
    pub token: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidateTokenResponse {
    pub valid: bool,
}

/// What the registering caller proved.
#[derive(Debug, Clone)]
pub enum RegistrationCredential {
    /// The installation-wide registration token.
    RegistrationToken,
    /// An enrollment ticket, usable only for its own classroom.
    Enrollment(EnrollmentClaims),
}

/// Resolve a bearer value to a registration credential.
pub fn classify_credential(issuer: &TokenIssuer, bearer: &str) -> Option<RegistrationCredential> {
    if issuer.validate_registration_token(bearer) {
        return Some(RegistrationCredential::RegistrationToken);
    }
    issuer
        .decode_enrollment_token(bearer)
        .map(RegistrationCredential::Enrollment)
}

// --- Helpers ---

/// Trim and lowercase a hostname, rejecting empty or non-DNS values.
pub fn normalize_hostname(raw: &str) -> Option<String> {
    let hostname = raw.trim().to_ascii_lowercase();
    let valid = !hostname.is_empty()
        && hostname.len() <= MAX_HOSTNAME_LEN
        && hostname
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'.' || b == b'_');
    valid.then_some(hostname)
}

/// The tokenized policy URL a device polls.
pub fn whitelist_url(base_url: &str, token: &str) -> String {
    format!("{}/w/{}/whitelist.txt", base_url.trim_end_matches('/'), token)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

async fn resolve_classroom(
    state: &MachinesState,
    request: &RegisterRequest,
) -> Result<Classroom, ClassnetError> {
    let classroom = match (non_empty(&request.classroom_id), non_empty(&request.classroom_name)) {
        (Some(id), _) => state.catalog.classroom_by_id(id).await?,
        (None, Some(name)) => state.catalog.classroom_by_name(name).await?,
        (None, None) => return Err(validation_error("classroomName is required")),
    };
    classroom.ok_or_else(|| not_found("Classroom not found"))
}

// --- Operations ---

/// Register a machine or refresh its registration.
///
/// The caller has already been authenticated; this performs body validation,
/// classroom resolution, the scope check for enrollment tickets and the
/// upsert. A known hostname keeps its current token.
pub async fn register_machine(
    state: &MachinesState,
    credential: RegistrationCredential,
    request: RegisterRequest,
) -> Result<RegisterResponse, ClassnetError> {
    let raw_hostname =
        non_empty(&request.hostname).ok_or_else(|| validation_error("hostname is required"))?;
    let hostname = normalize_hostname(raw_hostname)
        .ok_or_else(|| validation_error("hostname contains invalid characters"))?;

    let classroom = resolve_classroom(state, &request).await?;

    if let RegistrationCredential::Enrollment(claims) = &credential {
        if claims.classroom_id != classroom.id {
            debug!(
                hostname = %hostname,
                ticket_classroom = %claims.classroom_id,
                classroom = %classroom.id,
                "Enrollment ticket used for another classroom"
            );
            return Err(auth_invalid("Enrollment token is not valid for this classroom"));
        }
    }

    let fresh = state.issuer.issue_device_token()?;
    let outcome = state
        .devices
        .upsert(DeviceUpsert {
            id: uuid::Uuid::new_v4().to_string(),
            hostname: hostname.clone(),
            classroom_id: classroom.id.clone(),
            installed_version: non_empty(&request.version).map(str::to_string),
            token_seed: fresh.seed.clone(),
            token_hash: fresh.hash.clone(),
            now: Utc::now(),
        })
        .await?;

    let token = if outcome.created {
        fresh.token
    } else {
        state.issuer.device_credential(&outcome.device.token_seed)?.token
    };

    info!(
        hostname = %outcome.device.hostname,
        classroom = %outcome.device.classroom_id,
        created = outcome.created,
        via_ticket = matches!(credential, RegistrationCredential::Enrollment(_)),
        "Machine registered"
    );

    Ok(RegisterResponse {
        success: true,
        whitelist_url: whitelist_url(&state.config.server.base_url(), &token),
        machine: MachineInfo::from(&outcome.device),
    })
}

/// Replace a machine's download token. The old token stops working at once.
pub async fn rotate_download_token(
    state: &MachinesState,
    raw_hostname: &str,
) -> Result<RotateResponse, ClassnetError> {
    let hostname = normalize_hostname(raw_hostname).ok_or_else(|| not_found("Machine not found"))?;

    let fresh = state.issuer.issue_device_token()?;
    let device = state
        .devices
        .rotate_token(&hostname, &fresh.seed, &fresh.hash, Utc::now())
        .await?
        .ok_or_else(|| not_found("Machine not found"))?;

    info!(
        hostname = %device.hostname,
        token = %&fresh.hash[..8],
        "Download token rotated"
    );

    Ok(RotateResponse {
        success: true,
        whitelist_url: whitelist_url(&state.config.server.base_url(), &fresh.token),
    })
}
