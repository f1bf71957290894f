// --- File: crates/classnet_agent/src/logic.rs ---

use chrono::{DateTime, Utc};
use classnet_common::models::AdminPrincipal;
use classnet_common::{auth_invalid, auth_missing, not_found, ClassnetError};
use classnet_config::{default_bootstrap_files, AppConfig};
use classnet_tokens::{looks_like_device_token, EnrollmentVerdict};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::distribution::{Distribution, Manifest, ManifestEntry};
use crate::handlers::{DistributionState, EnrollmentState};
use crate::script::render_enrollment_script;

// --- Request / response types ---

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestResponse {
    pub success: bool,
    pub version: String,
    pub files: Vec<ManifestEntry>,
}

impl From<&Manifest> for ManifestResponse {
    fn from(manifest: &Manifest) -> Self {
        Self {
            success: true,
            version: manifest.version.clone(),
            files: manifest.files.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileQuery {
    pub path: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub success: bool,
    pub enrollment_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Who may read a distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Registered machines, by device token.
    Device,
    /// Machines being installed, by any valid enrollment ticket.
    Enrollment,
}

// --- Authorization ---

/// Check the bearer credential a distribution requires. Every failure is 401.
pub async fn authorize_download(
    state: &DistributionState,
    bearer: Option<&str>,
) -> Result<(), ClassnetError> {
    let bearer = bearer.ok_or_else(|| auth_missing("Authorization required"))?;

    match state.audience {
        Audience::Device => {
            if !looks_like_device_token(bearer) {
                return Err(auth_missing("Invalid device token"));
            }
            let hash = state.issuer.device_token_hash(bearer);
            match state.devices.find_by_token_hash(&hash).await? {
                Some(device) => {
                    debug!(hostname = %device.hostname, distribution = state.distribution.name(), "Download authorized");
                    Ok(())
                }
                None => Err(auth_missing("Invalid device token")),
            }
        }
        Audience::Enrollment => state
            .issuer
            .decode_enrollment_token(bearer)
            .map(|claims| {
                debug!(classroom = %claims.classroom_id, distribution = state.distribution.name(), "Bootstrap download authorized");
            })
            .ok_or_else(|| auth_missing("Invalid enrollment token")),
    }
}

// --- Distribution operations ---

async fn blocking<T, F>(distribution: &Arc<Distribution>, f: F) -> Result<T, ClassnetError>
where
    T: Send + 'static,
    F: FnOnce(&Distribution) -> Result<T, crate::error::AgentError> + Send + 'static,
{
    let distribution = distribution.clone();
    let result = tokio::task::spawn_blocking(move || f(&distribution))
        .await
        .map_err(crate::error::AgentError::from)?;
    Ok(result?)
}

pub async fn current_manifest(distribution: &Arc<Distribution>) -> Result<Arc<Manifest>, ClassnetError> {
    blocking(distribution, |d| d.manifest()).await
}

/// Bytes of one manifest entry. A missing or empty path is 400, anything not
/// in the manifest is 404.
pub async fn manifest_file(
    distribution: &Arc<Distribution>,
    path: Option<String>,
) -> Result<Vec<u8>, ClassnetError> {
    let path = path
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .ok_or_else(|| classnet_common::validation_error("path is required"))?;

    blocking(distribution, move |d| d.read_file(&path))
        .await?
        .ok_or_else(|| not_found("File not found"))
}

// --- Enrollment operations ---

/// Resolve the admin behind a bearer credential. Unknown credentials are 401.
pub async fn authenticate_admin(
    state: &EnrollmentState,
    bearer: Option<&str>,
) -> Result<AdminPrincipal, ClassnetError> {
    let bearer = bearer.ok_or_else(|| auth_missing("Authorization required"))?;
    state
        .admins
        .authenticate(bearer)
        .await?
        .ok_or_else(|| auth_missing("Invalid admin credential"))
}

/// Mint an enrollment ticket for an existing classroom the admin may manage.
pub async fn issue_ticket(
    state: &EnrollmentState,
    principal: &AdminPrincipal,
    classroom_id: &str,
) -> Result<TicketResponse, ClassnetError> {
    let classroom = state
        .catalog
        .classroom_by_id(classroom_id)
        .await?
        .ok_or_else(|| not_found("Classroom not found"))?;

    let ticket = state.issuer.issue_enrollment_ticket(&classroom.id, principal)?;
    info!(
        admin = %principal.name,
        classroom = %classroom.id,
        expires_at = %ticket.expires_at,
        "Enrollment ticket issued"
    );

    Ok(TicketResponse {
        success: true,
        enrollment_token: ticket.token,
        expires_at: ticket.expires_at,
    })
}

/// The bootstrap entry point the enrollment script runs.
pub fn installer_path(config: &AppConfig) -> String {
    config
        .agent
        .as_ref()
        .and_then(|agent| agent.bootstrap_files.first().cloned())
        .or_else(|| default_bootstrap_files().into_iter().next())
        .unwrap_or_default()
}

/// Render the enrollment script once the ticket checks out for `classroom_id`.
pub fn enrollment_script(
    state: &EnrollmentState,
    bearer: Option<&str>,
    classroom_id: &str,
) -> Result<String, ClassnetError> {
    let token = bearer.ok_or_else(|| auth_missing("Authorization required"))?;

    match state.issuer.verify_enrollment_token(token, classroom_id) {
        EnrollmentVerdict::Ok(claims) => {
            debug!(classroom = %claims.classroom_id, "Enrollment script served");
            Ok(render_enrollment_script(
                &state.config.server.base_url(),
                &claims.classroom_id,
                token,
                &installer_path(&state.config),
            ))
        }
        EnrollmentVerdict::ScopeMismatch => {
            debug!(classroom = %classroom_id, "Enrollment ticket used for another classroom");
            Err(auth_invalid("Enrollment token is not valid for this classroom"))
        }
        EnrollmentVerdict::Invalid => Err(auth_missing("Invalid enrollment token")),
    }
}
