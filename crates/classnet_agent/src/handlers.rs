// --- File: crates/classnet_agent/src/handlers.rs ---

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{Json, Response},
};
use classnet_common::conditional::{respond, uncacheable};
use classnet_common::services::{AdminAuthenticator, PolicyCatalog};
use classnet_common::{bearer_token, ClassnetError};
use classnet_config::AppConfig;
use classnet_db::DeviceRepository;
use classnet_tokens::TokenIssuer;
use std::sync::Arc;

use crate::distribution::Distribution;
use crate::logic::{
    authenticate_admin, authorize_download, current_manifest, enrollment_script, issue_ticket,
    manifest_file, Audience, FileQuery, ManifestResponse, TicketResponse,
};
use crate::script::SCRIPT_CONTENT_TYPE;

const JSON_CONTENT_TYPE: &str = "application/json";
const FILE_CONTENT_TYPE: &str = "application/octet-stream";

// --- State for distribution handlers ---
// One state type serves both the device release and the bootstrap subset.
#[derive(Clone)]
pub struct DistributionState {
    pub issuer: Arc<TokenIssuer>,
    pub devices: Arc<dyn DeviceRepository>,
    pub distribution: Arc<Distribution>,
    pub audience: Audience,
}

// --- State for enrollment handlers ---
#[derive(Clone)]
pub struct EnrollmentState {
    pub config: Arc<AppConfig>,
    pub issuer: Arc<TokenIssuer>,
    pub catalog: Arc<dyn PolicyCatalog>,
    pub admins: Arc<dyn AdminAuthenticator>,
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/agent/windows/latest.json",
    responses(
        (status = 200, description = "Current release manifest", body = ManifestResponse),
        (status = 304, description = "Manifest unchanged"),
        (status = 401, description = "Missing or unknown device token")
    ),
    security(("bearer" = [])),
    tag = "Agent"
))]
pub async fn manifest_handler(
    State(state): State<Arc<DistributionState>>,
    headers: HeaderMap,
) -> Result<Response, ClassnetError> {
    authorize_download(&state, bearer_token(&headers)).await?;

    let manifest = current_manifest(&state.distribution).await?;
    let body = serde_json::to_vec(&ManifestResponse::from(manifest.as_ref()))?;
    Ok(respond(&headers, body, JSON_CONTENT_TYPE))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/agent/windows/file",
    params(("path" = String, Query, description = "Manifest entry path")),
    responses(
        (status = 200, description = "File contents", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 304, description = "File unchanged"),
        (status = 400, description = "Missing path"),
        (status = 401, description = "Missing or unknown device token"),
        (status = 404, description = "Path not in manifest")
    ),
    security(("bearer" = [])),
    tag = "Agent"
))]
pub async fn file_handler(
    State(state): State<Arc<DistributionState>>,
    Query(query): Query<FileQuery>,
    headers: HeaderMap,
) -> Result<Response, ClassnetError> {
    authorize_download(&state, bearer_token(&headers)).await?;

    let bytes = manifest_file(&state.distribution, query.path).await?;
    Ok(respond(&headers, bytes, FILE_CONTENT_TYPE))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/enroll/{classroom_id}/ticket",
    params(("classroom_id" = String, Path, description = "Classroom to enroll into")),
    responses(
        (status = 200, description = "Ticket issued", body = TicketResponse),
        (status = 401, description = "Missing or unknown admin credential"),
        (status = 403, description = "Admin may not manage this classroom"),
        (status = 404, description = "Unknown classroom")
    ),
    security(("bearer" = [])),
    tag = "Enrollment"
))]
pub async fn ticket_handler(
    State(state): State<Arc<EnrollmentState>>,
    Path(classroom_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<TicketResponse>, ClassnetError> {
    let principal = authenticate_admin(&state, bearer_token(&headers)).await?;
    issue_ticket(&state, &principal, &classroom_id).await.map(Json)
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/enroll/{classroom_id}/windows.ps1",
    params(("classroom_id" = String, Path, description = "Classroom the ticket was issued for")),
    responses(
        (status = 200, description = "Enrollment script", body = String, content_type = "text/x-powershell"),
        (status = 401, description = "Missing or invalid enrollment token"),
        (status = 403, description = "Ticket issued for another classroom")
    ),
    security(("bearer" = [])),
    tag = "Enrollment"
))]
pub async fn script_handler(
    State(state): State<Arc<EnrollmentState>>,
    Path(classroom_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ClassnetError> {
    let script = enrollment_script(&state, bearer_token(&headers), &classroom_id)?;
    // Embeds a live ticket.
    Ok(uncacheable(script, SCRIPT_CONTENT_TYPE))
}
