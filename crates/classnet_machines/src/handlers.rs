// --- File: crates/classnet_machines/src/handlers.rs ---

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
};
use classnet_common::services::PolicyCatalog;
use classnet_common::{auth_invalid, auth_missing, bearer_token, validation_error, ClassnetError};
use classnet_config::AppConfig;
use classnet_db::DeviceRepository;
use classnet_tokens::TokenIssuer;
use std::sync::Arc;
use tracing::debug;

use crate::logic::{
    classify_credential, register_machine, rotate_download_token, RegisterRequest,
    RegisterResponse, RotateResponse, ValidateTokenRequest, ValidateTokenResponse,
};

// --- State for machine handlers ---
#[derive(Clone)]
pub struct MachinesState {
    pub config: Arc<AppConfig>,
    pub issuer: Arc<TokenIssuer>,
    pub devices: Arc<dyn DeviceRepository>,
    pub catalog: Arc<dyn PolicyCatalog>,
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/setup/validate-token",
    request_body = ValidateTokenRequest,
    responses(
        (status = 200, description = "Whether the value is the registration token", body = ValidateTokenResponse)
    ),
    tag = "Machines"
))]
pub async fn validate_token_handler(
    State(state): State<Arc<MachinesState>>,
    body: Bytes,
) -> Json<ValidateTokenResponse> {
    // Malformed bodies are simply "not valid".
    let request: ValidateTokenRequest = serde_json::from_slice(&body).unwrap_or_default();
    let valid = request
        .token
        .as_deref()
        .map(|token| state.issuer.validate_registration_token(token.trim()))
        .unwrap_or(false);
    debug!(valid, "Registration token checked");
    Json(ValidateTokenResponse { valid })
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/machines/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Machine registered", body = RegisterResponse),
        (status = 400, description = "Missing hostname or classroom"),
        (status = 401, description = "Missing Authorization header"),
        (status = 403, description = "Invalid credential or ticket for another classroom"),
        (status = 404, description = "Unknown classroom")
    ),
    security(("bearer" = [])),
    tag = "Machines"
))]
pub async fn register_handler(
    State(state): State<Arc<MachinesState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<RegisterResponse>, ClassnetError> {
    // Authenticate before the body is even parsed.
    let bearer = bearer_token(&headers).ok_or_else(|| auth_missing("Authorization required"))?;
    let credential = classify_credential(&state.issuer, bearer)
        .ok_or_else(|| auth_invalid("Invalid registration token"))?;

    let request: RegisterRequest = serde_json::from_slice(&body)
        .map_err(|e| validation_error(format!("Invalid request body: {}", e)))?;

    register_machine(&state, credential, request).await.map(Json)
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/machines/{hostname}/rotate-download-token",
    params(("hostname" = String, Path, description = "Registered hostname")),
    responses(
        (status = 200, description = "Token rotated", body = RotateResponse),
        (status = 401, description = "Missing Authorization header"),
        (status = 403, description = "Wrong shared secret"),
        (status = 404, description = "Unknown machine")
    ),
    security(("bearer" = [])),
    tag = "Machines"
))]
pub async fn rotate_handler(
    State(state): State<Arc<MachinesState>>,
    Path(hostname): Path<String>,
    headers: HeaderMap,
) -> Result<Json<RotateResponse>, ClassnetError> {
    let bearer = bearer_token(&headers).ok_or_else(|| auth_missing("Authorization required"))?;
    if !state.issuer.validate_shared_secret(bearer) {
        return Err(auth_invalid("Invalid shared secret"));
    }

    rotate_download_token(&state, &hostname).await.map(Json)
}
