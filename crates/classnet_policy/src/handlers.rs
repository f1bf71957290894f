// --- File: crates/classnet_policy/src/handlers.rs ---

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::HeaderMap,
    response::Response,
};
use classnet_common::conditional::{respond, uncacheable};
use classnet_common::services::PolicyCatalog;
use classnet_common::{not_found, ClassnetError};
use classnet_db::DeviceRepository;
use classnet_tokens::TokenIssuer;
use std::sync::Arc;

use crate::logic::{export_group, resolve_whitelist, token_from_feed_path, PolicyOutcome};
use crate::render::{CONTENT_TYPE, SENTINEL};

#[derive(Clone)]
pub struct PolicyState {
    pub issuer: Arc<TokenIssuer>,
    pub devices: Arc<dyn DeviceRepository>,
    pub catalog: Arc<dyn PolicyCatalog>,
}

fn into_response(headers: &HeaderMap, outcome: PolicyOutcome) -> Response {
    match outcome {
        PolicyOutcome::Document(body) => respond(headers, body.into_bytes(), CONTENT_TYPE),
        PolicyOutcome::Sentinel => sentinel_response(),
    }
}

/// The deny-all document: 200, never cached, no ETag.
pub fn sentinel_response() -> Response {
    uncacheable(SENTINEL, CONTENT_TYPE)
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/w/{token}/whitelist.txt",
    params(
        ("token" = String, Path, description = "Device download token"),
        ("If-None-Match" = Option<String>, Header, description = "ETag from a previous response")
    ),
    responses(
        (status = 200, description = "Policy document, or the deny-all sentinel", body = String, content_type = "text/plain"),
        (status = 304, description = "Policy unchanged")
    ),
    tag = "Policy"
))]
pub async fn whitelist_handler(
    State(state): State<Arc<PolicyState>>,
    tail: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
) -> Response {
    // Undecodable segments and any other shape under /w get the sentinel.
    let Ok(Path(tail)) = tail else {
        return sentinel_response();
    };
    match token_from_feed_path(&tail) {
        Some(token) => into_response(&headers, resolve_whitelist(&state, token).await),
        None => sentinel_response(),
    }
}

/// `/w` and `/w/`, which the catch-all does not match.
pub async fn sentinel_handler() -> Response {
    sentinel_response()
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/export/{file}",
    params(
        ("file" = String, Path, description = "Export name followed by .txt"),
        ("If-None-Match" = Option<String>, Header, description = "ETag from a previous response")
    ),
    responses(
        (status = 200, description = "Rendered group policy", body = String, content_type = "text/plain"),
        (status = 304, description = "Policy unchanged"),
        (status = 404, description = "Unknown group")
    ),
    tag = "Policy"
))]
pub async fn export_handler(
    State(state): State<Arc<PolicyState>>,
    file: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
) -> Result<Response, ClassnetError> {
    let Ok(Path(file)) = file else {
        return Err(not_found("Group not found"));
    };
    let name = file
        .strip_suffix(".txt")
        .filter(|name| !name.is_empty())
        .ok_or_else(|| not_found("Group not found"))?;

    let outcome = export_group(&state, name).await?;
    Ok(into_response(&headers, outcome))
}
