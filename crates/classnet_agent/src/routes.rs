// --- File: crates/classnet_agent/src/routes.rs ---

use axum::{
    routing::{get, post},
    Router,
};
use classnet_common::services::{AdminAuthenticator, PolicyCatalog};
use classnet_config::AppConfig;
use classnet_db::DeviceRepository;
use classnet_tokens::TokenIssuer;
use std::sync::Arc;

use crate::distribution::Distribution;
use crate::handlers::{
    file_handler, manifest_handler, script_handler, ticket_handler, DistributionState,
    EnrollmentState,
};
use crate::logic::Audience;

fn distribution_routes(state: DistributionState) -> Router {
    Router::new()
        .route("/latest.json", get(manifest_handler))
        .route("/file", get(file_handler))
        .with_state(Arc::new(state))
}

/// Device release downloads, nested by the backend at `/api/agent/windows`.
pub fn agent_routes(
    issuer: Arc<TokenIssuer>,
    devices: Arc<dyn DeviceRepository>,
    distribution: Arc<Distribution>,
) -> Router {
    distribution_routes(DistributionState {
        issuer,
        devices,
        distribution,
        audience: Audience::Device,
    })
}

/// Installer downloads, nested by the backend at `/api/agent/windows/bootstrap`.
pub fn bootstrap_routes(
    issuer: Arc<TokenIssuer>,
    devices: Arc<dyn DeviceRepository>,
    distribution: Arc<Distribution>,
) -> Router {
    distribution_routes(DistributionState {
        issuer,
        devices,
        distribution,
        audience: Audience::Enrollment,
    })
}

/// Ticket issuance and enrollment scripts, nested by the backend at `/api/enroll`.
pub fn enrollment_routes(
    config: Arc<AppConfig>,
    issuer: Arc<TokenIssuer>,
    catalog: Arc<dyn PolicyCatalog>,
    admins: Arc<dyn AdminAuthenticator>,
) -> Router {
    let state = Arc::new(EnrollmentState {
        config,
        issuer,
        catalog,
        admins,
    });

    Router::new()
        .route("/{classroom_id}/ticket", post(ticket_handler))
        .route("/{classroom_id}/windows.ps1", get(script_handler))
        .with_state(state)
}
