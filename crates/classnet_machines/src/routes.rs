// --- File: crates/classnet_machines/src/routes.rs ---

use axum::{routing::post, Router};
use classnet_common::services::PolicyCatalog;
use classnet_config::AppConfig;
use classnet_db::DeviceRepository;
use classnet_tokens::TokenIssuer;
use std::sync::Arc;

use crate::handlers::{register_handler, rotate_handler, validate_token_handler, MachinesState};

/// Registration, rotation and setup routes. The backend nests these under `/api`.
pub fn routes(
    config: Arc<AppConfig>,
    issuer: Arc<TokenIssuer>,
    devices: Arc<dyn DeviceRepository>,
    catalog: Arc<dyn PolicyCatalog>,
) -> Router {
    let state = Arc::new(MachinesState {
        config,
        issuer,
        devices,
        catalog,
    });

    Router::new()
        .route("/setup/validate-token", post(validate_token_handler))
        .route("/machines/register", post(register_handler))
        .route(
            "/machines/{hostname}/rotate-download-token",
            post(rotate_handler),
        )
        .with_state(state)
}
