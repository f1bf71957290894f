// --- File: crates/classnet_policy/src/routes.rs ---

use axum::{routing::get, Router};
use classnet_common::services::PolicyCatalog;
use classnet_db::DeviceRepository;
use classnet_tokens::TokenIssuer;
use std::sync::Arc;

use crate::handlers::{export_handler, sentinel_handler, whitelist_handler, PolicyState};

/// Policy routes, mounted at the root: `/w/{token}/whitelist.txt` and `/export/{name}.txt`.
pub fn routes(
    issuer: Arc<TokenIssuer>,
    devices: Arc<dyn DeviceRepository>,
    catalog: Arc<dyn PolicyCatalog>,
) -> Router {
    let state = Arc::new(PolicyState {
        issuer,
        devices,
        catalog,
    });

    // Every path under /w reaches a handler so no shape can produce a 4xx.
    Router::new()
        .route("/w", get(sentinel_handler))
        .route("/w/", get(sentinel_handler))
        .route("/w/{*tail}", get(whitelist_handler))
        .route("/export/{file}", get(export_handler))
        .with_state(state)
}
