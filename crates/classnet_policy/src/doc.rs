// --- File: crates/classnet_policy/src/doc.rs ---
#![cfg(feature = "openapi")]

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(crate::handlers::whitelist_handler, crate::handlers::export_handler),
    tags((name = "Policy", description = "Tokenized policy documents and group exports"))
)]
pub struct PolicyApiDoc;
