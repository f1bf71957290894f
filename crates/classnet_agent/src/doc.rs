// --- File: crates/classnet_agent/src/doc.rs ---
#![cfg(feature = "openapi")]

use utoipa::OpenApi;

use crate::distribution::{Manifest, ManifestEntry};
use crate::logic::{ManifestResponse, TicketResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::manifest_handler,
        crate::handlers::file_handler,
        crate::handlers::ticket_handler,
        crate::handlers::script_handler
    ),
    components(schemas(Manifest, ManifestEntry, ManifestResponse, TicketResponse)),
    tags(
        (name = "Agent", description = "Agent release manifests and files"),
        (name = "Enrollment", description = "Enrollment tickets and installer scripts")
    )
)]
pub struct AgentApiDoc;
