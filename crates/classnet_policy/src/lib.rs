// --- File: crates/classnet_policy/src/lib.rs ---

pub mod catalog; // In-memory classroom/group catalog
pub mod error;
pub mod handlers; // Axum handlers
pub mod logic; // Policy resolution
pub mod render; // Document rendering
pub mod routes; // Router for this crate
#[cfg(feature = "openapi")]
pub mod doc;

pub use catalog::{CatalogData, InMemoryPolicyCatalog};
pub use error::PolicyError;
pub use handlers::PolicyState;
pub use render::{render_policy, SENTINEL};
pub use routes::routes;
