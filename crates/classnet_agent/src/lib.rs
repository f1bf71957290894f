// --- File: crates/classnet_agent/src/lib.rs ---

pub mod distribution; // Hashed, allowlisted file sets
pub mod error;
pub mod handlers; // Axum handlers
pub mod logic; // Download auth and enrollment
pub mod routes; // Routers for this crate
pub mod script; // Enrollment script template
#[cfg(feature = "openapi")]
pub mod doc;


pub use distribution::{Distribution, Manifest, ManifestEntry};
pub use error::AgentError;
pub use routes::{agent_routes, bootstrap_routes, enrollment_routes};
