// --- File: crates/classnet_machines/src/lib.rs ---

pub mod handlers; // Axum handlers
pub mod logic; // Registration and rotation
pub mod routes; // Router for this crate
#[cfg(feature = "openapi")]
pub mod doc;


pub use handlers::MachinesState;
pub use routes::routes;
