// --- File: crates/services/classnet_backend/src/lib.rs ---
pub mod app_state;
pub mod router;

pub use app_state::{AppState, AppStateBuilder};
pub use router::build_router;
