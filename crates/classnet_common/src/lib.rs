// --- File: crates/classnet_common/src/lib.rs ---

pub mod conditional; // ETag and If-None-Match handling
pub mod error; // Error taxonomy
pub mod features; // Runtime feature flags
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod models; // Shared data structures
pub mod services; // Collaborator traits

pub use error::{
    auth_invalid, auth_missing, config_error, database_error, not_found, validation_error,
    ClassnetError, HttpStatusCode,
};

pub use http::bearer_token;

pub use features::{
    is_agent_updates_enabled, is_bootstrap_enabled, is_enrollment_enabled, is_feature_enabled,
};

pub use services::{AdminAuthenticator, BoxFuture, PolicyCatalog};
