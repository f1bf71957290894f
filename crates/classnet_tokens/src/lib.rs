//! Credentials for classnet.
//!
//! Four kinds of secret are involved:
//!
//! - the **registration token**, one installation-wide value from config
//! - **enrollment tickets**, short-lived and bound to one classroom
//! - **device tokens**, one live bearer per registered machine
//! - the **shared secret**, used only to rotate a device token
//!
//! [`TokenIssuer`] mints and validates all of them.

pub mod admin;
pub mod device;
pub mod enrollment;
pub mod error;
pub mod issuer;
pub mod secrets;

pub use admin::StaticAdminAuthenticator;
pub use device::{looks_like_device_token, DeviceCredential};
pub use enrollment::{EnrollmentClaims, EnrollmentTicket, EnrollmentVerdict};
pub use error::TokenError;
pub use issuer::TokenIssuer;
