//! Device registry storage interface
//!
//! Every mutating operation is a single atomic step in the backing store:
//! concurrent registrations of one hostname converge on one row, and a
//! rotation replaces the token material in one statement.

use crate::error::DbError;
use chrono::{DateTime, Utc};
use classnet_common::services::BoxFuture;

pub use classnet_common::models::{Device, DeviceUpsert, UpsertOutcome};

/// Storage for registered devices
pub trait DeviceRepository: Send + Sync {
    /// Create the backing tables if they don't exist
    fn init_schema(&self) -> BoxFuture<'_, (), DbError>;

    /// Insert a device or refresh the existing row with the same hostname.
    ///
    /// On conflict the row keeps its id, token material and `registered_at`;
    /// `classroom_id` and `last_seen_at` are overwritten and
    /// `installed_version` only when a new one is given.
    fn upsert(&self, device: DeviceUpsert) -> BoxFuture<'_, UpsertOutcome, DbError>;

    fn find_by_hostname<'a>(&'a self, hostname: &'a str)
        -> BoxFuture<'a, Option<Device>, DbError>;

    /// Look up the device whose live token hashes to `token_hash`
    fn find_by_token_hash<'a>(
        &'a self,
        token_hash: &'a str,
    ) -> BoxFuture<'a, Option<Device>, DbError>;

    /// Replace the token material of `hostname`.
    ///
    /// Returns `None` when no such device exists.
    fn rotate_token<'a>(
        &'a self,
        hostname: &'a str,
        token_seed: &'a str,
        token_hash: &'a str,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, Option<Device>, DbError>;

    /// Record that the device was seen at `now`
    fn touch_last_seen<'a>(&'a self, id: &'a str, now: DateTime<Utc>)
        -> BoxFuture<'a, (), DbError>;
}
