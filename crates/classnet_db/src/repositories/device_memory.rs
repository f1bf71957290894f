//! In-memory device repository
//!
//! Used when no database is configured and in tests. A single mutex guards the
//! whole map, which gives every operation the same atomicity the SQL
//! statements have.

use crate::error::DbError;
use crate::repositories::device::{Device, DeviceRepository, DeviceUpsert, UpsertOutcome};
use chrono::{DateTime, Utc};
use classnet_common::services::BoxFuture;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct InMemoryDeviceRepository {
    // Keyed by hostname.
    devices: Mutex<HashMap<String, Device>>,
}

impl InMemoryDeviceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Device>>, DbError> {
        self.devices
            .lock()
            .map_err(|_| DbError::Poisoned)
    }

    fn upsert_sync(&self, upsert: DeviceUpsert) -> Result<UpsertOutcome, DbError> {
        let mut devices = self.lock()?;

        if let Some(existing) = devices.get_mut(&upsert.hostname) {
            existing.classroom_id = upsert.classroom_id;
            if upsert.installed_version.is_some() {
                existing.installed_version = upsert.installed_version;
            }
            existing.last_seen_at = upsert.now;
            return Ok(UpsertOutcome {
                device: existing.clone(),
                created: false,
            });
        }

        if devices.values().any(|d| d.token_hash == upsert.token_hash) {
            return Err(DbError::QueryError("token hash already in use".to_string()));
        }

        let device = Device {
            id: upsert.id,
            hostname: upsert.hostname.clone(),
            classroom_id: upsert.classroom_id,
            installed_version: upsert.installed_version,
            token_seed: upsert.token_seed,
            token_hash: upsert.token_hash,
            registered_at: upsert.now,
            last_seen_at: upsert.now,
        };
        devices.insert(upsert.hostname, device.clone());
        Ok(UpsertOutcome {
            device,
            created: true,
        })
    }
}

impl DeviceRepository for InMemoryDeviceRepository {
    fn init_schema(&self) -> BoxFuture<'_, (), DbError> {
        Box::pin(async { Ok(()) })
    }

    fn upsert(&self, device: DeviceUpsert) -> BoxFuture<'_, UpsertOutcome, DbError> {
        let result = self.upsert_sync(device);
        Box::pin(async move { result })
    }

    fn find_by_hostname<'a>(
        &'a self,
        hostname: &'a str,
    ) -> BoxFuture<'a, Option<Device>, DbError> {
        let result = self.lock().map(|devices| devices.get(hostname).cloned());
        Box::pin(async move { result })
    }

    fn find_by_token_hash<'a>(
        &'a self,
        token_hash: &'a str,
    ) -> BoxFuture<'a, Option<Device>, DbError> {
        let result = self.lock().map(|devices| {
            devices
                .values()
                .find(|d| d.token_hash == token_hash)
                .cloned()
        });
        Box::pin(async move { result })
    }

    fn rotate_token<'a>(
        &'a self,
        hostname: &'a str,
        token_seed: &'a str,
        token_hash: &'a str,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, Option<Device>, DbError> {
        let result = self.lock().map(|mut devices| {
            devices.get_mut(hostname).map(|device| {
                device.token_seed = token_seed.to_string();
                device.token_hash = token_hash.to_string();
                device.last_seen_at = now;
                device.clone()
            })
        });
        Box::pin(async move { result })
    }

    fn touch_last_seen<'a>(
        &'a self,
        id: &'a str,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, (), DbError> {
        let result = self.lock().map(|mut devices| {
            if let Some(device) = devices.values_mut().find(|d| d.id == id) {
                device.last_seen_at = now;
            }
        });
        Box::pin(async move { result })
    }
}
