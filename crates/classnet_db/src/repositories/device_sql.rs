//! SQL implementation of the device repository

use crate::error::DbError;
use crate::repositories::device::{Device, DeviceRepository, DeviceUpsert, UpsertOutcome};
use crate::DbClient;
use chrono::{DateTime, SecondsFormat, Utc};
use classnet_common::services::BoxFuture;
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info};

const DEVICE_COLUMNS: &str = "id, hostname, classroom_id, installed_version, token_seed, token_hash, registered_at, last_seen_at";

// The Any driver cannot decode NULL into Option<String>. An unknown version is
// stored as '' and COALESCE covers rows written with NULL.
const SELECT_COLUMNS: &str = "id, hostname, classroom_id, COALESCE(installed_version, '') AS installed_version, token_seed, token_hash, registered_at, last_seen_at";

/// SQL implementation of the device repository
///
/// Timestamps are stored as RFC 3339 text; the `Any` driver has no portable
/// date-time type.
#[derive(Debug, Clone)]
pub struct SqlDeviceRepository {
    db_client: DbClient,
}

impl SqlDeviceRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn encode_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_time(row: &AnyRow, column: &str) -> Result<DateTime<Utc>, DbError> {
    let raw: String = row.try_get(column)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| DbError::DecodeError(format!("{}: {}", column, e)))
}

fn decode_version(raw: String) -> Option<String> {
    Some(raw).filter(|v| !v.is_empty())
}

fn device_from_row(row: &AnyRow) -> Result<Device, DbError> {
    Ok(Device {
        id: row.try_get("id")?,
        hostname: row.try_get("hostname")?,
        classroom_id: row.try_get("classroom_id")?,
        installed_version: decode_version(row.try_get("installed_version")?),
        token_seed: row.try_get("token_seed")?,
        token_hash: row.try_get("token_hash")?,
        registered_at: decode_time(row, "registered_at")?,
        last_seen_at: decode_time(row, "last_seen_at")?,
    })
}

fn query_error(context: &'static str) -> impl Fn(sqlx::Error) -> DbError {
    move |e| {
        error!("{}: {}", context, e);
        DbError::QueryError(e.to_string())
    }
}

impl DeviceRepository for SqlDeviceRepository {
    fn init_schema(&self) -> BoxFuture<'_, (), DbError> {
        Box::pin(async move {
            debug!("Initializing device schema");

            let query = r#"
                CREATE TABLE IF NOT EXISTS devices (
                    id TEXT PRIMARY KEY NOT NULL,
                    hostname TEXT NOT NULL UNIQUE,
                    classroom_id TEXT NOT NULL,
                    installed_version TEXT NOT NULL DEFAULT '',
                    token_seed TEXT NOT NULL,
                    token_hash TEXT NOT NULL UNIQUE,
                    registered_at TEXT NOT NULL,
                    last_seen_at TEXT NOT NULL
                )
            "#;
            self.db_client.execute(query).await?;

            info!("Device schema initialized successfully");
            Ok(())
        })
    }

    fn upsert(&self, device: DeviceUpsert) -> BoxFuture<'_, UpsertOutcome, DbError> {
        Box::pin(async move {
            debug!(hostname = %device.hostname, classroom = %device.classroom_id, "Upserting device");

            // One statement: concurrent first registrations of the same
            // hostname cannot both insert.
            let query = format!(
                r#"
                INSERT INTO devices ({DEVICE_COLUMNS})
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (hostname) DO UPDATE SET
                    classroom_id = excluded.classroom_id,
                    installed_version = CASE
                        WHEN excluded.installed_version = '' THEN devices.installed_version
                        ELSE excluded.installed_version
                    END,
                    last_seen_at = excluded.last_seen_at
                RETURNING {SELECT_COLUMNS}
                "#
            );

            let now = encode_time(device.now);
            let row = sqlx::query(&query)
                .bind(&device.id)
                .bind(&device.hostname)
                .bind(&device.classroom_id)
                .bind(device.installed_version.clone().unwrap_or_default())
                .bind(&device.token_seed)
                .bind(&device.token_hash)
                .bind(&now)
                .bind(&now)
                .fetch_one(self.db_client.pool())
                .await
                .map_err(query_error("Failed to upsert device"))?;

            let stored = device_from_row(&row)?;
            // The fresh id only survives when the row was inserted.
            let created = stored.id == device.id;
            info!(hostname = %stored.hostname, created, "Device upserted");
            Ok(UpsertOutcome {
                device: stored,
                created,
            })
        })
    }

    fn find_by_hostname<'a>(
        &'a self,
        hostname: &'a str,
    ) -> BoxFuture<'a, Option<Device>, DbError> {
        Box::pin(async move {
            let query = format!("SELECT {SELECT_COLUMNS} FROM devices WHERE hostname = $1");
            let row = sqlx::query(&query)
                .bind(hostname)
                .fetch_optional(self.db_client.pool())
                .await
                .map_err(query_error("Failed to find device by hostname"))?;

            row.as_ref().map(device_from_row).transpose()
        })
    }

    fn find_by_token_hash<'a>(
        &'a self,
        token_hash: &'a str,
    ) -> BoxFuture<'a, Option<Device>, DbError> {
        Box::pin(async move {
            let query = format!("SELECT {SELECT_COLUMNS} FROM devices WHERE token_hash = $1");
            let row = sqlx::query(&query)
                .bind(token_hash)
                .fetch_optional(self.db_client.pool())
                .await
                .map_err(query_error("Failed to find device by token"))?;

            row.as_ref().map(device_from_row).transpose()
        })
    }

    fn rotate_token<'a>(
        &'a self,
        hostname: &'a str,
        token_seed: &'a str,
        token_hash: &'a str,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, Option<Device>, DbError> {
        Box::pin(async move {
            debug!(hostname = %hostname, "Rotating device token");

            let query = format!(
                r#"
                UPDATE devices
                SET token_seed = $1, token_hash = $2, last_seen_at = $3
                WHERE hostname = $4
                RETURNING {SELECT_COLUMNS}
                "#
            );
            let row = sqlx::query(&query)
                .bind(token_seed)
                .bind(token_hash)
                .bind(encode_time(now))
                .bind(hostname)
                .fetch_optional(self.db_client.pool())
                .await
                .map_err(query_error("Failed to rotate device token"))?;

            row.as_ref().map(device_from_row).transpose()
        })
    }

    fn touch_last_seen<'a>(
        &'a self,
        id: &'a str,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, (), DbError> {
        Box::pin(async move {
            sqlx::query("UPDATE devices SET last_seen_at = $1 WHERE id = $2")
                .bind(encode_time(now))
                .bind(id)
                .execute(self.db_client.pool())
                .await
                .map_err(query_error("Failed to update last seen"))?;
            Ok(())
        })
    }
}
