//! Test fixtures for the device registry tests

use chrono::{DateTime, SubsecRound, Utc};
use classnet_db::{
    DbClient, DeviceRepository, DeviceUpsert, InMemoryDeviceRepository, SqlDeviceRepository,
};
use std::sync::Arc;

/// Builds an upsert with fresh id and token material for `hostname`.
pub fn upsert_for(hostname: &str, classroom_id: &str, version: Option<&str>) -> DeviceUpsert {
    upsert_at(hostname, classroom_id, version, now())
}

/// Current time at the microsecond precision the SQL backend stores.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub fn upsert_at(
    hostname: &str,
    classroom_id: &str,
    version: Option<&str>,
    now: DateTime<Utc>,
) -> DeviceUpsert {
    let id = uuid::Uuid::new_v4().to_string();
    DeviceUpsert {
        token_seed: format!("seed-{}", id),
        token_hash: format!("hash-{}", id),
        id,
        hostname: hostname.to_string(),
        classroom_id: classroom_id.to_string(),
        installed_version: version.map(str::to_string),
        now,
    }
}

/// A schema-initialized SQL repository on a private in-memory SQLite database.
pub async fn sql_repository() -> Arc<dyn DeviceRepository> {
    let client = DbClient::from_url("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    let repo = SqlDeviceRepository::new(client);
    repo.init_schema().await.expect("schema");
    Arc::new(repo)
}

/// Both backends, so every contract test runs against each.
pub async fn all_repositories() -> Vec<(&'static str, Arc<dyn DeviceRepository>)> {
    vec![
        ("sql", sql_repository().await),
        ("memory", Arc::new(InMemoryDeviceRepository::new())),
    ]
}
