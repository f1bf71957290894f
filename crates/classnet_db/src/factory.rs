//! Picks the registry backing from configuration

use crate::client::DbClient;
use crate::error::DbError;
use classnet_config::AppConfig;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct DbClientFactory;

impl DbClientFactory {
    pub fn new() -> Self {
        Self
    }

    /// Connect using the `[database]` section.
    ///
    /// `Ok(None)` when the section is absent, so the caller can fall back to
    /// the in-memory registry.
    pub async fn from_app_config(&self, config: &AppConfig) -> Result<Option<DbClient>, DbError> {
        match config.database.as_ref() {
            Some(db_config) => DbClient::from_config(db_config).await.map(Some),
            None => {
                debug!("no database configured");
                Ok(None)
            }
        }
    }
}
