//! Factory for device repositories

use crate::repositories::device::DeviceRepository;
use crate::repositories::device_memory::InMemoryDeviceRepository;
use crate::repositories::device_sql::SqlDeviceRepository;
use crate::{DbClient, RepositoryFactory};
use std::sync::Arc;
use tracing::{info, warn};

/// Chooses the device repository backend.
///
/// With a database client the SQL repository is used; without one the
/// registry lives in memory and is lost on restart.
#[derive(Debug, Clone)]
pub struct DeviceRepositoryFactory;

impl DeviceRepositoryFactory {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DeviceRepositoryFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryFactory<Arc<dyn DeviceRepository>, Option<DbClient>> for DeviceRepositoryFactory {
    fn create_repository(&self, db_client: Option<DbClient>) -> Arc<dyn DeviceRepository> {
        match db_client {
            Some(client) => {
                info!("Using SQL device registry");
                Arc::new(SqlDeviceRepository::new(client))
            }
            None => {
                warn!("No database configured, device registry is in memory only");
                Arc::new(InMemoryDeviceRepository::new())
            }
        }
    }
}
