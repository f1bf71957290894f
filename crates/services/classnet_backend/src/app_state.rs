// --- File: crates/services/classnet_backend/src/app_state.rs ---
use classnet_common::services::{AdminAuthenticator, PolicyCatalog};
use classnet_common::{config_error, ClassnetError};
use classnet_config::AppConfig;
use classnet_db::{DbClient, DbClientFactory, DeviceRepository, DeviceRepositoryFactory, RepositoryFactory};
use classnet_policy::InMemoryPolicyCatalog;
use classnet_tokens::{StaticAdminAuthenticator, TokenIssuer};
use std::sync::Arc;
use tracing::{info, warn};

/// Everything the routers are built from.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub issuer: Arc<TokenIssuer>,
    pub devices: Arc<dyn DeviceRepository>,
    pub catalog: Arc<dyn PolicyCatalog>,
    pub admins: Arc<dyn AdminAuthenticator>,
    /// Present when a `[database]` section is configured; used by `/health`.
    pub db: Option<DbClient>,
}

impl AppState {
    /// Wire up storage, catalog and credentials from configuration.
    pub async fn from_config(config: Arc<AppConfig>) -> Result<Self, ClassnetError> {
        let db = DbClientFactory::new().from_app_config(&config).await?;
        let devices = DeviceRepositoryFactory::new().create_repository(db.clone());
        devices.init_schema().await?;

        let catalog = match config.catalog.as_ref() {
            Some(catalog) => {
                let loaded = InMemoryPolicyCatalog::from_file(&catalog.path)?;
                info!(path = %catalog.path, "Catalog loaded");
                loaded
            }
            None => {
                warn!("No catalog configured, every device will receive the deny-all document");
                InMemoryPolicyCatalog::default()
            }
        };

        let state = AppStateBuilder::new(config.clone())
            .with_devices(devices)
            .with_catalog(Arc::new(catalog))
            .with_db(db)
            .build()?;
        Ok(state)
    }
}

/// Builder for [`AppState`]; tests use it to plug in in-memory collaborators.
pub struct AppStateBuilder {
    config: Arc<AppConfig>,
    devices: Option<Arc<dyn DeviceRepository>>,
    catalog: Option<Arc<dyn PolicyCatalog>>,
    admins: Option<Arc<dyn AdminAuthenticator>>,
    db: Option<DbClient>,
}

impl AppStateBuilder {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            devices: None,
            catalog: None,
            admins: None,
            db: None,
        }
    }

    pub fn with_devices(mut self, devices: Arc<dyn DeviceRepository>) -> Self {
        self.devices = Some(devices);
        self
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn PolicyCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_admins(mut self, admins: Arc<dyn AdminAuthenticator>) -> Self {
        self.admins = Some(admins);
        self
    }

    pub fn with_db(mut self, db: Option<DbClient>) -> Self {
        self.db = db;
        self
    }

    /// Devices are required; admins default to the configured access tokens.
    pub fn build(self) -> Result<AppState, ClassnetError> {
        let issuer = Arc::new(TokenIssuer::from_config(&self.config.tokens)?);
        let devices = self
            .devices
            .ok_or_else(|| config_error("AppState requires a device repository"))?;
        let catalog = self
            .catalog
            .unwrap_or_else(|| Arc::new(InMemoryPolicyCatalog::default()));
        let admins = self.admins.unwrap_or_else(|| {
            Arc::new(StaticAdminAuthenticator::from_config(
                &self.config.admin.clone().unwrap_or_default(),
            ))
        });

        Ok(AppState {
            config: self.config,
            issuer,
            devices,
            catalog,
            admins,
            db: self.db,
        })
    }
}
