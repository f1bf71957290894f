//! Device registry storage for classnet
//!
//! The registry is the only mutable shared state of the service. It sits on
//! an `sqlx::Any` pool so the same code runs against SQLite (the default) or
//! PostgreSQL, selected by the database URL and the matching cargo feature.
//! The SQL relies on `ON CONFLICT` and `RETURNING`. Without a database the
//! registry falls back to memory.
//!
//! ```rust,no_run
//! use classnet_db::{DbClient, DeviceRepositoryFactory, RepositoryFactory};
//!
//! async fn setup() -> Result<(), classnet_db::error::DbError> {
//!     let client = DbClient::from_url("sqlite:data/classnet.db").await?;
//!     let devices = DeviceRepositoryFactory::new().create_repository(Some(client));
//!     devices.init_schema().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod factory;
pub mod repositories;
pub mod repository;

pub use client::DbClient;
pub use error::DbError;
pub use factory::DbClientFactory;
pub use repository::RepositoryFactory;

pub use repositories::{
    Device, DeviceRepository, DeviceRepositoryFactory, DeviceUpsert, InMemoryDeviceRepository,
    SqlDeviceRepository, UpsertOutcome,
};
