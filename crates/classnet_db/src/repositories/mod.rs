//! Repositories for registry entities

pub mod device;
pub mod device_factory;
pub mod device_memory;
pub mod device_sql;

pub use device::{Device, DeviceRepository, DeviceUpsert, UpsertOutcome};
pub use device_factory::DeviceRepositoryFactory;
pub use device_memory::InMemoryDeviceRepository;
pub use device_sql::SqlDeviceRepository;
