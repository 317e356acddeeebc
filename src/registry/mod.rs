pub mod error;
pub mod memory;
pub mod registry;
pub mod registry_factory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use error::RegistryError;
pub use registry::ConnectionRegistry;
