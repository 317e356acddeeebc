pub mod error;
pub mod local;
pub mod object_store;
pub mod object_store_factory;
#[cfg(feature = "s3")]
pub mod s3;

pub use error::ObjectStoreError;
pub use object_store::ObjectStore;
