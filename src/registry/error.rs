use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[cfg(feature = "sqlite")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[cfg(feature = "sqlite")]
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored row could not be turned back into a record.
    #[error("Invalid connection record {id}: {message}")]
    InvalidRecord { id: String, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}
