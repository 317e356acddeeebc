pub mod sqlite;

pub use sqlite::SqliteRegistry;
