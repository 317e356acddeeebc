use crate::datamodel::ConnectionRecord;
use crate::registry::{ConnectionRegistry, RegistryError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

// SQLite implementation
#[derive(Debug)]
pub struct SqliteRegistry {
    pool: SqlitePool,
}

impl SqliteRegistry {
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let connect_options = SqliteConnectOptions::from_str(connection_string)
            .context("Failed to create sqlite connection options")?
            // Create the database file if it doesn't exist
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            // Set a busy timeout of 5 seconds
            .busy_timeout(Duration::from_secs(5));

        // Every connection to an in-memory database sees its own database.
        let max_connections = if connection_string.contains(":memory:") {
            1
        } else {
            8
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await
            .context("Failed to create sqlite pool")?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl ConnectionRegistry for SqliteRegistry {
    async fn create_or_migrate(&self) -> Result<(), RegistryError> {
        sqlx::migrate!("src/registry/sqlite/migrations")
            .run(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert(&self, record: &ConnectionRecord) -> Result<(), RegistryError> {
        sqlx::query(
            r#"
            INSERT INTO connections (id, established_at)
            VALUES (?, ?)
            ON CONFLICT(id) DO UPDATE SET established_at = excluded.established_at
            "#,
        )
        .bind(&record.id)
        .bind(record.established_at.timestamp_micros())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<bool, RegistryError> {
        let result = sqlx::query("DELETE FROM connections WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn scan_all(&self) -> Result<Vec<ConnectionRecord>, RegistryError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT id, established_at
            FROM connections
            ORDER BY established_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(id, micros)| match DateTime::from_timestamp_micros(micros) {
                Some(established_at) => Ok(ConnectionRecord { id, established_at }),
                None => Err(RegistryError::InvalidRecord {
                    id,
                    message: format!("timestamp {} is out of range", micros),
                }),
            })
            .collect()
    }

    async fn health_check(&self) -> Result<(), RegistryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
