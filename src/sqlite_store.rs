//! SQLite-backed [`KeyValueStore`] implementation.
//!
//! Each key is one row of `kv_entries`. Writes are single upsert
//! statements, so a crash mid-write leaves either the old or the new value.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;

use report_vault_core::store::KeyValueStore;

use crate::config::Config;
use crate::{db, migrate};

/// SQLite implementation of the [`KeyValueStore`] trait.
pub struct SqliteKvStore {
    pool: SqlitePool,
}

impl SqliteKvStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the configured database, creating the schema if needed.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(config)
            .await
            .with_context(|| format!("Failed to open database: {}", config.db.path.display()))?;
        migrate::ensure_schema(&pool).await?;
        tracing::debug!(path = %config.db.path.display(), "opened report database");
        Ok(Self::new(pool))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl KeyValueStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_entries WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            r#"
            INSERT INTO kv_entries (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_entries WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
