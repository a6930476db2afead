use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::{now_ms, AppResult};

/// Durable boolean flag storage surviving process restarts.
///
/// The engine only ever writes `true`; flags are never reset, so concurrent
/// reads need no coordination.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// `None` means the key has never been written.
    async fn get_bool(&self, key: &str) -> AppResult<Option<bool>>;
    async fn set_bool(&self, key: &str, value: bool) -> AppResult<()>;
}

pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn get_bool(&self, key: &str) -> AppResult<Option<bool>> {
        let value: Option<i64> =
            sqlx::query_scalar("SELECT value FROM migration_settings WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value.map(|v| v != 0))
    }

    async fn set_bool(&self, key: &str, value: bool) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO migration_settings (key, value, updated_at) VALUES (?1, ?2, ?3)\n             ON CONFLICT(key) DO UPDATE SET\n               value=excluded.value,\n               updated_at=excluded.updated_at",
        )
        .bind(key)
        .bind(i64::from(value))
        .bind(now_ms())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// In-memory settings for tests and hosts without durable storage.
#[derive(Default)]
pub struct MemorySettingsStore {
    data: Mutex<HashMap<String, bool>>,
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get_bool(&self, key: &str) -> AppResult<Option<bool>> {
        Ok(self
            .data
            .lock()
            .map(|guard| guard.get(key).copied())
            .unwrap_or_default())
    }

    async fn set_bool(&self, key: &str, value: bool) -> AppResult<()> {
        if let Ok(mut guard) = self.data.lock() {
            guard.insert(key.to_string(), value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_roundtrip() {
        let store = MemorySettingsStore::default();
        assert_eq!(store.get_bool("flag").await.unwrap(), None);

        store.set_bool("flag", true).await.unwrap();
        assert_eq!(store.get_bool("flag").await.unwrap(), Some(true));

        store.set_bool("flag", false).await.unwrap();
        assert_eq!(store.get_bool("flag").await.unwrap(), Some(false));
    }
}
