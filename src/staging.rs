use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::{now_ms, AppResult};

// SQLite caps host parameters at 999 per statement; inserts bind two per row.
const BIND_CHUNK: usize = 400;

/// Persistent queue of candidate local IDs awaiting location evaluation.
///
/// A staged ID appears at most once; pages are served in `local_id` order and
/// are not removed until [`StagingStore::delete_ids`] is called.
#[async_trait]
pub trait StagingStore: Send + Sync {
    async fn bulk_insert(&self, ids: &[String]) -> AppResult<()>;
    /// Non-destructive read of up to `limit` IDs.
    async fn page(&self, limit: i64) -> AppResult<Vec<String>>;
    async fn delete_ids(&self, ids: &[String]) -> AppResult<()>;
}

pub struct SqliteStagingStore {
    pool: SqlitePool,
}

impl SqliteStagingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn len(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM migration_candidates")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

#[async_trait]
impl StagingStore for SqliteStagingStore {
    async fn bulk_insert(&self, ids: &[String]) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let staged_at = now_ms();
        let mut tx = self.pool.begin().await?;
        for chunk in ids.chunks(BIND_CHUNK) {
            // OR IGNORE keeps a retried import from duplicating rows that
            // landed before the previous attempt failed.
            let placeholders = vec!["(?, ?)"; chunk.len()].join(", ");
            let sql = format!(
                "INSERT OR IGNORE INTO migration_candidates (local_id, staged_at) VALUES {placeholders}"
            );
            let mut query = sqlx::query(&sql);
            for id in chunk {
                query = query.bind(id).bind(staged_at);
            }
            query.execute(&mut *tx).await?;
        }
        tx.commit().await?;

        tracing::debug!(
            target: "geomigrate",
            event = "staging_bulk_insert",
            count = ids.len(),
        );
        Ok(())
    }

    async fn page(&self, limit: i64) -> AppResult<Vec<String>> {
        let ids = sqlx::query_scalar(
            "SELECT local_id FROM migration_candidates ORDER BY local_id LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn delete_ids(&self, ids: &[String]) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for chunk in ids.chunks(BIND_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql =
                format!("DELETE FROM migration_candidates WHERE local_id IN ({placeholders})");
            let mut query = sqlx::query(&sql);
            for id in chunk {
                query = query.bind(id);
            }
            query.execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
