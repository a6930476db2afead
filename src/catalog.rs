use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::AppResult;

/// Read-only view of the source-of-truth file catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Local IDs of files that are backed up but carry no location metadata.
    async fn missing_location_candidates(&self) -> AppResult<Vec<String>>;
}

/// Adapter over the host catalog's `local_files` table.
///
/// Expected columns: `local_id TEXT`, `uploaded INTEGER` (non-zero once the
/// file is backed up), `latitude REAL`, `longitude REAL`. Coordinates that
/// are NULL or exactly (0, 0) count as missing.
pub struct SqliteCatalogStore {
    pool: SqlitePool,
}

impl SqliteCatalogStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalogStore {
    async fn missing_location_candidates(&self) -> AppResult<Vec<String>> {
        let ids = sqlx::query_scalar(
            "SELECT local_id FROM local_files\n             WHERE uploaded != 0\n               AND (latitude IS NULL OR longitude IS NULL\n                    OR (latitude = 0.0 AND longitude = 0.0))\n             ORDER BY local_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}
