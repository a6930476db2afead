#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use tempfile::tempdir;

use geomigrate::db::open_sqlite_pool;

#[tokio::test]
async fn opens_wal_pool_and_creates_parent_dirs() -> Result<()> {
    let tmp = tempdir()?;
    let db_path = tmp.path().join("data").join("catalog.sqlite3");

    let pool = open_sqlite_pool(&db_path).await?;
    geomigrate::migrate::apply_migrations(&pool).await?;

    let journal: (String,) = sqlx::query_as("PRAGMA journal_mode;")
        .fetch_one(&pool)
        .await?;
    assert!(journal.0.eq_ignore_ascii_case("wal"));
    assert!(db_path.exists());
    Ok(())
}

#[tokio::test]
async fn reopening_preserves_engine_state() -> Result<()> {
    let tmp = tempdir()?;
    let db_path = tmp.path().join("catalog.sqlite3");

    {
        let pool = open_sqlite_pool(&db_path).await?;
        geomigrate::migrate::apply_migrations(&pool).await?;
        sqlx::query(
            "INSERT INTO migration_settings (key, value, updated_at) VALUES ('fm_IsLocalImportDone', 1, 0)",
        )
        .execute(&pool)
        .await?;
        pool.close().await;
    }

    let pool = open_sqlite_pool(&db_path).await?;
    geomigrate::migrate::apply_migrations(&pool).await?;
    let value: Option<i64> =
        sqlx::query_scalar("SELECT value FROM migration_settings WHERE key = 'fm_IsLocalImportDone'")
            .fetch_optional(&pool)
            .await?;
    assert_eq!(value, Some(1));
    Ok(())
}
