#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(dead_code)]

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

pub async fn temp_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect sqlite::memory:");
    sqlx::query("PRAGMA foreign_keys=ON;")
        .execute(&pool)
        .await
        .unwrap();
    geomigrate::migrate::apply_migrations(&pool)
        .await
        .expect("apply migrations");
    pool
}
