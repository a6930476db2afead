#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use geomigrate::db::open_sqlite_pool;
use geomigrate::location_migration::{IMPORT_DONE_KEY, MIGRATION_COMPLETE_KEY};
use geomigrate::migrate;
use geomigrate::settings::{SettingsStore, SqliteSettingsStore};
use geomigrate::staging::SqliteStagingStore;

#[derive(Parser)]
#[command(name = "migrate-locations", about = "Location migration maintenance helper")]
struct Cli {
    /// Path to the catalog database
    #[arg(long, value_name = "PATH")]
    db: PathBuf,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Apply the engine-owned schema migrations
    Up,
    /// Print checkpoint flags and staged-queue size as JSON
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("GEOMIGRATE_LOG").unwrap_or_else(|_| "geomigrate=info,sqlx=warn".into()),
        )
        .json()
        .with_target(true)
        .try_init();

    let cli = Cli::parse();
    let pool = open_sqlite_pool(&cli.db).await.context("open database")?;

    match cli.cmd {
        Cmd::Up => {
            migrate::apply_migrations(&pool)
                .await
                .context("apply migrations")?;
            println!("ok");
        }
        Cmd::Status => {
            migrate::apply_migrations(&pool)
                .await
                .context("apply migrations")?;
            let settings = SqliteSettingsStore::new(pool.clone());
            let staging = SqliteStagingStore::new(pool.clone());
            let status = serde_json::json!({
                "import_done": settings.get_bool(IMPORT_DONE_KEY).await?.unwrap_or(false),
                "migration_complete": settings
                    .get_bool(MIGRATION_COMPLETE_KEY)
                    .await?
                    .unwrap_or(false),
                "staged": staging.len().await?,
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    Ok(())
}
