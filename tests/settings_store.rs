#![allow(clippy::unwrap_used, clippy::expect_used)]

mod util;

use anyhow::Result;

use geomigrate::settings::{SettingsStore, SqliteSettingsStore};

#[tokio::test]
async fn absent_key_reads_as_none() -> Result<()> {
    let store = SqliteSettingsStore::new(util::temp_pool().await);
    assert_eq!(store.get_bool("fm_IsLocalImportDone").await?, None);
    Ok(())
}

#[tokio::test]
async fn set_then_get_roundtrips() -> Result<()> {
    let store = SqliteSettingsStore::new(util::temp_pool().await);

    store.set_bool("fm_IsLocalImportDone", true).await?;
    assert_eq!(store.get_bool("fm_IsLocalImportDone").await?, Some(true));

    store.set_bool("fm_IsLocalImportDone", false).await?;
    assert_eq!(store.get_bool("fm_IsLocalImportDone").await?, Some(false));
    Ok(())
}

#[tokio::test]
async fn keys_are_independent() -> Result<()> {
    let store = SqliteSettingsStore::new(util::temp_pool().await);

    store.set_bool("fm_IsLocalImportDone", true).await?;

    assert_eq!(store.get_bool("fm_IsLocalImportDone").await?, Some(true));
    assert_eq!(store.get_bool("fm_isLocationMigrationComplete").await?, None);
    Ok(())
}
