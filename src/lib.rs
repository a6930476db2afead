//! One-time, resumable background migration over a locally stored media
//! catalog: stages records missing geolocation metadata, looks their
//! coordinates up through an asset provider, marks located records for
//! re-upload, and discards the rest. See [`location_migration`] for the
//! engine; the remaining modules are its storage collaborators.

use std::time::{SystemTime, UNIX_EPOCH};

pub mod catalog;
pub mod db;
mod error;
pub mod location_migration;
pub mod migrate;
pub mod provider;
pub mod settings;
pub mod staging;

pub use error::{AppError, AppResult};

pub(crate) fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
