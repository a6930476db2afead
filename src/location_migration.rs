use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use serde::Serialize;

use crate::catalog::CatalogStore;
use crate::provider::{LocationProvider, LookupError};
use crate::settings::SettingsStore;
use crate::staging::StagingStore;
use crate::AppResult;

pub const IMPORT_DONE_KEY: &str = "fm_IsLocalImportDone";
pub const MIGRATION_COMPLETE_KEY: &str = "fm_isLocationMigrationComplete";

pub const DEFAULT_PAGE_SIZE: i64 = 100;

/// Downstream consumer that reclassifies located files for re-upload.
///
/// Invoked once per page, before the page is deleted from staging, so a sink
/// failure aborts the run rather than dropping a located file unmarked.
#[async_trait]
pub trait ReuploadSink: Send + Sync {
    async fn mark_for_reupload(&self, ids: &[String]) -> AppResult<()>;
}

/// Placeholder sink until the host wires in its upload queue.
pub struct NoopReuploadSink;

#[async_trait]
impl ReuploadSink for NoopReuploadSink {
    async fn mark_for_reupload(&self, _ids: &[String]) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct MigrationSummary {
    /// Candidates newly staged by this run's import phase.
    pub staged: u64,
    pub pages: u64,
    pub marked: u64,
    pub discarded: u64,
    pub missing: u64,
    pub lookup_errors: u64,
    pub duration_ms: u64,
}

type InFlight = Shared<BoxFuture<'static, ()>>;

/// Drives the two-phase location migration: a one-shot import of catalog
/// candidates into the staging queue, then a paged drain that classifies each
/// candidate through the location provider.
///
/// Clones share the same single-flight state; separate instances are fully
/// independent.
#[derive(Clone)]
pub struct LocationMigration {
    catalog: Arc<dyn CatalogStore>,
    staging: Arc<dyn StagingStore>,
    settings: Arc<dyn SettingsStore>,
    provider: Arc<dyn LocationProvider>,
    sink: Arc<dyn ReuploadSink>,
    page_size: i64,
    in_flight: Arc<Mutex<Option<InFlight>>>,
}

impl LocationMigration {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        staging: Arc<dyn StagingStore>,
        settings: Arc<dyn SettingsStore>,
        provider: Arc<dyn LocationProvider>,
        sink: Arc<dyn ReuploadSink>,
    ) -> Self {
        Self {
            catalog,
            staging,
            settings,
            provider,
            sink,
            page_size: DEFAULT_PAGE_SIZE,
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Whether a full migration run has ever completed. An absent flag reads
    /// as `false`.
    pub async fn is_migration_complete(&self) -> AppResult<bool> {
        Ok(self
            .settings
            .get_bool(MIGRATION_COMPLETE_KEY)
            .await?
            .unwrap_or(false))
    }

    /// Run the migration, coalescing concurrent callers onto one physical
    /// run. Callers arriving while a run is in flight await that run's
    /// completion; callers arriving afterwards start a fresh run.
    ///
    /// Failures are logged and swallowed; callers observe final state
    /// through [`LocationMigration::is_migration_complete`]. A prior partial
    /// run resumes from the durable checkpoints.
    pub fn run_migration(&self) -> impl Future<Output = ()> {
        let mut guard = self.in_flight.lock().expect("in-flight lock");
        if let Some(run) = guard.as_ref() {
            return run.clone();
        }

        let engine = self.clone();
        let run: InFlight = async move {
            match engine.run_once().await {
                Ok(summary) => {
                    tracing::info!(
                        target: "geomigrate",
                        event = "location_migration_complete",
                        staged = summary.staged,
                        pages = summary.pages,
                        marked = summary.marked,
                        discarded = summary.discarded,
                        missing = summary.missing,
                        lookup_errors = summary.lookup_errors,
                        duration_ms = summary.duration_ms,
                        "Location migration finished"
                    );
                }
                Err(err) => {
                    tracing::error!(
                        target: "geomigrate",
                        event = "location_migration_failed",
                        error = %err,
                        "Location migration aborted; the next run resumes from the last checkpoint"
                    );
                }
            }
            // Always the run's final step, success or failure.
            let mut guard = engine.in_flight.lock().expect("in-flight lock");
            *guard = None;
        }
        .boxed()
        .shared();

        *guard = Some(run.clone());
        run
    }

    async fn run_once(&self) -> AppResult<MigrationSummary> {
        let started = Instant::now();
        let mut summary = MigrationSummary::default();

        self.import_candidates(&mut summary).await?;
        self.drain_staging(&mut summary).await?;

        self.settings.set_bool(MIGRATION_COMPLETE_KEY, true).await?;
        summary.duration_ms = started.elapsed().as_millis() as u64;
        Ok(summary)
    }

    /// One-shot bulk copy of catalog candidates into the staging queue.
    async fn import_candidates(&self, summary: &mut MigrationSummary) -> AppResult<()> {
        if self
            .settings
            .get_bool(IMPORT_DONE_KEY)
            .await?
            .unwrap_or(false)
        {
            return Ok(());
        }

        let ids = self.catalog.missing_location_candidates().await?;
        self.staging.bulk_insert(&ids).await?;
        // The flag lands only after the insert did; a failed insert leaves it
        // unset and the import retries wholesale on the next run.
        self.settings.set_bool(IMPORT_DONE_KEY, true).await?;

        summary.staged = ids.len() as u64;
        tracing::info!(
            target: "geomigrate",
            event = "location_migration_import",
            staged = ids.len(),
            "Staged backed-up files missing location metadata"
        );
        Ok(())
    }

    async fn drain_staging(&self, summary: &mut MigrationSummary) -> AppResult<()> {
        loop {
            let page = self.staging.page(self.page_size).await?;
            if page.is_empty() {
                break;
            }
            self.classify_page(&page, summary).await?;
            // The whole page goes, classified or not: the queue strictly
            // shrinks, so the loop terminates even when lookups fail.
            self.staging.delete_ids(&page).await?;
            summary.pages += 1;
        }
        Ok(())
    }

    async fn classify_page(
        &self,
        page: &[String],
        summary: &mut MigrationSummary,
    ) -> AppResult<()> {
        let mut located: Vec<String> = Vec::new();
        for local_id in page {
            match self.provider.lookup(local_id).await {
                Ok(coords) if coords.has_location() => located.push(local_id.clone()),
                Ok(_) => summary.discarded += 1,
                Err(LookupError::AssetMissing) => {
                    summary.missing += 1;
                    tracing::debug!(
                        target: "geomigrate",
                        event = "location_migration_asset_missing",
                        local_id = %local_id,
                    );
                }
                Err(LookupError::Provider(err)) => {
                    summary.lookup_errors += 1;
                    tracing::warn!(
                        target: "geomigrate",
                        event = "location_migration_lookup_failed",
                        local_id = %local_id,
                        error = %err,
                        "Skipping candidate after provider failure"
                    );
                }
            }
        }

        self.sink.mark_for_reupload(&located).await?;
        summary.marked += located.len() as u64;
        Ok(())
    }
}
