//! Periodic upload use-case.
//!
//! # Responsibility
//! - Push locally stored, unacknowledged locations to the document store.
//! - Offer a pull/acknowledge pair for hosts that upload on their own.
//!
//! # Invariants
//! - Uploads go oldest first, bounded by `sync.batch_limit`.
//! - A failed upload is logged and left pending; there is no retry within
//!   a run.
//! - Only acknowledged rows are marked synced.
//! - A scheduled run does nothing unless the device meets the sync policy.

use crate::config::TrackingConfig;
use crate::model::sample::{LocationDocument, LocationId};
use crate::repo::location_repo::{LocationListQuery, LocationRepository, RepoResult};
use crate::sync::policy::{DeviceConditions, SyncPolicy};
use crate::sync::sink::DocumentSink;
use log::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    pub attempted: usize,
    pub uploaded: usize,
    pub failed: usize,
}

pub struct SyncService<R: LocationRepository> {
    repo: R,
    config: TrackingConfig,
}

impl<R: LocationRepository> SyncService<R> {
    pub fn new(repo: R, config: TrackingConfig) -> Self {
        Self { repo, config }
    }

    /// Run conditions derived from `sync` config.
    pub fn policy(&self) -> SyncPolicy {
        SyncPolicy::from_config(&self.config.sync)
    }

    /// Scheduled entry point: uploads one batch only when `conditions`
    /// satisfy the policy, otherwise returns an empty report.
    pub fn run_when_allowed(
        &self,
        sink: &mut impl DocumentSink,
        conditions: &DeviceConditions,
        now_ms: i64,
    ) -> RepoResult<SyncReport> {
        if !self.policy().allows(conditions) {
            info!(
                "event=sync_run module=sync status=skipped network={} idle={} charging={}",
                conditions.network_connected, conditions.device_idle, conditions.charging
            );
            return Ok(SyncReport::default());
        }
        self.run(sink, now_ms)
    }

    /// Returns up to `limit` pending documents with their local ids.
    ///
    /// `limit` is capped at `sync.batch_limit`; `None` or `0` means the cap.
    pub fn pending_documents(
        &self,
        limit: Option<u32>,
    ) -> RepoResult<Vec<(LocationId, LocationDocument)>> {
        let cap = self.config.sync.batch_limit;
        let limit = match limit {
            Some(0) | None => cap,
            Some(value) => value.min(cap),
        };
        let pending = self.repo.list_locations(&LocationListQuery {
            only_unsynced: true,
            limit: Some(limit),
            ..LocationListQuery::default()
        })?;
        Ok(pending
            .into_iter()
            .map(|location| (location.id, location.to_document()))
            .collect())
    }

    /// Marks host-uploaded rows as synced.
    pub fn acknowledge(&self, ids: &[LocationId], now_ms: i64) -> RepoResult<usize> {
        let changed = self.repo.mark_synced(ids, now_ms)?;
        info!("event=sync_ack module=sync status=ok acknowledged={changed}");
        Ok(changed)
    }

    /// Uploads one batch through `sink` without checking device conditions.
    ///
    /// # Errors
    /// - Only repository failures abort the run; sink failures are counted.
    pub fn run(&self, sink: &mut impl DocumentSink, now_ms: i64) -> RepoResult<SyncReport> {
        info!("event=sync_run module=sync status=start");
        let pending = self.pending_documents(None)?;

        let mut report = SyncReport {
            attempted: pending.len(),
            ..SyncReport::default()
        };
        let mut uploaded_ids = Vec::with_capacity(pending.len());

        for (id, document) in &pending {
            match sink.write_document(document) {
                Ok(remote_id) => {
                    info!("event=sync_upload module=sync status=ok id={id} remote_id={remote_id}");
                    uploaded_ids.push(*id);
                }
                Err(err) => {
                    warn!(
                        "event=sync_upload module=sync status=error id={} error={}",
                        id, err
                    );
                    report.failed += 1;
                }
            }
        }

        if let Err(err) = self.repo.mark_synced(&uploaded_ids, now_ms) {
            error!(
                "event=sync_run module=sync status=error error_code=mark_synced_failed error={}",
                err
            );
            return Err(err);
        }
        report.uploaded = uploaded_ids.len();

        info!(
            "event=sync_run module=sync status=ok attempted={} uploaded={} failed={}",
            report.attempted, report.uploaded, report.failed
        );
        Ok(report)
    }
}
