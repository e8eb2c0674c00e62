//! Live tracking use-case.
//!
//! # Responsibility
//! - Own the tracking on/off state and the live map track.
//! - Run each provider sample through filter, persistence and track update.
//!
//! # Invariants
//! - Starting an already running session is a no-op and keeps the track.
//! - Stopping is always allowed and idempotent.
//! - A persistence failure is logged and never stops the batch.
//! - Samples that arrive while stopped are ignored.

use crate::config::TrackingConfig;
use crate::filter::sample_filter::{evaluate_sample, RejectReason, SampleVerdict};
use crate::model::sample::{GeoPoint, LocationId, LocationSample};
use crate::path::live_track::{LiveTrack, TrackUpdate};
use crate::path::PathMode;
use crate::repo::location_repo::LocationRepository;
use log::{debug, error, info};

/// Foreground notification text shown before the first fix.
pub const TRACKING_STATUS_IDLE_TEXT: &str = "Tracking location...";

/// Per-process tracking state shared between provider callbacks and the map.
#[derive(Debug, Clone)]
pub struct TrackingSession {
    is_tracking: bool,
    track: LiveTrack,
}

impl TrackingSession {
    pub fn new(config: &TrackingConfig) -> Self {
        Self {
            is_tracking: false,
            track: LiveTrack::new(PathMode::Live.max_step_m(&config.path)),
        }
    }

    /// Starts a session. Returns `false` when one is already running.
    pub fn start(&mut self) -> bool {
        if self.is_tracking {
            debug!("event=tracking_start module=service status=skipped reason=already_tracking");
            return false;
        }
        self.track.clear();
        self.is_tracking = true;
        info!("event=tracking_start module=service status=ok");
        true
    }

    /// Stops the session. Returns whether it was running.
    pub fn stop(&mut self) -> bool {
        let was_tracking = self.is_tracking;
        self.is_tracking = false;
        info!(
            "event=tracking_stop module=service status=ok was_tracking={}",
            was_tracking
        );
        was_tracking
    }

    pub fn is_tracking(&self) -> bool {
        self.is_tracking
    }

    pub fn track(&self) -> &LiveTrack {
        &self.track
    }

    /// Replaces the live track with a path rebuilt from history.
    pub fn adopt_replay(&mut self, points: Vec<GeoPoint>) {
        self.track.replace_with(points);
    }
}

/// A sample that passed the filter and reached the UI/persistence fan-out.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationUpdate {
    pub point: GeoPoint,
    /// `None` when persistence failed.
    pub stored_id: Option<LocationId>,
    pub track: TrackUpdate,
    /// Foreground notification text, e.g. `Location: 1.000000, 2.000000`.
    pub status_text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SampleOutcome {
    Accepted(LocationUpdate),
    Rejected(RejectReason),
    /// Delivered while tracking was stopped.
    Ignored,
}

/// Use-case service that applies provider batches to a session.
pub struct TrackingService<R: LocationRepository> {
    repo: R,
    config: TrackingConfig,
}

impl<R: LocationRepository> TrackingService<R> {
    pub fn new(repo: R, config: TrackingConfig) -> Self {
        Self { repo, config }
    }

    /// Processes one provider callback batch in delivery order.
    ///
    /// # Contract
    /// - Returns exactly one outcome per input sample.
    /// - Rejected samples touch neither storage nor the live track.
    pub fn process_batch<I>(&self, session: &mut TrackingSession, samples: I) -> Vec<SampleOutcome>
    where
        I: IntoIterator<Item = LocationSample>,
    {
        samples
            .into_iter()
            .map(|sample| self.process_sample(session, &sample))
            .collect()
    }

    pub fn process_sample(
        &self,
        session: &mut TrackingSession,
        sample: &LocationSample,
    ) -> SampleOutcome {
        if !session.is_tracking() {
            debug!("event=location_update module=service status=skipped reason=not_tracking");
            return SampleOutcome::Ignored;
        }

        if let SampleVerdict::Rejected(reason) = evaluate_sample(sample, &self.config.filter) {
            return SampleOutcome::Rejected(reason);
        }

        let stored_id = match self.repo.insert_location(sample) {
            Ok(id) => {
                debug!("event=location_save module=service status=ok id={id}");
                Some(id)
            }
            Err(err) => {
                error!(
                    "event=location_save module=service status=error error_code=location_save_failed error={}",
                    err
                );
                None
            }
        };

        let point = sample.point();
        let track = session.track.push(point);
        let status_text = format!("Location: {}", point.format_coordinates());
        debug!(
            "event=location_update module=service status=ok appended={} track_len={}",
            track.appended,
            session.track.len()
        );

        SampleOutcome::Accepted(LocationUpdate {
            point,
            stored_id,
            track,
            status_text,
        })
    }
}
