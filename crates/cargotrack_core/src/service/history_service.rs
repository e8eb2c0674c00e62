//! History replay use-case.
//!
//! # Responsibility
//! - Load the stored trajectory in capture order.
//! - Rebuild a drawable path with the replay step limit.

use crate::config::TrackingConfig;
use crate::model::sample::GeoPoint;
use crate::path::reconstruct::reconstruct_path;
use crate::path::PathMode;
use crate::repo::location_repo::{LocationListQuery, LocationRepository, RepoResult};
use log::info;

/// Path rebuilt from history, ready for the map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReplayPath {
    pub points: Vec<GeoPoint>,
    /// Where to center the camera; the newest retained point.
    pub camera_target: Option<GeoPoint>,
    /// Number of stored rows read before filtering.
    pub source_len: usize,
}

impl ReplayPath {
    pub fn polyline_ready(&self) -> bool {
        self.points.len() > 1
    }

    pub fn dropped(&self) -> usize {
        self.source_len - self.points.len()
    }
}

pub struct HistoryService<R: LocationRepository> {
    repo: R,
    config: TrackingConfig,
}

impl<R: LocationRepository> HistoryService<R> {
    pub fn new(repo: R, config: TrackingConfig) -> Self {
        Self { repo, config }
    }

    /// Reads all stored locations and rebuilds the replay path.
    pub fn load_replay(&self) -> RepoResult<ReplayPath> {
        self.load_replay_since(None)
    }

    /// Same as `load_replay`, limited to rows captured at or after `since_ms`.
    pub fn load_replay_since(&self, since_ms: Option<i64>) -> RepoResult<ReplayPath> {
        let stored = self.repo.list_locations(&LocationListQuery {
            since_ms,
            ..LocationListQuery::default()
        })?;
        let source_len = stored.len();

        let points = reconstruct_path(
            stored.iter().map(|location| location.point()),
            PathMode::Replay.max_step_m(&self.config.path),
        );
        let replay = ReplayPath {
            camera_target: points.last().copied(),
            points,
            source_len,
        };

        info!(
            "event=history_replay module=service status=ok stored={} retained={}",
            replay.source_len,
            replay.points.len()
        );
        Ok(replay)
    }
}
