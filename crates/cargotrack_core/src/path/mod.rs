//! Trajectory denoising.
//!
//! # Responsibility
//! - Measure hops between consecutive positions.
//! - Rebuild a clean polyline from a historical point set.
//! - Maintain the incremental live track shown on the map.
//!
//! # Invariants
//! - Both batch and live paths use the same greedy rule: a point is kept
//!   iff its distance to the last *retained* point is within the step limit.
//! - No backtracking; a dropped point never re-enters the path.

pub mod distance;
pub mod live_track;
pub mod reconstruct;

use crate::config::PathConfig;

/// Which step limit applies to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMode {
    /// Incremental points received while tracking.
    Live,
    /// Points replayed from the persisted history.
    Replay,
}

impl PathMode {
    /// Returns the maximum hop in meters for this mode.
    pub fn max_step_m(self, config: &PathConfig) -> f64 {
        match self {
            Self::Live => config.live_max_step_m,
            Self::Replay => config.replay_max_step_m,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Replay => "replay",
        }
    }
}
