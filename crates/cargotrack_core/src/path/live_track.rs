//! Incremental live track for the map view.
//!
//! # Responsibility
//! - Accumulate accepted points while tracking, dropping implausible jumps.
//! - Tell the host where to put the current-position marker and whether a
//!   polyline can be drawn.
//!
//! # Invariants
//! - The marker follows the newest valid point even when that point is not
//!   appended to the polyline.
//! - A point added by `push` is never farther than `max_step_m` from the
//!   point before it. Points installed by `replace_with` keep whatever
//!   spacing they arrived with (a history replay uses the wider replay
//!   limit).

use super::distance::distance_m;
use crate::model::sample::GeoPoint;
use log::debug;

/// Outcome of pushing one point into a `LiveTrack`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackUpdate {
    /// Whether the point became part of the polyline.
    pub appended: bool,
    /// Where the current-position marker should be drawn.
    pub marker: Option<GeoPoint>,
    /// True once at least two points are retained.
    pub polyline_ready: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiveTrack {
    max_step_m: f64,
    points: Vec<GeoPoint>,
}

impl LiveTrack {
    pub fn new(max_step_m: f64) -> Self {
        Self {
            max_step_m,
            points: Vec::new(),
        }
    }

    pub fn max_step_m(&self) -> f64 {
        self.max_step_m
    }

    /// Offers a new point to the track.
    ///
    /// A no-fix point is never appended and leaves the marker on the last
    /// retained point.
    pub fn push(&mut self, point: GeoPoint) -> TrackUpdate {
        if point.is_no_fix() {
            return self.update(false, self.last());
        }

        let appended = match self.points.last() {
            None => true,
            Some(last) => {
                let step = distance_m(*last, point);
                if step > self.max_step_m {
                    debug!(
                        "event=live_point_skipped module=path step_m={:.1} limit_m={}",
                        step, self.max_step_m
                    );
                }
                step <= self.max_step_m
            }
        };

        if appended {
            self.points.push(point);
        }
        self.update(appended, Some(point))
    }

    /// Drops every point, e.g. when a new tracking session starts.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Replaces the track with an already reconstructed path.
    ///
    /// The points are taken as is; only later `push` calls are held to
    /// `max_step_m`.
    pub fn replace_with(&mut self, points: Vec<GeoPoint>) {
        self.points = points;
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn last(&self) -> Option<GeoPoint> {
        self.points.last().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn polyline_ready(&self) -> bool {
        self.points.len() > 1
    }

    fn update(&self, appended: bool, marker: Option<GeoPoint>) -> TrackUpdate {
        TrackUpdate {
            appended,
            marker,
            polyline_ready: self.polyline_ready(),
        }
    }
}
