//! Batch path reconstruction.

use super::distance::distance_m;
use crate::model::sample::GeoPoint;
use log::debug;

/// Rebuilds a polyline from ordered points in a single greedy pass.
///
/// # Contract
/// - No-fix points (exactly 0, 0) are dropped outright.
/// - The first remaining point is always kept.
/// - Every later point is kept iff it is at most `max_step_m` meters from
///   the last kept point; otherwise it is dropped and the chain continues
///   from the last kept point.
pub fn reconstruct_path<I>(points: I, max_step_m: f64) -> Vec<GeoPoint>
where
    I: IntoIterator<Item = GeoPoint>,
{
    let mut retained: Vec<GeoPoint> = Vec::new();
    let mut dropped = 0_usize;

    for point in points {
        if point.is_no_fix() {
            dropped += 1;
            continue;
        }

        let Some(last) = retained.last().copied() else {
            retained.push(point);
            continue;
        };

        let step = distance_m(last, point);
        if step <= max_step_m {
            retained.push(point);
        } else {
            dropped += 1;
            debug!(
                "event=path_point_dropped module=path step_m={:.1} limit_m={}",
                step, max_step_m
            );
        }
    }

    debug!(
        "event=path_reconstruct module=path status=ok retained={} dropped={}",
        retained.len(),
        dropped
    );
    retained
}
