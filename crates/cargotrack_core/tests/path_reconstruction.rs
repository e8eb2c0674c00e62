use cargotrack_core::{
    distance_m, reconstruct_path, GeoPoint, LiveTrack, PathConfig, PathMode,
};

fn replay_limit() -> f64 {
    PathMode::Replay.max_step_m(&PathConfig::default())
}

fn live_limit() -> f64 {
    PathMode::Live.max_step_m(&PathConfig::default())
}

/// Deterministic jittery walk with occasional large jumps.
fn noisy_walk(len: usize) -> Vec<GeoPoint> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut lat = 45.0;
    let mut lon = 7.0;
    let mut points = Vec::with_capacity(len);
    for _ in 0..len {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        let roll = (state >> 33) % 100;
        let jitter = ((state >> 11) % 2_000) as f64 / 1_000_000.0 - 0.001;
        let (d_lat, d_lon) = if roll < 8 {
            (0.2, -0.15)
        } else if roll < 10 {
            (0.03, 0.02)
        } else {
            (jitter, jitter / 2.0)
        };
        points.push(GeoPoint::new(lat + d_lat, lon + d_lon));
        lat += jitter;
        lon += jitter / 2.0;
    }
    points
}

fn assert_steps_within(points: &[GeoPoint], limit: f64) {
    for pair in points.windows(2) {
        let step = distance_m(pair[0], pair[1]);
        assert!(step <= limit, "step {step} exceeds {limit}");
    }
}

#[test]
fn zero_point_is_dropped_from_history() {
    let path = reconstruct_path(
        [GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0)],
        replay_limit(),
    );
    assert_eq!(path, vec![GeoPoint::new(1.0, 1.0)]);
}

#[test]
fn distant_replay_point_is_dropped_and_chain_continues_from_last_kept() {
    let a = GeoPoint::new(10.0, 20.0);
    let b = GeoPoint::new(10.05, 20.0);
    let far = GeoPoint::new(10.185, 20.0);
    let c = GeoPoint::new(10.10, 20.0);
    assert!(distance_m(b, far) > 15_000.0);
    assert!(distance_m(b, c) < replay_limit());

    let path = reconstruct_path([a, b, far, c], replay_limit());
    assert_eq!(path, vec![a, b, c]);
}

#[test]
fn step_equal_to_limit_is_kept() {
    let a = GeoPoint::new(-23.55, -46.63);
    let b = GeoPoint::new(-23.56, -46.63);
    let exact = distance_m(a, b);

    assert_eq!(reconstruct_path([a, b], exact), vec![a, b]);
    assert_eq!(reconstruct_path([a, b], exact - 0.001), vec![a]);
}

#[test]
fn replay_path_respects_ten_km_steps() {
    let path = reconstruct_path(noisy_walk(500), replay_limit());
    assert!(path.len() > 1);
    assert_steps_within(&path, 10_000.0);
}

#[test]
fn live_path_respects_one_km_steps() {
    let path = reconstruct_path(noisy_walk(500), live_limit());
    assert!(path.len() > 1);
    assert_steps_within(&path, 1_000.0);
}

#[test]
fn live_track_matches_batch_reconstruction() {
    let points = noisy_walk(300);
    let mut track = LiveTrack::new(live_limit());
    for point in &points {
        track.push(*point);
    }
    assert_eq!(track.points(), reconstruct_path(points, live_limit()).as_slice());
}

#[test]
fn live_track_moves_marker_even_when_jump_is_not_appended() {
    let mut track = LiveTrack::new(live_limit());
    let start = GeoPoint::new(59.3293, 18.0686);
    let near = GeoPoint::new(59.3323, 18.0686);
    let jump = GeoPoint::new(59.5, 18.0686);

    track.push(start);
    let second = track.push(near);
    assert!(second.appended);
    assert!(second.polyline_ready);

    let third = track.push(jump);
    assert!(!third.appended);
    assert_eq!(third.marker, Some(jump));
    assert_eq!(track.last(), Some(near));
    assert_eq!(track.len(), 2);
}
