//! FFI use-case API for the mobile host.
//!
//! # Responsibility
//! - Expose tracking, history and upload bookkeeping to Dart via FRB.
//! - Keep vendor calls (location provider, map, document store) on the host.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - One tracking session exists per process.

use cargotrack_core::db::open_db;
use cargotrack_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, now_epoch_ms,
    ping as ping_inner, GeoPoint, HistoryService, LocationId, LocationListQuery,
    LocationRepository, LocationSample, RepoError, RepoResult, SampleOutcome,
    DeviceConditions, SqliteLocationRepository, StoredLocation, SyncPolicy, SyncService,
    TrackingConfig, TrackingService, TrackingSession, TRACKING_STATUS_IDLE_TEXT,
};
use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};
use uuid::Uuid;

const DB_FILE_NAME: &str = "cargotrack.sqlite3";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static SESSION: OnceLock<Mutex<TrackingSession>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Tracking state reported back to the host UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingStatusResponse {
    pub is_tracking: bool,
    /// Whether this call changed the state.
    pub changed: bool,
    /// Points currently in the live track.
    pub track_len: u32,
    /// Notification/toast text for the host.
    pub message: String,
}

/// Location request cadence the host should pass to its provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRequestSettings {
    pub interval_ms: u64,
    pub min_interval_ms: u64,
    pub high_accuracy: bool,
}

/// Periodic upload schedule the host registers with its job scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPolicySettings {
    pub interval_minutes: u32,
    pub requires_network: bool,
    pub requires_device_idle: bool,
    pub requires_charging: bool,
}

/// Result of submitting one provider sample.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationUpdateResponse {
    /// `accepted|rejected|ignored|invalid`.
    pub status: String,
    /// Reject code (`no_fix|inaccurate`) or validation message.
    pub reason: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub stored_id: Option<String>,
    pub appended_to_track: bool,
    pub polyline_ready: bool,
    pub status_text: String,
}

/// Point pair for map polylines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// History replay envelope for the map view.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPathResponse {
    pub ok: bool,
    pub points: Vec<MapPoint>,
    pub camera_target: Option<MapPoint>,
    pub dropped: u32,
    pub message: String,
}

/// Pending document the host uploads to the remote store itself.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDocument {
    pub local_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingDocumentsResponse {
    pub ok: bool,
    pub documents: Vec<PendingDocument>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncAckResponse {
    pub ok: bool,
    pub acknowledged: u32,
    pub message: String,
}

/// Returns the provider request cadence.
#[flutter_rust_bridge::frb(sync)]
pub fn location_request_settings() -> LocationRequestSettings {
    let request = TrackingConfig::default().request;
    LocationRequestSettings {
        interval_ms: request.interval_ms,
        min_interval_ms: request.min_interval_ms,
        high_accuracy: request.high_accuracy,
    }
}

/// Returns the periodic upload schedule and its run constraints.
#[flutter_rust_bridge::frb(sync)]
pub fn sync_policy_settings() -> SyncPolicySettings {
    let sync = TrackingConfig::default().sync;
    SyncPolicySettings {
        interval_minutes: sync.interval_minutes,
        requires_network: sync.requires_network,
        requires_device_idle: sync.requires_device_idle,
        requires_charging: sync.requires_charging,
    }
}

/// Whether a scheduled upload may run under the given device state.
///
/// Hosts whose scheduler cannot express all constraints call this before
/// `sync_pending`.
#[flutter_rust_bridge::frb(sync)]
pub fn sync_conditions_met(network_connected: bool, device_idle: bool, charging: bool) -> bool {
    SyncPolicy::from_config(&TrackingConfig::default().sync).allows(&DeviceConditions {
        network_connected,
        device_idle,
        charging,
    })
}

/// Starts a tracking session; a second start while running is a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn tracking_start() -> TrackingStatusResponse {
    let mut session = lock_session();
    let changed = session.start();
    status_response(&session, changed, TRACKING_STATUS_IDLE_TEXT)
}

/// Stops the tracking session. Always succeeds.
#[flutter_rust_bridge::frb(sync)]
pub fn tracking_stop() -> TrackingStatusResponse {
    let mut session = lock_session();
    let changed = session.stop();
    status_response(&session, changed, "Location tracking stopped")
}

#[flutter_rust_bridge::frb(sync)]
pub fn tracking_status() -> TrackingStatusResponse {
    let session = lock_session();
    let message = if session.is_tracking() {
        TRACKING_STATUS_IDLE_TEXT
    } else {
        "Not tracking"
    };
    status_response(&session, false, message)
}

/// Feeds one provider sample through filter, storage and the live track.
///
/// # FFI contract
/// - `captured_at_ms = None` stamps the sample with the current time.
/// - Storage failures still return `accepted` with `stored_id = None`.
#[flutter_rust_bridge::frb(sync)]
pub fn submit_location(
    latitude: f64,
    longitude: f64,
    accuracy_m: Option<f64>,
    captured_at_ms: Option<i64>,
) -> LocationUpdateResponse {
    let captured_at_ms = captured_at_ms.unwrap_or_else(now_epoch_ms);
    let sample = match LocationSample::new(latitude, longitude, accuracy_m, captured_at_ms) {
        Ok(sample) => sample,
        Err(err) => {
            return update_response(latitude, longitude, "invalid", Some(err.to_string()));
        }
    };

    let config = TrackingConfig::default();
    let db_path = resolve_db_path();
    let conn = match open_db(&db_path) {
        Ok(conn) => Some(conn),
        Err(err) => {
            warn!("event=location_update module=ffi status=degraded error_code=db_open_failed error={err}");
            None
        }
    };
    let repo = conn
        .as_ref()
        .and_then(|conn| SqliteLocationRepository::try_new(conn).ok());

    let mut session = lock_session();
    let outcome = match repo {
        Some(repo) => TrackingService::new(repo, config).process_sample(&mut session, &sample),
        None => TrackingService::new(UnavailableRepo, config).process_sample(&mut session, &sample),
    };

    match outcome {
        SampleOutcome::Accepted(update) => LocationUpdateResponse {
            status: "accepted".to_string(),
            reason: None,
            latitude: update.point.latitude,
            longitude: update.point.longitude,
            stored_id: update.stored_id.map(|id| id.to_string()),
            appended_to_track: update.track.appended,
            polyline_ready: update.track.polyline_ready,
            status_text: update.status_text,
        },
        SampleOutcome::Rejected(reason) => {
            update_response(latitude, longitude, "rejected", Some(reason.code().to_string()))
        }
        SampleOutcome::Ignored => update_response(latitude, longitude, "ignored", None),
    }
}

/// Rebuilds the stored trajectory and adopts it as the live track.
#[flutter_rust_bridge::frb(sync)]
pub fn load_history_path() -> HistoryPathResponse {
    let result = with_repo(|repo| HistoryService::new(repo, TrackingConfig::default()).load_replay());
    match result {
        Ok(replay) => {
            let points = replay.points.iter().copied().map(to_map_point).collect();
            let dropped = u32::try_from(replay.dropped()).unwrap_or(u32::MAX);
            let message = format!("Loaded {} point(s).", replay.points.len());
            let camera_target = replay.camera_target.map(to_map_point);
            if !replay.points.is_empty() {
                lock_session().adopt_replay(replay.points);
            }
            HistoryPathResponse {
                ok: true,
                points,
                camera_target,
                dropped,
                message,
            }
        }
        Err(err) => HistoryPathResponse {
            ok: false,
            points: Vec::new(),
            camera_target: None,
            dropped: 0,
            message: format!("load_history_path failed: {err}"),
        },
    }
}

/// Returns documents the host should write to the remote store.
#[flutter_rust_bridge::frb(sync)]
pub fn sync_pending(limit: Option<u32>) -> PendingDocumentsResponse {
    let result = with_repo(|repo| {
        SyncService::new(repo, TrackingConfig::default()).pending_documents(limit)
    });
    match result {
        Ok(pending) => {
            let documents = pending
                .into_iter()
                .map(|(id, document)| PendingDocument {
                    local_id: id.to_string(),
                    latitude: document.latitude,
                    longitude: document.longitude,
                    timestamp: document.timestamp,
                })
                .collect::<Vec<_>>();
            PendingDocumentsResponse {
                ok: true,
                message: format!("{} pending document(s).", documents.len()),
                documents,
            }
        }
        Err(err) => PendingDocumentsResponse {
            ok: false,
            documents: Vec::new(),
            message: format!("sync_pending failed: {err}"),
        },
    }
}

/// Marks documents the host uploaded successfully.
#[flutter_rust_bridge::frb(sync)]
pub fn sync_acknowledge(local_ids: Vec<String>) -> SyncAckResponse {
    let mut ids = Vec::with_capacity(local_ids.len());
    for raw in &local_ids {
        match Uuid::parse_str(raw.trim()) {
            Ok(id) => ids.push(id),
            Err(_) => {
                return SyncAckResponse {
                    ok: false,
                    acknowledged: 0,
                    message: format!("sync_acknowledge failed: invalid id `{raw}`"),
                };
            }
        }
    }

    let result = with_repo(|repo| {
        SyncService::new(repo, TrackingConfig::default()).acknowledge(&ids, now_epoch_ms())
    });
    match result {
        Ok(changed) => SyncAckResponse {
            ok: true,
            acknowledged: u32::try_from(changed).unwrap_or(u32::MAX),
            message: "Acknowledged.".to_string(),
        },
        Err(err) => SyncAckResponse {
            ok: false,
            acknowledged: 0,
            message: format!("sync_acknowledge failed: {err}"),
        },
    }
}

/// Stand-in used when the local store cannot be opened; every write fails so
/// the tracking path logs and moves on.
struct UnavailableRepo;

impl LocationRepository for UnavailableRepo {
    fn insert_location(&self, _sample: &LocationSample) -> RepoResult<LocationId> {
        Err(RepoError::InvalidData(
            "local location store unavailable".to_string(),
        ))
    }

    fn get_location(&self, _id: LocationId) -> RepoResult<Option<StoredLocation>> {
        Ok(None)
    }

    fn list_locations(&self, _query: &LocationListQuery) -> RepoResult<Vec<StoredLocation>> {
        Ok(Vec::new())
    }

    fn mark_synced(&self, _ids: &[LocationId], _synced_at_ms: i64) -> RepoResult<usize> {
        Ok(0)
    }

    fn count_locations(&self) -> RepoResult<u64> {
        Ok(0)
    }
}

fn lock_session() -> MutexGuard<'static, TrackingSession> {
    let session = SESSION.get_or_init(|| Mutex::new(TrackingSession::new(&TrackingConfig::default())));
    // A panic while holding the lock must not wedge tracking for the process.
    session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn status_response(
    session: &TrackingSession,
    changed: bool,
    message: &str,
) -> TrackingStatusResponse {
    TrackingStatusResponse {
        is_tracking: session.is_tracking(),
        changed,
        track_len: u32::try_from(session.track().len()).unwrap_or(u32::MAX),
        message: message.to_string(),
    }
}

fn update_response(
    latitude: f64,
    longitude: f64,
    status: &str,
    reason: Option<String>,
) -> LocationUpdateResponse {
    LocationUpdateResponse {
        status: status.to_string(),
        reason,
        latitude,
        longitude,
        stored_id: None,
        appended_to_track: false,
        polyline_ready: false,
        status_text: String::new(),
    }
}

fn to_map_point(point: GeoPoint) -> MapPoint {
    MapPoint {
        latitude: point.latitude,
        longitude: point.longitude,
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("CARGOTRACK_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn with_repo<T>(
    f: impl FnOnce(SqliteLocationRepository<'_>) -> RepoResult<T>,
) -> Result<T, String> {
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("location DB open failed: {err}"))?;
    let repo = SqliteLocationRepository::try_new(&conn)
        .map_err(|err| format!("location repo init failed: {err}"))?;
    f(repo).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, load_history_path, location_request_settings, ping,
        submit_location, sync_acknowledge, sync_conditions_met, sync_pending,
        sync_policy_settings, tracking_start, tracking_status, tracking_stop,
    };
    use std::sync::Mutex;
    use std::time::{SystemTime, UNIX_EPOCH};

    // Tests share the process-wide session and database file.
    static SERIAL: Mutex<()> = Mutex::new(());

    fn serial() -> std::sync::MutexGuard<'static, ()> {
        super::DB_PATH.get_or_init(|| {
            let nanos = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("time went backwards")
                .as_nanos();
            std::env::temp_dir().join(format!(
                "cargotrack-ffi-{}-{nanos}.sqlite3",
                std::process::id()
            ))
        });
        SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn request_settings_match_default_cadence() {
        let settings = location_request_settings();
        assert_eq!(settings.interval_ms, 10_000);
        assert_eq!(settings.min_interval_ms, 5_000);
        assert!(settings.high_accuracy);
    }

    #[test]
    fn sync_policy_matches_default_schedule() {
        let settings = sync_policy_settings();
        assert_eq!(settings.interval_minutes, 15);
        assert!(settings.requires_network);
        assert!(settings.requires_device_idle);
        assert!(settings.requires_charging);

        assert!(sync_conditions_met(true, true, true));
        assert!(!sync_conditions_met(true, true, false));
        assert!(!sync_conditions_met(false, true, true));
    }

    #[test]
    fn session_survives_panic_while_locked() {
        let _guard = serial();
        tracking_stop();
        tracking_start();

        let crashed = std::thread::spawn(|| {
            let _session = super::lock_session();
            panic!("host callback failed mid-update");
        })
        .join();
        assert!(crashed.is_err());
        assert!(super::SESSION.get().is_some_and(|session| session.is_poisoned()));

        let status = tracking_status();
        assert!(status.is_tracking);
        let stopped = tracking_stop();
        assert!(stopped.changed);
        assert!(!tracking_status().is_tracking);
    }

    #[test]
    fn start_stop_cycle_reports_changes() {
        let _guard = serial();
        tracking_stop();

        let started = tracking_start();
        assert!(started.is_tracking);
        assert!(started.changed);
        assert_eq!(started.track_len, 0);

        let again = tracking_start();
        assert!(!again.changed);

        let stopped = tracking_stop();
        assert!(!stopped.is_tracking);
        assert!(stopped.changed);
        assert!(!tracking_status().is_tracking);
    }

    #[test]
    fn submit_location_filters_and_stores_samples() {
        let _guard = serial();
        tracking_stop();

        let ignored = submit_location(12.0, 34.0, None, Some(1));
        assert_eq!(ignored.status, "ignored");

        tracking_start();
        let no_fix = submit_location(0.0, 0.0, None, Some(2));
        assert_eq!(no_fix.status, "rejected");
        assert_eq!(no_fix.reason.as_deref(), Some("no_fix"));

        let inaccurate = submit_location(12.0, 34.0, Some(101.0), Some(3));
        assert_eq!(inaccurate.reason.as_deref(), Some("inaccurate"));

        let invalid = submit_location(123.0, 34.0, None, Some(4));
        assert_eq!(invalid.status, "invalid");

        let accepted = submit_location(12.0, 34.0, Some(5.0), Some(5));
        assert_eq!(accepted.status, "accepted");
        assert!(accepted.stored_id.is_some(), "{accepted:?}");
        assert!(accepted.appended_to_track);
        assert_eq!(accepted.status_text, "Location: 12.000000, 34.000000");

        tracking_stop();
    }

    #[test]
    fn history_and_sync_roundtrip_through_ffi() {
        let _guard = serial();
        tracking_stop();
        tracking_start();
        let accepted = submit_location(-12.5, 130.8, None, Some(10));
        let stored_id = accepted.stored_id.expect("sample should be stored");
        tracking_stop();

        let history = load_history_path();
        assert!(history.ok, "{}", history.message);
        assert!(history.camera_target.is_some());

        let pending = sync_pending(Some(1_000));
        assert!(pending.ok, "{}", pending.message);
        assert!(pending.documents.iter().any(|doc| doc.local_id == stored_id));

        let ack = sync_acknowledge(vec![stored_id.clone()]);
        assert!(ack.ok, "{}", ack.message);
        assert_eq!(ack.acknowledged, 1);

        let after = sync_pending(Some(1_000));
        assert!(!after.documents.iter().any(|doc| doc.local_id == stored_id));

        let bad = sync_acknowledge(vec!["nope".to_string()]);
        assert!(!bad.ok);
    }
}
