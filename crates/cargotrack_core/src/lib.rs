//! Core domain logic for CargoTrack.
//! Sample admission, trajectory denoising and the local location log live
//! here; platform services and vendor SDK calls stay on the host.

pub mod config;
pub mod db;
pub mod filter;
pub mod logging;
pub mod model;
pub mod path;
pub mod repo;
pub mod service;
pub mod sync;

pub use config::{ConfigError, FilterConfig, PathConfig, RequestConfig, SyncConfig, TrackingConfig};
pub use filter::sample_filter::{evaluate_sample, is_acceptable, RejectReason, SampleVerdict};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::sample::{
    GeoPoint, LocationDocument, LocationId, LocationSample, SampleValidationError, StoredLocation,
};
pub use path::distance::distance_m;
pub use path::live_track::{LiveTrack, TrackUpdate};
pub use path::reconstruct::reconstruct_path;
pub use path::PathMode;
pub use repo::location_repo::{
    LocationListQuery, LocationRepository, RepoError, RepoResult, SqliteLocationRepository,
};
pub use service::history_service::{HistoryService, ReplayPath};
pub use service::sync_service::{SyncReport, SyncService};
pub use service::tracking_service::{
    LocationUpdate, SampleOutcome, TrackingService, TrackingSession, TRACKING_STATUS_IDLE_TEXT,
};
pub use sync::policy::{DeviceConditions, SyncPolicy};
pub use sync::sink::{DocumentSink, SinkError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Current wall-clock time in Unix epoch milliseconds.
///
/// Falls back to `0` if the system clock is before the epoch.
pub fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
