//! Tracking configuration.
//!
//! # Responsibility
//! - Hold the thresholds and cadences used by filter, path and sync code.
//! - Parse and validate host-provided JSON overrides.
//!
//! # Invariants
//! - Every distance/accuracy threshold is finite and positive.
//! - `request.min_interval_ms <= request.interval_ms`.
//! - Missing sections fall back to defaults; unknown keys are rejected.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Samples with a larger accuracy radius are discarded.
pub const DEFAULT_MAX_ACCURACY_M: f64 = 100.0;
/// Maximum hop between retained points while tracking live.
pub const DEFAULT_LIVE_MAX_STEP_M: f64 = 1_000.0;
/// Maximum hop between retained points when replaying history.
pub const DEFAULT_REPLAY_MAX_STEP_M: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Parse(String),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "failed to parse tracking config: {message}"),
            Self::Invalid(message) => write!(f, "invalid tracking config: {message}"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    pub max_accuracy_m: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_accuracy_m: DEFAULT_MAX_ACCURACY_M,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathConfig {
    pub live_max_step_m: f64,
    pub replay_max_step_m: f64,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            live_max_step_m: DEFAULT_LIVE_MAX_STEP_M,
            replay_max_step_m: DEFAULT_REPLAY_MAX_STEP_M,
        }
    }
}

/// Location request cadence the host passes to the platform provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RequestConfig {
    pub interval_ms: u64,
    pub min_interval_ms: u64,
    pub high_accuracy: bool,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            interval_ms: 10_000,
            min_interval_ms: 5_000,
            high_accuracy: true,
        }
    }
}

/// Periodic upload job settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    pub interval_minutes: u32,
    pub requires_network: bool,
    pub requires_device_idle: bool,
    pub requires_charging: bool,
    pub batch_limit: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 15,
            requires_network: true,
            requires_device_idle: true,
            requires_charging: true,
            batch_limit: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackingConfig {
    pub filter: FilterConfig,
    pub path: PathConfig,
    pub request: RequestConfig,
    pub sync: SyncConfig,
}

impl TrackingConfig {
    /// Parses a JSON document and validates the result.
    ///
    /// # Errors
    /// - `ConfigError::Parse` for malformed JSON or unknown keys.
    /// - `ConfigError::Invalid` when a value breaks an invariant.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("filter.max_accuracy_m", self.filter.max_accuracy_m)?;
        ensure_positive("path.live_max_step_m", self.path.live_max_step_m)?;
        ensure_positive("path.replay_max_step_m", self.path.replay_max_step_m)?;

        if self.request.interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "request.interval_ms must be > 0".to_string(),
            ));
        }
        if self.request.min_interval_ms > self.request.interval_ms {
            return Err(ConfigError::Invalid(format!(
                "request.min_interval_ms ({}) must be <= request.interval_ms ({})",
                self.request.min_interval_ms, self.request.interval_ms
            )));
        }
        if self.sync.interval_minutes == 0 {
            return Err(ConfigError::Invalid(
                "sync.interval_minutes must be > 0".to_string(),
            ));
        }
        if self.sync.batch_limit == 0 {
            return Err(ConfigError::Invalid(
                "sync.batch_limit must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn ensure_positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be finite and > 0, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, TrackingConfig};

    #[test]
    fn defaults_match_tracking_thresholds() {
        let config = TrackingConfig::default();
        assert_eq!(config.filter.max_accuracy_m, 100.0);
        assert_eq!(config.path.live_max_step_m, 1_000.0);
        assert_eq!(config.path.replay_max_step_m, 10_000.0);
        assert_eq!(config.request.interval_ms, 10_000);
        assert_eq!(config.request.min_interval_ms, 5_000);
        assert_eq!(config.sync.interval_minutes, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults_for_missing_sections() {
        let config = TrackingConfig::from_json_str(r#"{"filter":{"max_accuracy_m":50}}"#)
            .expect("partial config should parse");
        assert_eq!(config.filter.max_accuracy_m, 50.0);
        assert_eq!(config.path.replay_max_step_m, 10_000.0);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = TrackingConfig::from_json_str(r#"{"filter":{"max_accuracy":50}}"#)
            .expect_err("unknown key should fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn inverted_request_interval_is_rejected() {
        let err = TrackingConfig::from_json_str(
            r#"{"request":{"interval_ms":1000,"min_interval_ms":2000}}"#,
        )
        .expect_err("min interval above interval should fail");
        assert!(err.to_string().contains("min_interval_ms"));
    }

    #[test]
    fn non_positive_threshold_is_rejected() {
        let err = TrackingConfig::from_json_str(r#"{"path":{"live_max_step_m":0}}"#)
            .expect_err("zero step should fail");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
