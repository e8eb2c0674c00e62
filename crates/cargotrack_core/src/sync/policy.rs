//! Run conditions for the periodic upload job.
//!
//! The host scheduler owns timing; this only answers "may the job run now".

use crate::config::SyncConfig;
use std::time::Duration;

/// Device state snapshot supplied by the host scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceConditions {
    pub network_connected: bool,
    pub device_idle: bool,
    pub charging: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPolicy {
    pub interval: Duration,
    pub requires_network: bool,
    pub requires_device_idle: bool,
    pub requires_charging: bool,
}

impl SyncPolicy {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            interval: Duration::from_secs(u64::from(config.interval_minutes) * 60),
            requires_network: config.requires_network,
            requires_device_idle: config.requires_device_idle,
            requires_charging: config.requires_charging,
        }
    }

    /// Returns whether every required condition holds.
    pub fn allows(&self, conditions: &DeviceConditions) -> bool {
        (!self.requires_network || conditions.network_connected)
            && (!self.requires_device_idle || conditions.device_idle)
            && (!self.requires_charging || conditions.charging)
    }
}

#[cfg(test)]
mod tests {
    use super::{DeviceConditions, SyncPolicy};
    use crate::config::SyncConfig;
    use std::time::Duration;

    #[test]
    fn default_policy_runs_every_fifteen_minutes_with_all_constraints() {
        let policy = SyncPolicy::from_config(&SyncConfig::default());
        assert_eq!(policy.interval, Duration::from_secs(15 * 60));

        let all = DeviceConditions {
            network_connected: true,
            device_idle: true,
            charging: true,
        };
        assert!(policy.allows(&all));
        assert!(!policy.allows(&DeviceConditions {
            charging: false,
            ..all
        }));
        assert!(!policy.allows(&DeviceConditions::default()));
    }

    #[test]
    fn relaxed_policy_ignores_unrequired_conditions() {
        let policy = SyncPolicy::from_config(&SyncConfig {
            requires_device_idle: false,
            requires_charging: false,
            ..SyncConfig::default()
        });
        assert!(policy.allows(&DeviceConditions {
            network_connected: true,
            ..DeviceConditions::default()
        }));
    }
}
