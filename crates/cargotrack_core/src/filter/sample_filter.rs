//! Sample filter predicate.
//!
//! # Responsibility
//! - Reject "no fix" sentinels and samples with a too-wide accuracy radius.
//!
//! # Invariants
//! - The no-fix check runs before the accuracy check.
//! - A missing accuracy radius never causes a rejection.
//! - Accuracy equal to the limit is accepted.

use crate::config::FilterConfig;
use crate::model::sample::LocationSample;
use log::debug;
use std::fmt::{Display, Formatter};

/// Why a sample was discarded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RejectReason {
    /// Both coordinates are exactly zero.
    NoFix,
    /// Reported accuracy radius is wider than allowed.
    Inaccurate { accuracy_m: f64, max_accuracy_m: f64 },
}

impl RejectReason {
    /// Stable machine-readable code used in logs and FFI envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoFix => "no_fix",
            Self::Inaccurate { .. } => "inaccurate",
        }
    }
}

impl Display for RejectReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoFix => write!(f, "invalid location at 0,0"),
            Self::Inaccurate {
                accuracy_m,
                max_accuracy_m,
            } => write!(
                f,
                "inaccurate location: {accuracy_m}m (limit {max_accuracy_m}m)"
            ),
        }
    }
}

/// Result of evaluating one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleVerdict {
    Accepted,
    Rejected(RejectReason),
}

impl SampleVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Evaluates one sample against the admission rules.
pub fn evaluate_sample(sample: &LocationSample, config: &FilterConfig) -> SampleVerdict {
    if sample.point().is_no_fix() {
        debug!("event=sample_rejected module=filter reason=no_fix");
        return SampleVerdict::Rejected(RejectReason::NoFix);
    }

    if let Some(accuracy_m) = sample.accuracy_m {
        if accuracy_m > config.max_accuracy_m {
            debug!(
                "event=sample_rejected module=filter reason=inaccurate accuracy_m={} limit_m={}",
                accuracy_m, config.max_accuracy_m
            );
            return SampleVerdict::Rejected(RejectReason::Inaccurate {
                accuracy_m,
                max_accuracy_m: config.max_accuracy_m,
            });
        }
    }

    SampleVerdict::Accepted
}

pub fn is_acceptable(sample: &LocationSample, config: &FilterConfig) -> bool {
    evaluate_sample(sample, config).is_accepted()
}

#[cfg(test)]
mod tests {
    use super::{evaluate_sample, RejectReason, SampleVerdict};
    use crate::config::FilterConfig;
    use crate::model::sample::LocationSample;

    fn sample(lat: f64, lon: f64, accuracy: Option<f64>) -> LocationSample {
        LocationSample::new(lat, lon, accuracy, 1_700_000_000_000).expect("valid sample")
    }

    #[test]
    fn no_fix_wins_over_accuracy() {
        let verdict = evaluate_sample(&sample(0.0, 0.0, Some(500.0)), &FilterConfig::default());
        assert_eq!(verdict, SampleVerdict::Rejected(RejectReason::NoFix));
    }

    #[test]
    fn single_zero_coordinate_is_not_a_sentinel() {
        let config = FilterConfig::default();
        assert!(evaluate_sample(&sample(0.0, 12.5, None), &config).is_accepted());
        assert!(evaluate_sample(&sample(-33.9, 0.0, None), &config).is_accepted());
    }

    #[test]
    fn custom_limit_is_honored() {
        let config = FilterConfig {
            max_accuracy_m: 20.0,
        };
        let verdict = evaluate_sample(&sample(48.85, 2.35, Some(25.0)), &config);
        match verdict {
            SampleVerdict::Rejected(reason) => assert_eq!(reason.code(), "inaccurate"),
            SampleVerdict::Accepted => panic!("25m should exceed a 20m limit"),
        }
    }
}
