use cargotrack_core::{
    evaluate_sample, is_acceptable, FilterConfig, LocationSample, RejectReason, SampleVerdict,
};

fn sample(lat: f64, lon: f64, accuracy_m: Option<f64>) -> LocationSample {
    LocationSample::new(lat, lon, accuracy_m, 1_700_000_000_000).unwrap()
}

#[test]
fn zero_zero_is_always_rejected() {
    let config = FilterConfig::default();
    for accuracy in [None, Some(0.0), Some(5.0), Some(100.0), Some(250.0)] {
        assert_eq!(
            evaluate_sample(&sample(0.0, 0.0, accuracy), &config),
            SampleVerdict::Rejected(RejectReason::NoFix)
        );
    }
}

#[test]
fn accuracy_above_limit_is_rejected() {
    let config = FilterConfig::default();
    for accuracy in [100.001, 101.0, 5_000.0] {
        assert_eq!(
            evaluate_sample(&sample(52.52, 13.405, Some(accuracy)), &config),
            SampleVerdict::Rejected(RejectReason::Inaccurate {
                accuracy_m: accuracy,
                max_accuracy_m: 100.0,
            })
        );
    }
}

#[test]
fn accuracy_at_or_below_limit_or_absent_is_accepted() {
    let config = FilterConfig::default();
    for accuracy in [None, Some(0.0), Some(12.3), Some(99.99), Some(100.0)] {
        assert!(
            is_acceptable(&sample(52.52, 13.405, accuracy), &config),
            "accuracy {accuracy:?} should be accepted"
        );
    }
}

#[test]
fn reject_reasons_expose_stable_codes() {
    assert_eq!(RejectReason::NoFix.code(), "no_fix");
    let inaccurate = RejectReason::Inaccurate {
        accuracy_m: 150.0,
        max_accuracy_m: 100.0,
    };
    assert_eq!(inaccurate.code(), "inaccurate");
    assert!(inaccurate.to_string().contains("150m"));
}
