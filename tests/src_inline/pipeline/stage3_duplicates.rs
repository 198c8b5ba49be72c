use super::*;
use crate::model::bdl::{MeasuredValue, SubstitutionRule};
use crate::model::flags::Flag;
use proptest::prelude::*;

fn pair(a: MeasuredValue, b: MeasuredValue, dl: Option<f64>) -> DuplicatePair {
    DuplicatePair::new("S-1001", 1, "Zn", "ppm", a, b, dl)
}

#[test]
fn test_rpd_failure() {
    let r = evaluate_duplicate(
        &pair(
            MeasuredValue::Detected(10.0),
            MeasuredValue::Detected(14.0),
            Some(0.1),
        ),
        &ToleranceConfig::default(),
    );
    let rpd = r.metric.unwrap();
    assert!((rpd - 33.333_333).abs() < 1e-4);
    assert_eq!(r.status, QcStatus::Fail);
    assert_eq!(r.value, Some(10.0));
    assert_eq!(r.reference, Some(14.0));
}

#[test]
fn test_rpd_boundary_is_pass() {
    let config = ToleranceConfig {
        duplicate_rpd_tol: 20.0,
        ..ToleranceConfig::default()
    };
    // |9 - 11| / 10 x 100 = 20
    let r = evaluate_duplicate(
        &pair(MeasuredValue::Detected(9.0), MeasuredValue::Detected(11.0), None),
        &config,
    );
    assert_eq!(r.metric, Some(20.0));
    assert_eq!(r.status, QcStatus::Pass);
}

#[test]
fn test_rpd_at_rounded_tolerance_passes() {
    let config = ToleranceConfig {
        duplicate_rpd_tol: 25.0,
        ..ToleranceConfig::default()
    };
    let r = evaluate_duplicate(
        &pair(MeasuredValue::Detected(0.7), MeasuredValue::Detected(0.9), None),
        &config,
    );
    assert!((r.metric.unwrap() - 25.0).abs() < 1e-9);
    assert_eq!(r.status, QcStatus::Pass);
}

#[test]
fn test_equal_values_always_pass() {
    for tol in [30.0, 0.0] {
        let config = ToleranceConfig {
            duplicate_rpd_tol: tol,
            ..ToleranceConfig::default()
        };
        let r = evaluate_duplicate(
            &pair(MeasuredValue::Detected(4.2), MeasuredValue::Detected(4.2), Some(0.1)),
            &config,
        );
        assert_eq!(r.metric, Some(0.0));
        assert_eq!(r.status, QcStatus::Pass);
    }
}

#[test]
fn test_both_censored_is_below_detection() {
    let r = evaluate_duplicate(
        &pair(MeasuredValue::Censored, MeasuredValue::Censored, Some(0.1)),
        &ToleranceConfig::default(),
    );
    assert_eq!(r.status, QcStatus::NotApplicable);
    assert_eq!(r.reason, Some(NaReason::BelowDetection));
}

#[test]
fn test_one_censored_is_substituted() {
    let r = evaluate_duplicate(
        &pair(MeasuredValue::Censored, MeasuredValue::Detected(0.07), Some(0.1)),
        &ToleranceConfig::default(),
    );
    assert_eq!(r.value, Some(0.05));
    assert!(r.has_flag(Flag::BdlSubstituted));
    assert!(r.has_flag(Flag::Below10xDl));
    assert_eq!(r.status, QcStatus::Fail);
}

#[test]
fn test_zero_pair_mean_is_not_applicable() {
    let config = ToleranceConfig {
        bdl_sub_rule: SubstitutionRule::Zero,
        ..ToleranceConfig::default()
    };
    let r = evaluate_duplicate(
        &pair(MeasuredValue::Detected(0.0), MeasuredValue::Censored, None),
        &config,
    );
    assert_eq!(
        r.reason,
        Some(NaReason::DegenerateArithmetic(Degenerate::ZeroPairMean))
    );
    assert_eq!(r.status, QcStatus::NotApplicable);
}

#[test]
fn test_missing_side_is_not_applicable() {
    let config = ToleranceConfig::default();
    let r = evaluate_duplicate(
        &pair(MeasuredValue::Missing, MeasuredValue::Detected(1.0), Some(0.1)),
        &config,
    );
    assert_eq!(
        r.reason,
        Some(NaReason::MissingRequiredField(RequiredField::OriginalValue))
    );
    let r = evaluate_duplicate(
        &pair(MeasuredValue::Detected(1.0), MeasuredValue::Censored, None),
        &config,
    );
    assert_eq!(
        r.reason,
        Some(NaReason::MissingRequiredField(RequiredField::DetectionLimit))
    );
}

#[test]
fn test_run_stage3_counts() {
    let pairs = vec![
        pair(MeasuredValue::Detected(10.0), MeasuredValue::Detected(10.5), None),
        pair(MeasuredValue::Detected(10.0), MeasuredValue::Detected(20.0), None),
    ];
    let out = run_stage3(&pairs, &ToleranceConfig::default());
    assert_eq!(out.len(), 2);
    assert!(out[0].is_pass());
    assert!(out[1].is_fail());
}

proptest! {
    #[test]
    fn prop_rpd_is_symmetric(a in 0.001f64..1.0e6, b in 0.001f64..1.0e6) {
        let ab = relative_percent_difference(a, b).unwrap();
        let ba = relative_percent_difference(b, a).unwrap();
        prop_assert!((ab - ba).abs() <= 1e-9 * ab.max(1.0));
        prop_assert!(ab >= 0.0);
        prop_assert!(ab <= 200.0 + 1e-9);
    }
}
