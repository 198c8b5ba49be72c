use super::*;
use crate::model::bdl::MeasuredValue;
use crate::model::status::{Degenerate, NaReason, RequiredField};
use proptest::prelude::*;

fn crm(measured: MeasuredValue, certified: Option<f64>, dl: Option<f64>) -> CrmRecord {
    CrmRecord::new("OREAS 45e", 1, "Cu", "ppm", measured, certified, dl)
}

#[test]
fn test_recovery_and_bias_pass() {
    let r = evaluate_crm(
        &crm(MeasuredValue::Detected(85.0), Some(100.0), Some(0.5)),
        &ToleranceConfig::default(),
    );
    assert_eq!(r.metric, Some(85.0));
    assert_eq!(r.bias, Some(-15.0));
    assert_eq!(r.status, QcStatus::Pass);
    assert_eq!(r.value, Some(85.0));
    assert_eq!(r.reference, Some(100.0));
    assert!(r.reason.is_none());
    assert!(r.flags.is_empty());
}

#[test]
fn test_recovery_boundaries_inclusive() {
    let config = ToleranceConfig::default();
    let low = evaluate_crm(&crm(MeasuredValue::Detected(80.0), Some(100.0), None), &config);
    let high = evaluate_crm(&crm(MeasuredValue::Detected(120.0), Some(100.0), None), &config);
    let under = evaluate_crm(&crm(MeasuredValue::Detected(79.0), Some(100.0), None), &config);
    assert_eq!(low.status, QcStatus::Pass);
    assert_eq!(high.status, QcStatus::Pass);
    assert_eq!(under.status, QcStatus::Fail);
}

#[test]
fn test_zero_certified_is_not_applicable() {
    let r = evaluate_crm(
        &crm(MeasuredValue::Detected(1.0), Some(0.0), Some(0.1)),
        &ToleranceConfig::default(),
    );
    assert_eq!(r.status, QcStatus::NotApplicable);
    assert_eq!(
        r.reason,
        Some(NaReason::DegenerateArithmetic(
            Degenerate::ZeroCertifiedValue
        ))
    );
    assert!(r.metric.is_none());
}

#[test]
fn test_missing_fields_are_not_applicable() {
    let config = ToleranceConfig::default();
    let no_cert = evaluate_crm(&crm(MeasuredValue::Detected(1.0), None, Some(0.1)), &config);
    assert_eq!(
        no_cert.reason,
        Some(NaReason::MissingRequiredField(RequiredField::CertifiedValue))
    );
    let no_value = evaluate_crm(&crm(MeasuredValue::Missing, Some(1.0), Some(0.1)), &config);
    assert_eq!(
        no_value.reason,
        Some(NaReason::MissingRequiredField(RequiredField::MeasuredValue))
    );
    let no_dl = evaluate_crm(&crm(MeasuredValue::Censored, Some(1.0), None), &config);
    assert_eq!(
        no_dl.reason,
        Some(NaReason::MissingRequiredField(RequiredField::DetectionLimit))
    );
}

#[test]
fn test_censored_measurement_is_substituted_and_flagged() {
    let r = evaluate_crm(
        &crm(MeasuredValue::Censored, Some(1.0), Some(0.1)),
        &ToleranceConfig::default(),
    );
    assert_eq!(r.value, Some(0.05));
    assert_eq!(r.status, QcStatus::Fail);
    assert_eq!(r.flags, vec![Flag::BdlSubstituted, Flag::MeasuredBelowDl]);
}

#[test]
fn test_low_certified_values_are_flagged_only() {
    let config = ToleranceConfig::default();
    let below = evaluate_crm(&crm(MeasuredValue::Detected(0.05), Some(0.05), Some(0.1)), &config);
    assert_eq!(below.flags, vec![Flag::CertifiedBelowDl]);
    assert_eq!(below.status, QcStatus::Pass);

    let near = evaluate_crm(&crm(MeasuredValue::Detected(0.5), Some(0.5), Some(0.1)), &config);
    assert_eq!(near.flags, vec![Flag::CertifiedBelow10xDl]);
    assert_eq!(near.status, QcStatus::Pass);
}

#[test]
fn test_run_stage2_keeps_input_order() {
    let records = vec![
        crm(MeasuredValue::Detected(100.0), Some(100.0), None),
        crm(MeasuredValue::Detected(50.0), Some(100.0), None),
        crm(MeasuredValue::Missing, Some(100.0), None),
    ];
    let out = run_stage2(&records, &ToleranceConfig::default());
    let statuses = out.iter().map(|r| r.status).collect::<Vec<_>>();
    assert_eq!(
        statuses,
        vec![QcStatus::Pass, QcStatus::Fail, QcStatus::NotApplicable]
    );
}

#[test]
fn test_formulas_reject_zero_certified() {
    assert_eq!(recovery_pct(1.0, 0.0), None);
    assert_eq!(bias_pct(1.0, 0.0), None);
}

proptest! {
    #[test]
    fn prop_recovery_round_trip(m in 0.0f64..1.0e5, c in 0.001f64..1.0e5) {
        let recovery = recovery_pct(m, c).unwrap();
        let back = recovery * c / 100.0;
        prop_assert!((back - m).abs() <= 1e-9 * m.abs().max(1.0));
    }

    #[test]
    fn prop_bias_is_recovery_minus_hundred(m in 0.0f64..1.0e4, c in 0.01f64..1.0e4) {
        let recovery = recovery_pct(m, c).unwrap();
        let bias = bias_pct(m, c).unwrap();
        prop_assert!((recovery - 100.0 - bias).abs() <= 1e-6 * recovery.abs().max(1.0));
    }
}
