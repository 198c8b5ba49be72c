use super::*;
use crate::model::bdl::MeasuredValue;
use crate::model::records::{BlankRecord, CrmRecord, DuplicatePair, QcRecords};
use crate::pipeline::stage2_crm::run_stage2;
use crate::pipeline::stage3_duplicates::run_stage3;
use crate::pipeline::stage4_blanks::run_stage4;
use crate::pipeline::stage5_summary::{Stage5Inputs, run_stage5};

fn d(v: f64) -> MeasuredValue {
    MeasuredValue::Detected(v)
}

fn build_summary(crm: Vec<CrmRecord>) -> QcSummary {
    let config = ToleranceConfig::default();
    let records = QcRecords {
        crm,
        duplicates: vec![
            DuplicatePair::new("S-1", 1, "Cu", "ppm", d(10.0), d(14.0), Some(0.5)),
            DuplicatePair::new("S-2", 1, "Cu", "ppm", d(10.0), d(10.5), Some(0.5)),
        ],
        blanks: vec![
            BlankRecord::new("BLK-1", 1, "Cu", "ppm", MeasuredValue::Censored, Some(0.5)),
            BlankRecord::new("BLK-2", 1, "Cu", "ppm", d(0.4), Some(0.5)),
        ],
    };
    let crm_results = run_stage2(&records.crm, &config);
    let dup_results = run_stage3(&records.duplicates, &config);
    let blanks = run_stage4(&records.blanks, &config);
    let order = vec![("Cu".to_string(), "ppm".to_string())];
    run_stage5(&Stage5Inputs {
        records: &records,
        crm: &crm_results,
        duplicates: &dup_results,
        blanks: &blanks.results,
        blank_groups: &blanks.groups,
        analyte_order: &order,
    })
}

fn run_context() -> RunContext {
    RunContext {
        file_name: "A25-15568".to_string(),
        report_number: Some("A25-15568".to_string()),
        report_date: Some("2025-06-02".to_string()),
        names_match: true,
        lab_name: Some("Activation Labs".to_string()),
        matrix_type: Some("soil".to_string()),
        method_code: Some("AR-ICPMS".to_string()),
    }
}

#[test]
fn test_bias_direction_threshold() {
    assert_eq!(bias_direction(Some(6.0)), BiasDirection::High);
    assert_eq!(bias_direction(Some(-6.0)), BiasDirection::Low);
    assert_eq!(bias_direction(Some(5.0)), BiasDirection::Neutral);
    assert_eq!(bias_direction(None), BiasDirection::Neutral);
}

#[test]
fn test_single_crm_failure_pattern() {
    let summary = build_summary(vec![
        CrmRecord::new("OREAS 45e", 1, "Cu", "ppm", d(70.0), Some(100.0), Some(0.5)),
        CrmRecord::new("OREAS 45e", 2, "Cu", "ppm", d(75.0), Some(100.0), Some(0.5)),
        CrmRecord::new("GBM 908", 1, "Cu", "ppm", d(99.0), Some(100.0), Some(0.5)),
    ]);
    let ctx = build_narrative_context(&summary, &ToleranceConfig::default(), &run_context());
    assert_eq!(ctx.crm.pattern, FailurePattern::SingleCrm);
    assert_eq!(ctx.crm.failing_materials, 1);
    assert_eq!(ctx.crm.failures_by_analyte.len(), 1);
    let cu = &ctx.crm.failures_by_analyte[0];
    assert_eq!(cu.count, 2);
    assert_eq!(cu.min, 70.0);
    assert_eq!(cu.max, 75.0);
    assert_eq!(ctx.crm.bias_direction, BiasDirection::Low);
}

#[test]
fn test_multi_crm_failure_pattern() {
    let summary = build_summary(vec![
        CrmRecord::new("OREAS 45e", 1, "Cu", "ppm", d(130.0), Some(100.0), Some(0.5)),
        CrmRecord::new("GBM 908", 1, "Cu", "ppm", d(70.0), Some(100.0), Some(0.5)),
    ]);
    let ctx = build_narrative_context(&summary, &ToleranceConfig::default(), &run_context());
    assert_eq!(ctx.crm.pattern, FailurePattern::MultiCrm);
    assert_eq!(ctx.crm.failing_materials, 2);
}

#[test]
fn test_duplicate_and_blank_metrics() {
    let summary = build_summary(vec![]);
    let ctx = build_narrative_context(&summary, &ToleranceConfig::default(), &run_context());
    assert_eq!(ctx.duplicates.tally.fail, 1);
    assert_eq!(ctx.duplicates.failed.len(), 1);
    assert!(ctx.duplicates.failed[0].starts_with("Cu in S-1"));
    assert_eq!(ctx.blanks.tally.pass, 2);
    assert!(ctx.blanks.failed.is_empty());
    assert_eq!(ctx.crm.pattern, FailurePattern::None);
    assert!(ctx.crm.mean_bias.is_none());
}

#[test]
fn test_narrative_is_deterministic() {
    let summary = build_summary(vec![CrmRecord::new(
        "OREAS 45e",
        1,
        "Cu",
        "ppm",
        d(85.0),
        Some(100.0),
        Some(0.5),
    )]);
    let config = ToleranceConfig::default();
    let a = run_stage6(&summary, &config, &run_context());
    let b = run_stage6(&summary, &config, &run_context());
    assert_eq!(a, b);
    assert!(a.starts_with("QC Summary for A25-15568 (Report: A25-15568, Date: 2025-06-02)"));
    assert!(a.contains("Mean bias: -15.0% (recoveries tend low)."));
}
