use serde::Serialize;
use tracing::{debug, info};

use crate::model::flags::{Flag, ordered};
use crate::model::range::{AcceptRange, classify};
use crate::model::records::BlankRecord;
use crate::model::result::{EvaluationResult, MetricKind, QcCategory};
use crate::model::status::{NaReason, QcStatus};
use crate::model::thresholds::ToleranceConfig;
use crate::report::{mean, sample_std_dev};

/// Descriptive statistics for the blanks of one analyte. Reported in the
/// narrative only; never used to classify.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlankGroupStats {
    pub analyte: String,
    pub unit: String,
    pub detection_limit: Option<f64>,
    pub threshold: Option<f64>,
    pub n: usize,
    pub mean: Option<f64>,
    /// Sample SD (n-1); absent below two values.
    pub sd: Option<f64>,
    pub exceedances: usize,
}

#[derive(Debug, Clone)]
pub struct Stage4Output {
    pub results: Vec<EvaluationResult>,
    pub groups: Vec<BlankGroupStats>,
}

pub fn run_stage4(records: &[BlankRecord], config: &ToleranceConfig) -> Stage4Output {
    let results: Vec<EvaluationResult> = records
        .iter()
        .map(|r| evaluate_blank(r, config))
        .collect();
    let groups = group_stats(records, &results);
    info!(
        blanks = results.len(),
        analytes = groups.len(),
        fail = results.iter().filter(|r| r.is_fail()).count(),
        "blank evaluation complete"
    );
    Stage4Output { results, groups }
}

pub fn evaluate_blank(record: &BlankRecord, config: &ToleranceConfig) -> EvaluationResult {
    let dl = record.detection_limit;
    let threshold = dl.map(|dl| config.blank_threshold(dl));
    let mut result = EvaluationResult {
        category: QcCategory::Blank,
        sample_id: record.sample_id.clone(),
        run: record.run,
        analyte: record.analyte.clone(),
        unit: record.unit.clone(),
        value: None,
        reference: threshold,
        detection_limit: dl,
        metric_kind: MetricKind::BlankExceedance,
        metric: None,
        bias: None,
        status: QcStatus::NotApplicable,
        reason: None,
        flags: Vec::new(),
    };

    if let Some(field) = record.missing_field() {
        result.reason = Some(NaReason::MissingRequiredField(field));
        return result;
    }
    // missing_field guarantees both the value and the DL are present
    let (Some(dl), Some(threshold)) = (dl, threshold) else {
        return result;
    };
    let Some(resolved) = config.bdl_sub_rule.resolve(record.measured, Some(dl)) else {
        return result;
    };

    let mut flags = Vec::new();
    if resolved.substituted {
        flags.push(Flag::BdlSubstituted);
    }
    let within = AcceptRange::AtMost(threshold);
    if resolved.value > dl && within.contains(resolved.value) {
        flags.push(Flag::AboveDetectionLimit);
    }

    result.value = Some(resolved.value);
    result.metric = exceedance_ratio(resolved.value, threshold);
    result.status = classify(Some(resolved.value), within);
    result.flags = ordered(&flags);

    debug!(
        sample = %record.sample_id,
        analyte = %record.analyte,
        value = resolved.value,
        threshold,
        status = result.status.name(),
        "blank evaluated"
    );
    result
}

/// Value relative to the blank threshold. `None` for a zero threshold.
pub fn exceedance_ratio(value: f64, threshold: f64) -> Option<f64> {
    if threshold == 0.0 {
        return None;
    }
    Some(value / threshold)
}

fn group_stats(records: &[BlankRecord], results: &[EvaluationResult]) -> Vec<BlankGroupStats> {
    let mut keys: Vec<(&str, &str)> = Vec::new();
    for r in records {
        let key = (r.analyte.as_str(), r.unit.as_str());
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    let mut out = Vec::with_capacity(keys.len());
    for (analyte, unit) in keys {
        let members = results
            .iter()
            .filter(|r| r.analyte == analyte && r.unit == unit)
            .collect::<Vec<_>>();
        let values = members.iter().filter_map(|r| r.value).collect::<Vec<_>>();
        let detection_limit = members.iter().find_map(|r| r.detection_limit);
        out.push(BlankGroupStats {
            analyte: analyte.to_string(),
            unit: unit.to_string(),
            detection_limit,
            threshold: members.iter().find_map(|r| r.reference),
            n: values.len(),
            mean: mean(&values),
            sd: sample_std_dev(&values),
            exceedances: members.iter().filter(|r| r.is_fail()).count(),
        });
    }
    out
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_blanks.rs"]
mod tests;
