use tracing::{debug, info};

use crate::model::flags::{Flag, ordered};
use crate::model::range::classify;
use crate::model::records::DuplicatePair;
use crate::model::result::{EvaluationResult, MetricKind, QcCategory};
use crate::model::status::{Degenerate, NaReason, QcStatus, RequiredField};
use crate::model::thresholds::ToleranceConfig;

/// Pairs at or below this multiple of the DL are too close to the floor for
/// precision to be meaningful.
pub const PRECISION_DL_MULTIPLE: f64 = 10.0;

pub fn run_stage3(pairs: &[DuplicatePair], config: &ToleranceConfig) -> Vec<EvaluationResult> {
    let out: Vec<EvaluationResult> = pairs
        .iter()
        .map(|p| evaluate_duplicate(p, config))
        .collect();
    info!(
        pairs = out.len(),
        fail = out.iter().filter(|r| r.is_fail()).count(),
        "duplicate evaluation complete"
    );
    out
}

/// Relative percent difference. `None` when the pair mean is zero.
pub fn relative_percent_difference(a: f64, b: f64) -> Option<f64> {
    let mean = (a + b) / 2.0;
    if mean == 0.0 {
        return None;
    }
    Some((a - b).abs() * 100.0 / mean.abs())
}

pub fn evaluate_duplicate(pair: &DuplicatePair, config: &ToleranceConfig) -> EvaluationResult {
    let dl = pair.detection_limit;
    let mut result = EvaluationResult {
        category: QcCategory::Duplicate,
        sample_id: pair.sample_id.clone(),
        run: pair.run,
        analyte: pair.analyte.clone(),
        unit: pair.unit.clone(),
        value: None,
        reference: None,
        detection_limit: dl,
        metric_kind: MetricKind::RpdPct,
        metric: None,
        bias: None,
        status: QcStatus::NotApplicable,
        reason: None,
        flags: Vec::new(),
    };

    if let Some(field) = pair.missing_field() {
        result.reason = Some(NaReason::MissingRequiredField(field));
        return result;
    }
    if pair.both_censored() {
        result.reason = Some(NaReason::BelowDetection);
        return result;
    }

    let rule = config.bdl_sub_rule;
    let (Some(a), Some(b)) = (rule.resolve(pair.original, dl), rule.resolve(pair.duplicate, dl))
    else {
        result.reason = Some(NaReason::MissingRequiredField(
            RequiredField::DetectionLimit,
        ));
        return result;
    };
    result.value = Some(a.value);
    result.reference = Some(b.value);

    let mut flags = Vec::new();
    if a.substituted || b.substituted {
        flags.push(Flag::BdlSubstituted);
    }
    if let Some(dl) = dl {
        let floor = PRECISION_DL_MULTIPLE * dl;
        if a.value <= floor && b.value <= floor {
            flags.push(Flag::Below10xDl);
        }
    }
    result.flags = ordered(&flags);

    let Some(rpd) = relative_percent_difference(a.value, b.value) else {
        result.reason = Some(NaReason::DegenerateArithmetic(Degenerate::ZeroPairMean));
        return result;
    };
    result.metric = Some(rpd);
    result.status = classify(Some(rpd), config.rpd_range());

    debug!(
        sample = %pair.sample_id,
        analyte = %pair.analyte,
        rpd,
        status = result.status.name(),
        "duplicate evaluated"
    );
    result
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_duplicates.rs"]
mod tests;
