use tracing::{debug, info};

use crate::model::flags::{Flag, ordered};
use crate::model::range::classify;
use crate::model::records::CrmRecord;
use crate::model::result::{EvaluationResult, MetricKind, QcCategory};
use crate::model::status::{Degenerate, NaReason, QcStatus, RequiredField};
use crate::model::thresholds::ToleranceConfig;

/// Certified values below this multiple of the DL give low-confidence
/// recoveries.
pub const CRM_DL_MULTIPLE: f64 = 10.0;

pub fn run_stage2(records: &[CrmRecord], config: &ToleranceConfig) -> Vec<EvaluationResult> {
    let out: Vec<EvaluationResult> = records.iter().map(|r| evaluate_crm(r, config)).collect();
    info!(
        records = out.len(),
        fail = out.iter().filter(|r| r.is_fail()).count(),
        "CRM evaluation complete"
    );
    out
}

/// Recovery percent. `None` when the certified value is zero.
pub fn recovery_pct(measured: f64, certified: f64) -> Option<f64> {
    if certified == 0.0 {
        return None;
    }
    Some(measured * 100.0 / certified)
}

pub fn bias_pct(measured: f64, certified: f64) -> Option<f64> {
    if certified == 0.0 {
        return None;
    }
    Some((measured - certified) * 100.0 / certified)
}

pub fn evaluate_crm(record: &CrmRecord, config: &ToleranceConfig) -> EvaluationResult {
    let dl = record.detection_limit;
    let mut flags = Vec::new();

    if let (Some(certified), Some(dl)) = (record.certified, dl) {
        if certified < dl {
            flags.push(Flag::CertifiedBelowDl);
        } else if certified < CRM_DL_MULTIPLE * dl {
            flags.push(Flag::CertifiedBelow10xDl);
        }
    }

    let mut result = EvaluationResult {
        category: QcCategory::Crm,
        sample_id: record.sample_id.clone(),
        run: record.run,
        analyte: record.analyte.clone(),
        unit: record.unit.clone(),
        value: None,
        reference: record.certified,
        detection_limit: dl,
        metric_kind: MetricKind::RecoveryPct,
        metric: None,
        bias: None,
        status: QcStatus::NotApplicable,
        reason: None,
        flags: Vec::new(),
    };

    if let Some(field) = record.missing_field() {
        result.reason = Some(NaReason::MissingRequiredField(field));
        result.flags = ordered(&flags);
        return result;
    }
    let certified = record.certified.unwrap_or_default();
    if certified == 0.0 {
        result.reason = Some(NaReason::DegenerateArithmetic(
            Degenerate::ZeroCertifiedValue,
        ));
        result.flags = ordered(&flags);
        return result;
    }

    let Some(resolved) = config.bdl_sub_rule.resolve(record.measured, dl) else {
        result.reason = Some(NaReason::MissingRequiredField(
            RequiredField::DetectionLimit,
        ));
        result.flags = ordered(&flags);
        return result;
    };
    if resolved.substituted {
        flags.push(Flag::BdlSubstituted);
        if dl.is_some_and(|dl| certified >= dl) {
            flags.push(Flag::MeasuredBelowDl);
        }
    }

    let recovery = recovery_pct(resolved.value, certified);
    result.value = Some(resolved.value);
    result.metric = recovery;
    result.bias = bias_pct(resolved.value, certified);
    result.status = classify(recovery, config.crm_range());
    result.flags = ordered(&flags);

    debug!(
        sample = %record.sample_id,
        analyte = %record.analyte,
        recovery = ?result.metric,
        status = result.status.name(),
        "CRM evaluated"
    );
    result
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_crm.rs"]
mod tests;
