use crate::model::status::QcStatus;

/// Acceptance window for a QC metric. Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AcceptRange {
    AtMost(f64),
    AtLeast(f64),
    Between { low: f64, high: f64 },
}

/// Relative slack on each bound. Absorbs rounding in computed thresholds
/// and metrics, e.g. 3 x 0.3 = 0.8999999999999999.
pub const BOUND_REL_TOL: f64 = 1e-9;

fn slack(bound: f64) -> f64 {
    bound.abs() * BOUND_REL_TOL
}

impl AcceptRange {
    pub fn contains(self, value: f64) -> bool {
        match self {
            AcceptRange::AtMost(high) => value <= high + slack(high),
            AcceptRange::AtLeast(low) => value >= low - slack(low),
            AcceptRange::Between { low, high } => {
                AcceptRange::AtLeast(low).contains(value)
                    && AcceptRange::AtMost(high).contains(value)
            }
        }
    }
}

/// Shared decision primitive for every evaluator. A missing or non-finite
/// metric is NotApplicable.
pub fn classify(metric: Option<f64>, range: AcceptRange) -> QcStatus {
    match metric {
        Some(v) if v.is_finite() => {
            if range.contains(v) {
                QcStatus::Pass
            } else {
                QcStatus::Fail
            }
        }
        _ => QcStatus::NotApplicable,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/range.rs"]
mod tests;
