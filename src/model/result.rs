use serde::Serialize;

use crate::model::flags::Flag;
use crate::model::status::{NaReason, QcStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum QcCategory {
    Crm,
    Duplicate,
    Blank,
}

impl QcCategory {
    pub fn name(self) -> &'static str {
        match self {
            QcCategory::Crm => "CRM",
            QcCategory::Duplicate => "Duplicate",
            QcCategory::Blank => "Blank",
        }
    }
}

pub fn category_order() -> &'static [QcCategory] {
    &[QcCategory::Crm, QcCategory::Duplicate, QcCategory::Blank]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MetricKind {
    RecoveryPct,
    RpdPct,
    BlankExceedance,
}

impl MetricKind {
    pub fn name(self) -> &'static str {
        match self {
            MetricKind::RecoveryPct => "recovery_pct",
            MetricKind::RpdPct => "rpd_pct",
            MetricKind::BlankExceedance => "blank_exceedance_ratio",
        }
    }
}

/// Outcome of evaluating one QC record (or duplicate pair).
///
/// `value` is the resolved measurement (the original for duplicates) and
/// `reference` is what it was compared against: the certified value, the
/// duplicate reading, or the blank threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub category: QcCategory,
    pub sample_id: String,
    pub run: u32,
    pub analyte: String,
    pub unit: String,
    pub value: Option<f64>,
    pub reference: Option<f64>,
    pub detection_limit: Option<f64>,
    pub metric_kind: MetricKind,
    pub metric: Option<f64>,
    /// Bias percent, CRMs only.
    pub bias: Option<f64>,
    pub status: QcStatus,
    pub reason: Option<NaReason>,
    pub flags: Vec<Flag>,
}

impl EvaluationResult {
    pub fn is_pass(&self) -> bool {
        self.status == QcStatus::Pass
    }

    pub fn is_fail(&self) -> bool {
        self.status == QcStatus::Fail
    }

    pub fn has_flag(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }
}
