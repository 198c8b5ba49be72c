use std::collections::BTreeSet;

use serde::Serialize;
use tracing::info;

use crate::model::flags::Flag;
use crate::model::records::QcRecords;
use crate::model::result::{EvaluationResult, QcCategory};
use crate::model::status::QcStatus;
use crate::pipeline::stage4_blanks::BlankGroupStats;
use crate::report::mean;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTally {
    pub pass: usize,
    pub fail: usize,
    pub not_applicable: usize,
}

impl CategoryTally {
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a EvaluationResult>) -> Self {
        let mut tally = Self::default();
        for r in results {
            match r.status {
                QcStatus::Pass => tally.pass += 1,
                QcStatus::Fail => tally.fail += 1,
                QcStatus::NotApplicable => tally.not_applicable += 1,
            }
        }
        tally
    }

    pub fn total(&self) -> usize {
        self.pass + self.fail + self.not_applicable
    }

    pub fn evaluated(&self) -> usize {
        self.pass + self.fail
    }

    /// Share of evaluated records that passed. `None` when nothing was
    /// evaluated.
    pub fn pass_rate(&self) -> Option<f64> {
        let n = self.evaluated();
        if n == 0 {
            return None;
        }
        Some(self.pass as f64 / n as f64)
    }

    pub fn fail_rate(&self) -> Option<f64> {
        self.pass_rate().map(|p| 1.0 - p)
    }
}

/// Sample counts per category. A sample is a distinct `(sample_id, run)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QcCounts {
    pub total_samples: usize,
    pub crm_samples: usize,
    pub crm_materials: usize,
    pub duplicate_pairs: usize,
    pub blank_samples: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnalyteVerdict {
    Pass,
    NeedsInvestigation,
    Fail,
    NotApplicable,
}

impl AnalyteVerdict {
    pub fn name(self) -> &'static str {
        match self {
            AnalyteVerdict::Pass => "Pass",
            AnalyteVerdict::NeedsInvestigation => "NeedsInvestigation",
            AnalyteVerdict::Fail => "Fail",
            AnalyteVerdict::NotApplicable => "NotApplicable",
        }
    }

    fn severity(self) -> u8 {
        match self {
            AnalyteVerdict::NotApplicable => 0,
            AnalyteVerdict::Pass => 1,
            AnalyteVerdict::NeedsInvestigation => 2,
            AnalyteVerdict::Fail => 3,
        }
    }
}

/// All QC categories rolled up for one analyte column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyteRollup {
    pub analyte: String,
    pub unit: String,
    pub crm: CategoryTally,
    pub crm_mean_recovery: Option<f64>,
    pub crm_mean_bias: Option<f64>,
    pub crm_verdict: AnalyteVerdict,
    pub duplicate: CategoryTally,
    pub duplicate_mean_rpd: Option<f64>,
    pub duplicate_verdict: AnalyteVerdict,
    pub blank: CategoryTally,
    pub blank_mean: Option<f64>,
    pub blank_sd: Option<f64>,
    pub blank_verdict: AnalyteVerdict,
    pub final_verdict: AnalyteVerdict,
}

#[derive(Debug, Clone)]
pub struct QcSummary {
    /// CRM, Duplicate, Blank; input order within each category.
    pub results: Vec<EvaluationResult>,
    pub counts: QcCounts,
    pub crm: CategoryTally,
    pub duplicate: CategoryTally,
    pub blank: CategoryTally,
    pub blank_groups: Vec<BlankGroupStats>,
    pub analytes: Vec<AnalyteRollup>,
}

impl QcSummary {
    pub fn results_for(&self, category: QcCategory) -> impl Iterator<Item = &EvaluationResult> {
        self.results.iter().filter(move |r| r.category == category)
    }

    pub fn tally(&self, category: QcCategory) -> CategoryTally {
        match category {
            QcCategory::Crm => self.crm,
            QcCategory::Duplicate => self.duplicate,
            QcCategory::Blank => self.blank,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Stage5Inputs<'a> {
    pub records: &'a QcRecords,
    pub crm: &'a [EvaluationResult],
    pub duplicates: &'a [EvaluationResult],
    pub blanks: &'a [EvaluationResult],
    pub blank_groups: &'a [BlankGroupStats],
    /// Certificate column order as `(analyte, unit)`.
    pub analyte_order: &'a [(String, String)],
}

pub fn run_stage5(inputs: &Stage5Inputs<'_>) -> QcSummary {
    let mut results =
        Vec::with_capacity(inputs.crm.len() + inputs.duplicates.len() + inputs.blanks.len());
    results.extend(inputs.crm.iter().cloned());
    results.extend(inputs.duplicates.iter().cloned());
    results.extend(inputs.blanks.iter().cloned());

    let counts = count_samples(inputs.records);
    let crm = CategoryTally::from_results(inputs.crm);
    let duplicate = CategoryTally::from_results(inputs.duplicates);
    let blank = CategoryTally::from_results(inputs.blanks);
    let analytes = build_rollups(&results, inputs.blank_groups, inputs.analyte_order);

    info!(
        total_samples = counts.total_samples,
        crm = counts.crm_samples,
        duplicates = counts.duplicate_pairs,
        blanks = counts.blank_samples,
        rows = results.len(),
        "QC summary built"
    );

    QcSummary {
        results,
        counts,
        crm,
        duplicate,
        blank,
        blank_groups: inputs.blank_groups.to_vec(),
        analytes,
    }
}

pub fn count_samples(records: &QcRecords) -> QcCounts {
    let crm = records
        .crm
        .iter()
        .map(|r| (r.sample_id.as_str(), r.run))
        .collect::<BTreeSet<_>>();
    let materials = records
        .crm
        .iter()
        .map(|r| r.sample_id.as_str())
        .collect::<BTreeSet<_>>();
    let duplicates = records
        .duplicates
        .iter()
        .map(|r| (r.sample_id.as_str(), r.run))
        .collect::<BTreeSet<_>>();
    let blanks = records
        .blanks
        .iter()
        .map(|r| (r.sample_id.as_str(), r.run))
        .collect::<BTreeSet<_>>();

    QcCounts {
        total_samples: crm.len() + duplicates.len() + blanks.len(),
        crm_samples: crm.len(),
        crm_materials: materials.len(),
        duplicate_pairs: duplicates.len(),
        blank_samples: blanks.len(),
    }
}

fn build_rollups(
    results: &[EvaluationResult],
    blank_groups: &[BlankGroupStats],
    analyte_order: &[(String, String)],
) -> Vec<AnalyteRollup> {
    let mut keys: Vec<(&str, &str)> = analyte_order
        .iter()
        .map(|(a, u)| (a.as_str(), u.as_str()))
        .collect();
    for r in results {
        let key = (r.analyte.as_str(), r.unit.as_str());
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    let mut out = Vec::new();
    for (analyte, unit) in keys {
        let rows = results
            .iter()
            .filter(|r| r.analyte == analyte && r.unit == unit)
            .collect::<Vec<_>>();
        if rows.is_empty() {
            continue;
        }
        let of = |category: QcCategory| {
            rows.iter()
                .copied()
                .filter(move |r| r.category == category)
                .collect::<Vec<_>>()
        };
        let crm_rows = of(QcCategory::Crm);
        let dup_rows = of(QcCategory::Duplicate);
        let blank_rows = of(QcCategory::Blank);

        let crm_verdict = crm_verdict(&crm_rows);
        let duplicate_verdict = flagged_verdict(&dup_rows, Flag::BdlSubstituted);
        let blank_verdict = flagged_verdict(&blank_rows, Flag::AboveDetectionLimit);
        let final_verdict = [crm_verdict, duplicate_verdict, blank_verdict]
            .into_iter()
            .max_by_key(|v| v.severity())
            .unwrap_or(AnalyteVerdict::NotApplicable);

        let group = blank_groups
            .iter()
            .find(|g| g.analyte == analyte && g.unit == unit);

        out.push(AnalyteRollup {
            analyte: analyte.to_string(),
            unit: unit.to_string(),
            crm: CategoryTally::from_results(crm_rows.iter().copied()),
            crm_mean_recovery: mean_of(&crm_rows, |r| r.metric),
            crm_mean_bias: mean_of(&crm_rows, |r| r.bias),
            crm_verdict,
            duplicate: CategoryTally::from_results(dup_rows.iter().copied()),
            duplicate_mean_rpd: mean_of(&dup_rows, |r| r.metric),
            duplicate_verdict,
            blank: CategoryTally::from_results(blank_rows.iter().copied()),
            blank_mean: group.and_then(|g| g.mean),
            blank_sd: group.and_then(|g| g.sd),
            blank_verdict,
            final_verdict,
        });
    }
    out
}

fn mean_of(
    rows: &[&EvaluationResult],
    field: impl Fn(&EvaluationResult) -> Option<f64>,
) -> Option<f64> {
    let values = rows.iter().filter_map(|r| field(*r)).collect::<Vec<_>>();
    mean(&values)
}

/// Two or more CRM failures fail the analyte; a single failure, or a
/// censored measurement against a detectable certified value, needs review.
pub fn crm_verdict(rows: &[&EvaluationResult]) -> AnalyteVerdict {
    let fails = rows.iter().filter(|r| r.is_fail()).count();
    if fails >= 2 {
        return AnalyteVerdict::Fail;
    }
    if fails == 1 || rows.iter().any(|r| r.has_flag(Flag::MeasuredBelowDl)) {
        return AnalyteVerdict::NeedsInvestigation;
    }
    if rows.iter().any(|r| r.is_pass()) {
        return AnalyteVerdict::Pass;
    }
    AnalyteVerdict::NotApplicable
}

fn flagged_verdict(rows: &[&EvaluationResult], review_flag: Flag) -> AnalyteVerdict {
    if rows.iter().any(|r| r.is_fail()) {
        return AnalyteVerdict::Fail;
    }
    if rows
        .iter()
        .any(|r| r.is_pass() && r.has_flag(review_flag))
    {
        return AnalyteVerdict::NeedsInvestigation;
    }
    if rows.iter().any(|r| r.is_pass()) {
        return AnalyteVerdict::Pass;
    }
    AnalyteVerdict::NotApplicable
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_summary.rs"]
mod tests;
