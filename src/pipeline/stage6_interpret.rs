use std::collections::BTreeSet;

use crate::model::flags::Flag;
use crate::model::result::{EvaluationResult, QcCategory};
use crate::model::thresholds::ToleranceConfig;
use crate::pipeline::stage4_blanks::BlankGroupStats;
use crate::pipeline::stage5_summary::{CategoryTally, QcCounts, QcSummary};
use crate::report::context::{matrix_context, method_context};
use crate::report::text::render_narrative;
use crate::report::{format_f64, mean};

/// Mean CRM bias (percent) beyond which a direction is reported.
pub const NOTABLE_BIAS_PCT: f64 = 5.0;

/// Descriptive run metadata supplied by the parser and the CLI. Used only as
/// narrative context.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub file_name: String,
    pub report_number: Option<String>,
    pub report_date: Option<String>,
    pub names_match: bool,
    pub lab_name: Option<String>,
    pub matrix_type: Option<String>,
    pub method_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiasDirection {
    High,
    Low,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePattern {
    None,
    SingleCrm,
    MultiCrm,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyteFailures {
    pub analyte: String,
    pub count: usize,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone)]
pub struct CrmMetrics {
    pub tally: CategoryTally,
    pub mean_bias: Option<f64>,
    pub bias_direction: BiasDirection,
    pub failures_by_analyte: Vec<AnalyteFailures>,
    pub failing_materials: usize,
    pub pattern: FailurePattern,
}

#[derive(Debug, Clone)]
pub struct DuplicateMetrics {
    pub tally: CategoryTally,
    pub failed: Vec<String>,
    pub substituted: usize,
}

#[derive(Debug, Clone)]
pub struct BlankMetrics {
    pub tally: CategoryTally,
    pub failed: Vec<String>,
    pub groups: Vec<BlankGroupStats>,
}

/// Everything the narrative template needs, computed up front so rendering
/// is pure formatting.
#[derive(Debug, Clone)]
pub struct NarrativeContext {
    pub run: RunContext,
    pub config: ToleranceConfig,
    pub counts: QcCounts,
    pub crm: CrmMetrics,
    pub duplicates: DuplicateMetrics,
    pub blanks: BlankMetrics,
    pub matrix_text: String,
    pub method_text: String,
}

/// Narrative text for a run. Same summary, configuration and metadata
/// always produce the same text.
pub fn run_stage6(summary: &QcSummary, config: &ToleranceConfig, run: &RunContext) -> String {
    let ctx = build_narrative_context(summary, config, run);
    render_narrative(&ctx)
}

pub fn build_narrative_context(
    summary: &QcSummary,
    config: &ToleranceConfig,
    run: &RunContext,
) -> NarrativeContext {
    let crm_rows = summary.results_for(QcCategory::Crm).collect::<Vec<_>>();
    let dup_rows = summary
        .results_for(QcCategory::Duplicate)
        .collect::<Vec<_>>();
    let blank_rows = summary.results_for(QcCategory::Blank).collect::<Vec<_>>();

    NarrativeContext {
        run: run.clone(),
        config: config.clone(),
        counts: summary.counts,
        crm: crm_metrics(&crm_rows, summary.crm),
        duplicates: duplicate_metrics(&dup_rows, summary.duplicate),
        blanks: blank_metrics(&blank_rows, summary.blank, &summary.blank_groups),
        matrix_text: matrix_context(run.matrix_type.as_deref()),
        method_text: method_context(run.method_code.as_deref()),
    }
}

pub fn bias_direction(mean_bias: Option<f64>) -> BiasDirection {
    match mean_bias {
        Some(b) if b > NOTABLE_BIAS_PCT => BiasDirection::High,
        Some(b) if b < -NOTABLE_BIAS_PCT => BiasDirection::Low,
        _ => BiasDirection::Neutral,
    }
}

fn crm_metrics(rows: &[&EvaluationResult], tally: CategoryTally) -> CrmMetrics {
    let evaluated = rows
        .iter()
        .filter(|r| r.is_pass() || r.is_fail())
        .collect::<Vec<_>>();
    let biases = evaluated.iter().filter_map(|r| r.bias).collect::<Vec<_>>();
    let mean_bias = mean(&biases);

    let mut failures_by_analyte: Vec<AnalyteFailures> = Vec::new();
    let mut failing = BTreeSet::new();
    for r in rows.iter().filter(|r| r.is_fail()) {
        failing.insert(r.sample_id.as_str());
        let recovery = r.metric.unwrap_or_default();
        match failures_by_analyte.iter_mut().find(|f| f.analyte == r.analyte) {
            Some(entry) => {
                entry.count += 1;
                entry.min = entry.min.min(recovery);
                entry.max = entry.max.max(recovery);
            }
            None => failures_by_analyte.push(AnalyteFailures {
                analyte: r.analyte.clone(),
                count: 1,
                min: recovery,
                max: recovery,
            }),
        }
    }

    let pattern = match failing.len() {
        0 => FailurePattern::None,
        1 => FailurePattern::SingleCrm,
        _ => FailurePattern::MultiCrm,
    };

    CrmMetrics {
        tally,
        mean_bias,
        bias_direction: bias_direction(mean_bias),
        failures_by_analyte,
        failing_materials: failing.len(),
        pattern,
    }
}

fn duplicate_metrics(rows: &[&EvaluationResult], tally: CategoryTally) -> DuplicateMetrics {
    let failed = rows
        .iter()
        .filter(|r| r.is_fail())
        .map(|r| {
            format!(
                "{} in {} ({}% RPD)",
                r.analyte,
                r.sample_id,
                format_f64(r.metric.unwrap_or_default(), 1)
            )
        })
        .collect();
    DuplicateMetrics {
        tally,
        failed,
        substituted: rows
            .iter()
            .filter(|r| r.has_flag(Flag::BdlSubstituted))
            .count(),
    }
}

fn blank_metrics(
    rows: &[&EvaluationResult],
    tally: CategoryTally,
    groups: &[BlankGroupStats],
) -> BlankMetrics {
    let failed = rows
        .iter()
        .filter(|r| r.is_fail())
        .map(|r| {
            format!(
                "{} in {} ({} {} > threshold {})",
                r.analyte,
                r.sample_id,
                format_f64(r.value.unwrap_or_default(), 4),
                r.unit,
                format_f64(r.reference.unwrap_or_default(), 4)
            )
        })
        .collect();
    BlankMetrics {
        tally,
        failed,
        groups: groups.to_vec(),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage6_interpret.rs"]
mod tests;
