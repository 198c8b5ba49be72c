use serde::Serialize;

use crate::model::result::category_order;
use crate::model::thresholds::ToleranceConfig;
use crate::pipeline::stage4_blanks::BlankGroupStats;
use crate::pipeline::stage5_summary::{AnalyteRollup, CategoryTally, QcCounts, QcSummary};
use crate::pipeline::stage6_interpret::RunContext;

#[derive(Debug, Serialize)]
pub struct SummaryJson<'a> {
    pub tool: &'a str,
    pub version: &'a str,
    pub input: InputJson<'a>,
    pub config: ConfigJson,
    pub counts: QcCounts,
    pub tallies: TalliesJson,
    /// Plot feed: per-category status counts.
    pub status_distribution: Vec<DistributionJson>,
    pub blank_groups: &'a [BlankGroupStats],
    pub analytes: &'a [AnalyteRollup],
}

#[derive(Debug, Serialize)]
pub struct InputJson<'a> {
    pub file_name: &'a str,
    pub report_number: Option<&'a str>,
    pub report_date: Option<&'a str>,
    pub names_match: bool,
    pub matrix_type: Option<&'a str>,
    pub method_code: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct ConfigJson {
    pub crm_low_tol: f64,
    pub crm_high_tol: f64,
    pub duplicate_rpd_tol: f64,
    pub blank_tol_factor: f64,
    pub bdl_sub_rule: String,
}

#[derive(Debug, Serialize)]
pub struct TalliesJson {
    pub crm: CategoryTally,
    pub duplicate: CategoryTally,
    pub blank: CategoryTally,
}

#[derive(Debug, Serialize)]
pub struct DistributionJson {
    pub category: &'static str,
    pub pass: usize,
    pub fail: usize,
    pub not_applicable: usize,
}

pub fn build_summary_json<'a>(
    summary: &'a QcSummary,
    config: &ToleranceConfig,
    run: &'a RunContext,
    tool_version: &'a str,
) -> SummaryJson<'a> {
    let status_distribution = category_order()
        .iter()
        .map(|&c| {
            let t = summary.tally(c);
            DistributionJson {
                category: c.name(),
                pass: t.pass,
                fail: t.fail,
                not_applicable: t.not_applicable,
            }
        })
        .collect();

    SummaryJson {
        tool: "kira-assayqc",
        version: tool_version,
        input: InputJson {
            file_name: &run.file_name,
            report_number: run.report_number.as_deref(),
            report_date: run.report_date.as_deref(),
            names_match: run.names_match,
            matrix_type: run.matrix_type.as_deref(),
            method_code: run.method_code.as_deref(),
        },
        config: ConfigJson {
            crm_low_tol: config.crm_low_tol,
            crm_high_tol: config.crm_high_tol,
            duplicate_rpd_tol: config.duplicate_rpd_tol,
            blank_tol_factor: config.blank_tol_factor,
            bdl_sub_rule: config.bdl_sub_rule.to_string(),
        },
        counts: summary.counts,
        tallies: TalliesJson {
            crm: summary.crm,
            duplicate: summary.duplicate,
            blank: summary.blank,
        },
        status_distribution,
        blank_groups: &summary.blank_groups,
        analytes: &summary.analytes,
    }
}

pub fn render_summary_json(data: &SummaryJson<'_>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(data)
}
