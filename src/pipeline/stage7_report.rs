use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::QcError;
use crate::model::flags::format_flags;
use crate::model::thresholds::ToleranceConfig;
use crate::pipeline::stage5_summary::QcSummary;
use crate::pipeline::stage6_interpret::RunContext;
use crate::report::format_opt;
use crate::report::json::{build_summary_json, render_summary_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Standalone,
    Pipeline,
}

#[derive(Debug, Clone)]
pub struct Stage7Input<'a> {
    pub summary: &'a QcSummary,
    pub narrative: &'a str,
    pub config: &'a ToleranceConfig,
    pub run: &'a RunContext,
    pub tool_version: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub qc_summary: PathBuf,
    pub analyte_summary: PathBuf,
    pub summary_json: PathBuf,
    pub report: PathBuf,
}

pub fn resolve_output_dir(base: &Path, run_mode: RunMode) -> PathBuf {
    match run_mode {
        RunMode::Standalone => base.to_path_buf(),
        RunMode::Pipeline => base.join("kira-assayqc"),
    }
}

pub fn write_reports(input: &Stage7Input<'_>, out_dir: &Path) -> Result<ReportPaths, QcError> {
    fs::create_dir_all(out_dir)?;

    let paths = ReportPaths {
        qc_summary: out_dir.join("qc_summary.tsv"),
        analyte_summary: out_dir.join("analyte_summary.tsv"),
        summary_json: out_dir.join("summary.json"),
        report: out_dir.join("report.txt"),
    };

    write_qc_summary_tsv(input.summary, &paths.qc_summary)?;
    write_analyte_tsv(input.summary, &paths.analyte_summary)?;

    let data = build_summary_json(input.summary, input.config, input.run, input.tool_version);
    let json = render_summary_json(&data)?;
    write_text(&paths.summary_json, &json)?;

    write_text(&paths.report, input.narrative)?;

    info!(out_dir = %out_dir.display(), "reports written");
    Ok(paths)
}

fn write_qc_summary_tsv(summary: &QcSummary, path: &Path) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    let header = [
        "category",
        "sample",
        "run",
        "analyte",
        "unit",
        "value",
        "reference",
        "detection_limit",
        "metric_kind",
        "metric",
        "bias_pct",
        "status",
        "reason",
        "flags",
    ]
    .join("\t");
    writeln!(w, "{}", header)?;

    for r in &summary.results {
        let row = [
            r.category.name().to_string(),
            r.sample_id.clone(),
            r.run.to_string(),
            r.analyte.clone(),
            r.unit.clone(),
            format_opt(r.value, 6),
            format_opt(r.reference, 6),
            format_opt(r.detection_limit, 6),
            r.metric_kind.name().to_string(),
            format_opt(r.metric, 6),
            format_opt(r.bias, 6),
            r.status.name().to_string(),
            r.reason.map(|n| n.describe()).unwrap_or_default(),
            format_flags(&r.flags),
        ];
        writeln!(w, "{}", row.join("\t"))?;
    }
    w.flush()
}

fn write_analyte_tsv(summary: &QcSummary, path: &Path) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    let header = [
        "analyte",
        "unit",
        "crm_pass",
        "crm_fail",
        "crm_na",
        "crm_mean_recovery",
        "crm_mean_bias",
        "crm_verdict",
        "dup_pass",
        "dup_fail",
        "dup_na",
        "dup_mean_rpd",
        "dup_verdict",
        "blank_pass",
        "blank_fail",
        "blank_na",
        "blank_mean",
        "blank_sd",
        "blank_verdict",
        "final_verdict",
    ]
    .join("\t");
    writeln!(w, "{}", header)?;

    for a in &summary.analytes {
        let row = [
            a.analyte.clone(),
            a.unit.clone(),
            a.crm.pass.to_string(),
            a.crm.fail.to_string(),
            a.crm.not_applicable.to_string(),
            format_opt(a.crm_mean_recovery, 3),
            format_opt(a.crm_mean_bias, 3),
            a.crm_verdict.name().to_string(),
            a.duplicate.pass.to_string(),
            a.duplicate.fail.to_string(),
            a.duplicate.not_applicable.to_string(),
            format_opt(a.duplicate_mean_rpd, 3),
            a.duplicate_verdict.name().to_string(),
            a.blank.pass.to_string(),
            a.blank.fail.to_string(),
            a.blank.not_applicable.to_string(),
            format_opt(a.blank_mean, 6),
            format_opt(a.blank_sd, 6),
            a.blank_verdict.name().to_string(),
            a.final_verdict.name().to_string(),
        ];
        writeln!(w, "{}", row.join("\t"))?;
    }
    w.flush()
}

fn write_text(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    w.write_all(contents.as_bytes())?;
    w.flush()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage7_report.rs"]
mod tests;
