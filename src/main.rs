mod cli;
mod config;
mod error;
mod input;
mod logging;
mod model;
mod pipeline;
mod report;

use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Command, RunArgs};
use crate::config::{ToleranceOverrides, load_overrides};
use crate::error::Result;
use crate::input::load_qc_sheet;
use crate::pipeline::stage2_crm::run_stage2;
use crate::pipeline::stage3_duplicates::run_stage3;
use crate::pipeline::stage4_blanks::run_stage4;
use crate::pipeline::stage5_summary::{Stage5Inputs, run_stage5};
use crate::pipeline::stage6_interpret::{RunContext, run_stage6};
use crate::pipeline::stage7_report::{Stage7Input, resolve_output_dir, write_reports};

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    let result = match &cli.command {
        Command::Run(args) => run(args),
    };
    if let Err(err) = result {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(args: &RunArgs) -> Result<()> {
    let file_layer = match &args.config {
        Some(path) => load_overrides(path)?,
        None => ToleranceOverrides::default(),
    };
    let config = file_layer.layered(args.overrides()).into_config()?;

    let bundle = load_qc_sheet(&args.input)?;
    let records = &bundle.records;

    let crm = run_stage2(&records.crm, &config);
    let duplicates = run_stage3(&records.duplicates, &config);
    let blanks = run_stage4(&records.blanks, &config);

    let analyte_order = bundle.analyte_order();
    let summary = run_stage5(&Stage5Inputs {
        records,
        crm: &crm,
        duplicates: &duplicates,
        blanks: &blanks.results,
        blank_groups: &blanks.groups,
        analyte_order: &analyte_order,
    });

    let run = RunContext {
        file_name: bundle.file_name.clone(),
        report_number: bundle.report_number.clone(),
        report_date: bundle.report_date.clone(),
        names_match: bundle.names_match,
        lab_name: args.lab.clone().or_else(|| bundle.lab_name()),
        matrix_type: args.matrix.clone(),
        method_code: args.method.clone().or_else(|| bundle.dominant_method()),
    };
    let narrative = run_stage6(&summary, &config, &run);

    let out_dir = resolve_output_dir(&args.out, args.run_mode.into());
    let paths = write_reports(
        &Stage7Input {
            summary: &summary,
            narrative: &narrative,
            config: &config,
            run: &run,
            tool_version: env!("CARGO_PKG_VERSION"),
        },
        &out_dir,
    )?;

    info!(
        results = summary.results.len(),
        skipped_rows = bundle.skipped_rows.len(),
        unparsed_cells = bundle.unparsed_cells,
        report = %paths.report.display(),
        "assay QC complete"
    );
    Ok(())
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
