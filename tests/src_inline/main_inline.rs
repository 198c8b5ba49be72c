use super::*;
use clap::Parser;
use crate::error::QcError;
use crate::model::bdl::SubstitutionRule;
use crate::pipeline::stage7_report::RunMode;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> std::path::PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("kira_assayqc_main_test_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn run_args(extra: &[&str]) -> RunArgs {
    let mut argv = vec!["kira-assayqc", "run", "--input", "data.csv", "--out", "out"];
    argv.extend_from_slice(extra);
    let cli = Cli::try_parse_from(argv).unwrap();
    match cli.command {
        Command::Run(args) => args,
    }
}

#[test]
fn test_parse_args_default_run_mode_standalone() {
    let args = run_args(&[]);
    assert_eq!(RunMode::from(args.run_mode), RunMode::Standalone);
    assert!(args.config.is_none());
    assert_eq!(args.overrides(), ToleranceOverrides::default());
}

#[test]
fn test_parse_args_pipeline_run_mode() {
    let args = run_args(&["--run-mode", "pipeline"]);
    assert_eq!(RunMode::from(args.run_mode), RunMode::Pipeline);
}

#[test]
fn test_parse_args_tolerances() {
    let args = run_args(&[
        "--crm-low-tol",
        "85",
        "--rpd-tol",
        "25",
        "--bdl-rule",
        "zero",
        "--matrix",
        "till",
    ]);
    let config = args.overrides().into_config().unwrap();
    assert_eq!(config.crm_low_tol, 85.0);
    assert_eq!(config.duplicate_rpd_tol, 25.0);
    assert_eq!(config.bdl_sub_rule, SubstitutionRule::Zero);
    assert_eq!(args.matrix.as_deref(), Some("till"));
}

#[test]
fn test_verbose_count() {
    let cli = Cli::try_parse_from(["kira-assayqc", "-vv", "run", "--input", "a", "--out", "b"])
        .unwrap();
    assert_eq!(cli.verbose, 2);
}

#[test]
fn test_missing_required_args() {
    assert!(Cli::try_parse_from(["kira-assayqc", "run", "--input", "a"]).is_err());
}

#[test]
fn test_run_end_to_end() {
    let dir = make_temp_dir();
    let input = dir.join("A25-2.csv");
    fs::write(
        &input,
        "Report Number: A25-2\n\
         Report Date: 2025-01-10\n\
         Analyte Symbol,Cu\n\
         Unit Symbol,ppm\n\
         Detection Limit,0.2\n\
         Analysis Method,AR-ICPMS\n\
         OREAS 45e Meas,85\n\
         OREAS 45e Cert,100\n\
         S-1 Orig,10\n\
         S-1 Dup,14\n\
         Blank,0.6\n",
    )
    .unwrap();
    let out = dir.join("out");
    let args = run_args(&[]);
    let args = RunArgs {
        input,
        out: out.clone(),
        run_mode: crate::cli::RunModeArg::Pipeline,
        ..args
    };
    run(&args).unwrap();

    let report = fs::read_to_string(out.join("kira-assayqc").join("report.txt")).unwrap();
    assert!(report.starts_with("QC Summary for A25-2 (Report: A25-2, Date: 2025-01-10)"));
    assert!(report.contains("Aqua regia digestion"));

    let qc = fs::read_to_string(out.join("kira-assayqc").join("qc_summary.tsv")).unwrap();
    let statuses = qc
        .lines()
        .skip(1)
        .map(|l| l.split('\t').nth(11).unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(statuses, vec!["Pass", "Fail", "Pass"]);
}

#[test]
fn test_run_rejects_invalid_config() {
    let args = run_args(&["--crm-low-tol", "150"]);
    assert!(matches!(
        run(&args),
        Err(QcError::ConfigurationInvalid { .. })
    ));
}
