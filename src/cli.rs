use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::{RuleSetting, ToleranceOverrides};
use crate::pipeline::stage7_report::RunMode;

#[derive(Debug, Parser)]
#[command(
    name = "kira-assayqc",
    version,
    about = "QC evaluation of geochemical assay certificates"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate CRM, duplicate and blank QC for one certificate.
    Run(RunArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunModeArg {
    Standalone,
    Pipeline,
}

impl From<RunModeArg> for RunMode {
    fn from(value: RunModeArg) -> Self {
        match value {
            RunModeArg::Standalone => RunMode::Standalone,
            RunModeArg::Pipeline => RunMode::Pipeline,
        }
    }
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// QC sheet (CSV or TSV, optionally gzipped).
    #[arg(long, value_name = "FILE")]
    pub input: PathBuf,

    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,

    /// JSON file with tolerance defaults.
    #[arg(long, value_name = "JSON")]
    pub config: Option<PathBuf>,

    /// Lower CRM recovery bound (%).
    #[arg(long, value_name = "N")]
    pub crm_low_tol: Option<f64>,

    /// Upper CRM recovery bound (%).
    #[arg(long, value_name = "N")]
    pub crm_high_tol: Option<f64>,

    /// Maximum duplicate RPD (%).
    #[arg(long, value_name = "N")]
    pub rpd_tol: Option<f64>,

    /// Blank threshold as a multiple of the detection limit.
    #[arg(long, value_name = "N")]
    pub blank_factor: Option<f64>,

    /// half, sqrt2, zero, dl or a fixed non-negative number.
    #[arg(long, value_name = "RULE")]
    pub bdl_rule: Option<String>,

    /// Sample matrix, e.g. soil, rock, till.
    #[arg(long, value_name = "TYPE")]
    pub matrix: Option<String>,

    /// Analytical method code; defaults to the certificate's main method.
    #[arg(long, value_name = "CODE")]
    pub method: Option<String>,

    #[arg(long, value_name = "NAME")]
    pub lab: Option<String>,

    #[arg(long, value_enum, default_value = "standalone")]
    pub run_mode: RunModeArg,
}

impl RunArgs {
    pub fn overrides(&self) -> ToleranceOverrides {
        ToleranceOverrides {
            crm_low_tol: self.crm_low_tol,
            crm_high_tol: self.crm_high_tol,
            duplicate_rpd_tol: self.rpd_tol,
            blank_tol_factor: self.blank_factor,
            bdl_sub_rule: self.bdl_rule.clone().map(RuleSetting::Named),
        }
    }
}
