use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

pub mod meta;
pub mod samples;
pub mod sheet;

use meta::{AnalyteMeta, analyte_metadata, header_metadata};
use samples::build_records;
use sheet::{file_stem, read_grid};

use crate::model::records::QcRecords;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// One parsed assay certificate.
#[derive(Debug, Clone)]
pub struct InputBundle {
    /// File name without extension.
    pub file_name: String,
    pub header: BTreeMap<String, String>,
    pub report_number: Option<String>,
    pub report_date: Option<String>,
    pub names_match: bool,
    pub analytes: Vec<AnalyteMeta>,
    pub records: QcRecords,
    pub skipped_rows: Vec<String>,
    pub unparsed_cells: usize,
}

impl InputBundle {
    pub fn analyte_order(&self) -> Vec<(String, String)> {
        self.analytes
            .iter()
            .map(|a| (a.analyte.clone(), a.unit.clone()))
            .collect()
    }

    /// Laboratory named in the certificate header, if any.
    pub fn lab_name(&self) -> Option<String> {
        ["laboratory", "lab", "lab name"]
            .iter()
            .find_map(|k| self.header.get(*k))
            .filter(|v| !v.is_empty())
            .cloned()
    }

    pub fn dominant_method(&self) -> Option<String> {
        meta::dominant_method(&self.analytes)
    }
}

pub fn load_qc_sheet(path: &Path) -> Result<InputBundle, InputError> {
    if !path.is_file() {
        return Err(InputError::MissingInput(format!(
            "certificate not found: {}",
            path.display()
        )));
    }

    let grid = read_grid(path)?;
    let header = header_metadata(&grid);
    let analytes = analyte_metadata(&grid)?;
    let table = build_records(&grid, &analytes);

    let file_name = file_stem(path);
    let report_number = header.get("report number").cloned();
    let report_date = header
        .get("report date")
        .or_else(|| header.get("date"))
        .cloned();
    let names_match = report_number
        .as_deref()
        .is_none_or(|number| number == file_name);
    if !names_match {
        warn!(
            file = %file_name,
            report_number = report_number.as_deref().unwrap_or_default(),
            "file name does not match certificate report number"
        );
    }
    if table.unparsed_cells > 0 {
        warn!(
            cells = table.unparsed_cells,
            "non-numeric cells treated as missing"
        );
    }
    if table.records.is_empty() {
        warn!(path = %path.display(), "no QC samples found in certificate");
    }

    info!(
        path = %path.display(),
        analytes = analytes.len(),
        records = table.records.len(),
        crm = table.records.crm.len(),
        duplicates = table.records.duplicates.len(),
        blanks = table.records.blanks.len(),
        skipped = table.skipped_rows.len(),
        "certificate loaded"
    );

    Ok(InputBundle {
        file_name,
        header,
        report_number,
        report_date,
        names_match,
        analytes,
        records: table.records,
        skipped_rows: table.skipped_rows,
        unparsed_cells: table.unparsed_cells,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
