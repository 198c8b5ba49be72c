use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::input::InputError;
use crate::input::sheet::cell;

/// Rows 1-6 of the certificate hold header lines and analyte metadata.
pub const METADATA_ROWS: usize = 6;
const ANALYTE_ROW: usize = 2;
const UNIT_ROW: usize = 3;
const DL_ROW: usize = 4;
const METHOD_ROW: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyteMeta {
    /// Sheet column index (column A is 0).
    pub column: usize,
    pub analyte: String,
    pub unit: String,
    pub detection_limit: Option<f64>,
    pub method: String,
}

impl AnalyteMeta {
    /// Normalised column name, e.g. `Fe_pct`.
    pub fn column_name(&self) -> String {
        column_name(&self.analyte, &self.unit)
    }
}

pub fn column_name(analyte: &str, unit: &str) -> String {
    format!("{}_{}", analyte, unit)
        .chars()
        .filter(|c| *c != ' ' && *c != '/')
        .collect()
}

/// `Key: value` lines from column A, keyed by lower-cased key.
pub fn header_metadata(grid: &[Vec<String>]) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for row in grid {
        let first = cell(row, 0);
        if let Some((key, value)) = first.split_once(':') {
            let key = key.trim().to_ascii_lowercase();
            if key.is_empty() {
                continue;
            }
            out.entry(key).or_insert_with(|| value.trim().to_string());
        }
    }
    out
}

pub fn analyte_metadata(grid: &[Vec<String>]) -> Result<Vec<AnalyteMeta>, InputError> {
    if grid.len() < METADATA_ROWS {
        return Err(InputError::InvalidInput(format!(
            "expected {} metadata rows, found {}",
            METADATA_ROWS,
            grid.len()
        )));
    }
    let analytes = &grid[ANALYTE_ROW];
    let mut out = Vec::new();
    for col in 1..analytes.len() {
        let analyte = cell(analytes, col);
        if analyte.is_empty() {
            continue;
        }
        let dl_raw = cell(&grid[DL_ROW], col);
        let detection_limit = match dl_raw.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => Some(v),
            _ => {
                warn!(analyte, value = dl_raw, "unusable detection limit");
                None
            }
        };
        let meta = AnalyteMeta {
            column: col,
            analyte: analyte.to_string(),
            unit: cell(&grid[UNIT_ROW], col).to_string(),
            detection_limit,
            method: cell(&grid[METHOD_ROW], col).to_string(),
        };
        debug!(column = %meta.column_name(), dl = ?meta.detection_limit, "analyte column");
        out.push(meta);
    }
    if out.is_empty() {
        return Err(InputError::InvalidInput(
            "no analyte columns found in metadata row 3".to_string(),
        ));
    }
    Ok(out)
}

/// Most frequent non-empty method code; ties go to the first seen.
pub fn dominant_method(analytes: &[AnalyteMeta]) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for a in analytes {
        let m = a.method.as_str();
        if m.is_empty() {
            continue;
        }
        match counts.iter_mut().find(|(name, _)| *name == m) {
            Some(entry) => entry.1 += 1,
            None => counts.push((m, 1)),
        }
    }
    let mut best: Option<(&str, usize)> = None;
    for (name, n) in counts {
        if best.is_none_or(|(_, b)| n > b) {
            best = Some((name, n));
        }
    }
    best.map(|(name, _)| name.to_string())
}
