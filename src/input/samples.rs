use std::collections::HashMap;

use tracing::{debug, warn};

use crate::input::meta::{AnalyteMeta, METADATA_ROWS};
use crate::input::sheet::cell;
use crate::model::bdl::MeasuredValue;
use crate::model::records::{BlankRecord, CrmRecord, DuplicatePair, QcRecords};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleKind {
    Blank,
    DuplicateOriginal,
    DuplicateCopy,
    CrmMeasured,
    CrmCertified,
    Unrecognized,
}

impl SampleKind {
    fn marker(self) -> Option<&'static str> {
        match self {
            SampleKind::DuplicateOriginal => Some("ORIG"),
            SampleKind::DuplicateCopy => Some("DUP"),
            SampleKind::CrmMeasured => Some("MEAS"),
            SampleKind::CrmCertified => Some("CERT"),
            SampleKind::Blank | SampleKind::Unrecognized => None,
        }
    }
}

fn has_marker(upper: &str, marker: &str) -> bool {
    upper.contains(&format!(" {marker}")) || upper.ends_with(marker)
}

pub fn classify_sample(name: &str) -> SampleKind {
    let upper = name.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return SampleKind::Unrecognized;
    }
    if upper.contains("BLANK") || upper.contains("BLK") {
        return SampleKind::Blank;
    }
    if has_marker(&upper, "ORIG") {
        return SampleKind::DuplicateOriginal;
    }
    if has_marker(&upper, "DUP") {
        return SampleKind::DuplicateCopy;
    }
    if has_marker(&upper, "MEAS") {
        return SampleKind::CrmMeasured;
    }
    if has_marker(&upper, "CERT") {
        return SampleKind::CrmCertified;
    }
    SampleKind::Unrecognized
}

/// Sample name with its ORIG/DUP/MEAS/CERT marker removed, so both halves
/// of a pair share one key.
pub fn base_name(name: &str, kind: SampleKind) -> String {
    let Some(marker) = kind.marker() else {
        return name.trim().to_string();
    };
    let tokens = name.split_whitespace().collect::<Vec<_>>();
    let last = tokens.len().saturating_sub(1);
    let mut kept = Vec::with_capacity(tokens.len());
    for (i, tok) in tokens.iter().enumerate() {
        let upper = tok.to_ascii_uppercase();
        if upper == marker {
            continue;
        }
        if i == last && upper.ends_with(marker) {
            kept.push(&tok[..tok.len() - marker.len()]);
            continue;
        }
        kept.push(*tok);
    }
    kept.join(" ")
}

#[derive(Debug, Clone)]
struct SampleRow<'a> {
    name: String,
    base: String,
    occurrence: u32,
    cells: &'a [String],
}

#[derive(Debug, Default)]
pub struct SampleTable {
    pub records: QcRecords,
    pub skipped_rows: Vec<String>,
    pub unparsed_cells: usize,
}

fn parse_cell(raw: &str, sample: &str, analyte: &str, unparsed: &mut usize) -> MeasuredValue {
    let value = MeasuredValue::parse(raw);
    if value.is_missing() && !raw.trim().is_empty() {
        debug!(sample, analyte, raw, "non-numeric cell treated as missing");
        *unparsed += 1;
    }
    value
}

/// Classify QC rows and pair them into typed records.
pub fn build_records(grid: &[Vec<String>], analytes: &[AnalyteMeta]) -> SampleTable {
    let mut table = SampleTable::default();
    let mut occurrences: HashMap<(SampleKind, String), u32> = HashMap::new();
    let mut by_kind: HashMap<SampleKind, Vec<SampleRow<'_>>> = HashMap::new();

    for row in grid.iter().skip(METADATA_ROWS) {
        let name = cell(row, 0);
        // header lines may trail the QC block
        if name.is_empty() || name.contains(':') {
            continue;
        }
        let kind = classify_sample(name);
        if kind == SampleKind::Unrecognized {
            warn!(sample = name, "unrecognised QC sample name; row skipped");
            table.skipped_rows.push(name.to_string());
            continue;
        }
        let base = base_name(name, kind);
        let counter = occurrences.entry((kind, base.clone())).or_insert(0);
        let occurrence = *counter;
        *counter += 1;
        by_kind.entry(kind).or_default().push(SampleRow {
            name: name.to_string(),
            base,
            occurrence,
            cells: row,
        });
    }

    let blanks = by_kind.remove(&SampleKind::Blank).unwrap_or_default();
    let originals = by_kind
        .remove(&SampleKind::DuplicateOriginal)
        .unwrap_or_default();
    let copies = by_kind
        .remove(&SampleKind::DuplicateCopy)
        .unwrap_or_default();
    let measured = by_kind
        .remove(&SampleKind::CrmMeasured)
        .unwrap_or_default();
    let certified = by_kind
        .remove(&SampleKind::CrmCertified)
        .unwrap_or_default();

    build_crm(&measured, &certified, analytes, &mut table);
    build_duplicates(&originals, &copies, analytes, &mut table);
    for row in &blanks {
        for a in analytes {
            let measured = parse_cell(
                cell(row.cells, a.column),
                &row.name,
                &a.analyte,
                &mut table.unparsed_cells,
            );
            table.records.blanks.push(BlankRecord::new(
                row.name.clone(),
                row.occurrence,
                a.analyte.clone(),
                a.unit.clone(),
                measured,
                a.detection_limit,
            ));
        }
    }
    table
}

fn build_crm(
    measured: &[SampleRow<'_>],
    certified: &[SampleRow<'_>],
    analytes: &[AnalyteMeta],
    table: &mut SampleTable,
) {
    let mut used = vec![false; certified.len()];
    for m in measured {
        // Same run index first; otherwise the last certified row of the material.
        let cert_idx = certified
            .iter()
            .position(|c| c.base == m.base && c.occurrence == m.occurrence)
            .or_else(|| certified.iter().rposition(|c| c.base == m.base));
        if cert_idx.is_none() {
            warn!(sample = %m.name, "CRM has no certified row; recovery not applicable");
        }
        if let Some(i) = cert_idx {
            used[i] = true;
        }
        for a in analytes {
            let value = parse_cell(
                cell(m.cells, a.column),
                &m.name,
                &a.analyte,
                &mut table.unparsed_cells,
            );
            let cert_value = cert_idx.and_then(|i| {
                match MeasuredValue::parse(cell(certified[i].cells, a.column)) {
                    MeasuredValue::Detected(v) => Some(v),
                    _ => None,
                }
            });
            table.records.crm.push(CrmRecord::new(
                m.base.clone(),
                m.occurrence,
                a.analyte.clone(),
                a.unit.clone(),
                value,
                cert_value,
                a.detection_limit,
            ));
        }
    }
    for (c, used) in certified.iter().zip(used) {
        if !used {
            warn!(sample = %c.name, "certified row without a measured row; dropped");
        }
    }
}

fn build_duplicates(
    originals: &[SampleRow<'_>],
    copies: &[SampleRow<'_>],
    analytes: &[AnalyteMeta],
    table: &mut SampleTable,
) {
    let mut used = vec![false; copies.len()];
    for o in originals {
        let dup_idx = copies
            .iter()
            .position(|d| d.base == o.base && d.occurrence == o.occurrence);
        match dup_idx {
            Some(i) => used[i] = true,
            None => warn!(sample = %o.name, "duplicate original has no matching copy"),
        }
        push_pairs(
            &o.base,
            o.occurrence,
            Some(o),
            dup_idx.map(|i| &copies[i]),
            analytes,
            table,
        );
    }
    for (d, used) in copies.iter().zip(used) {
        if !used {
            warn!(sample = %d.name, "duplicate copy has no matching original");
            push_pairs(&d.base, d.occurrence, None, Some(d), analytes, table);
        }
    }
}

fn push_pairs(
    base: &str,
    occurrence: u32,
    original: Option<&SampleRow<'_>>,
    duplicate: Option<&SampleRow<'_>>,
    analytes: &[AnalyteMeta],
    table: &mut SampleTable,
) {
    for a in analytes {
        let mut side = |row: Option<&SampleRow<'_>>| match row {
            Some(r) => parse_cell(
                cell(r.cells, a.column),
                &r.name,
                &a.analyte,
                &mut table.unparsed_cells,
            ),
            None => MeasuredValue::Missing,
        };
        let orig = side(original);
        let dup = side(duplicate);
        table.records.duplicates.push(DuplicatePair::new(
            base,
            occurrence,
            a.analyte.clone(),
            a.unit.clone(),
            orig,
            dup,
            a.detection_limit,
        ));
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/samples.rs"]
mod tests;
