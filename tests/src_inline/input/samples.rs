use super::*;
use crate::model::bdl::MeasuredValue;

fn meta_rows() -> Vec<Vec<String>> {
    let rows: [&[&str]; 6] = [
        &["Report Number: T"],
        &["Report Date: D"],
        &["Analyte Symbol", "Cu"],
        &["Unit Symbol", "ppm"],
        &["Detection Limit", "0.5"],
        &["Analysis Method", "AR-ICPMS"],
    ];
    rows.iter()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect()
}

fn analytes() -> Vec<AnalyteMeta> {
    vec![AnalyteMeta {
        column: 1,
        analyte: "Cu".to_string(),
        unit: "ppm".to_string(),
        detection_limit: Some(0.5),
        method: "AR-ICPMS".to_string(),
    }]
}

fn grid(qc: &[(&str, &str)]) -> Vec<Vec<String>> {
    let mut g = meta_rows();
    for (name, value) in qc {
        g.push(vec![name.to_string(), value.to_string()]);
    }
    g
}

#[test]
fn test_classify_sample_names() {
    assert_eq!(classify_sample("Method Blank"), SampleKind::Blank);
    assert_eq!(classify_sample("blk 2"), SampleKind::Blank);
    assert_eq!(classify_sample("S-1 Orig"), SampleKind::DuplicateOriginal);
    assert_eq!(classify_sample("S-1 DUP"), SampleKind::DuplicateCopy);
    assert_eq!(classify_sample("S-1DUP"), SampleKind::DuplicateCopy);
    assert_eq!(classify_sample("OREAS 45e Meas"), SampleKind::CrmMeasured);
    assert_eq!(classify_sample("OREAS 45e Cert"), SampleKind::CrmCertified);
    assert_eq!(classify_sample("Core 17"), SampleKind::Unrecognized);
    assert_eq!(classify_sample(""), SampleKind::Unrecognized);
}

#[test]
fn test_base_name_strips_marker() {
    assert_eq!(base_name("OREAS 45e Meas", SampleKind::CrmMeasured), "OREAS 45e");
    assert_eq!(base_name("OREAS 45e Cert", SampleKind::CrmCertified), "OREAS 45e");
    assert_eq!(base_name("S-1 Orig", SampleKind::DuplicateOriginal), "S-1");
    assert_eq!(base_name("S-1DUP", SampleKind::DuplicateCopy), "S-1");
    assert_eq!(base_name(" Blank 1 ", SampleKind::Blank), "Blank 1");
}

#[test]
fn test_duplicates_pair_by_occurrence() {
    let g = grid(&[
        ("S-1 Orig", "10"),
        ("S-1 Orig", "20"),
        ("S-1 Dup", "11"),
        ("S-1 Dup", "21"),
    ]);
    let table = build_records(&g, &analytes());
    let dups = &table.records.duplicates;
    assert_eq!(dups.len(), 2);
    assert_eq!(dups[0].run, 0);
    assert_eq!(dups[0].original, MeasuredValue::Detected(10.0));
    assert_eq!(dups[0].duplicate, MeasuredValue::Detected(11.0));
    assert_eq!(dups[1].run, 1);
    assert_eq!(dups[1].duplicate, MeasuredValue::Detected(21.0));
}

#[test]
fn test_unpaired_rows() {
    let g = grid(&[
        ("S-1 Orig", "10"),
        ("S-2 Dup", "5"),
        ("GBM 908 Cert", "100"),
        ("OREAS 45e Meas", "85"),
    ]);
    let table = build_records(&g, &analytes());
    let dups = &table.records.duplicates;
    assert_eq!(dups.len(), 2);
    assert_eq!(dups[0].sample_id, "S-1");
    assert_eq!(dups[0].duplicate, MeasuredValue::Missing);
    assert_eq!(dups[1].sample_id, "S-2");
    assert_eq!(dups[1].original, MeasuredValue::Missing);

    let crm = &table.records.crm;
    assert_eq!(crm.len(), 1);
    assert_eq!(crm[0].sample_id, "OREAS 45e");
    assert_eq!(crm[0].certified, None);
}

#[test]
fn test_non_numeric_cells_are_counted() {
    let g = grid(&[("Blank", "n.a."), ("Blank", ">500"), ("Blank", "<0.5"), ("Blank", "")]);
    let table = build_records(&g, &analytes());
    let blanks = &table.records.blanks;
    assert_eq!(blanks.len(), 4);
    assert_eq!(blanks[2].measured, MeasuredValue::Censored);
    assert_eq!(blanks[3].measured, MeasuredValue::Missing);
    assert_eq!(blanks[3].run, 3);
    assert_eq!(table.unparsed_cells, 2);
}
