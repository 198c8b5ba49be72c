use crate::model::bdl::MeasuredValue;
use crate::model::status::RequiredField;

/// Certified reference material run for one analyte.
#[derive(Debug, Clone, PartialEq)]
pub struct CrmRecord {
    pub sample_id: String,
    pub run: u32,
    pub analyte: String,
    pub unit: String,
    pub measured: MeasuredValue,
    pub certified: Option<f64>,
    pub detection_limit: Option<f64>,
}

/// Original/duplicate pair for one analyte.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicatePair {
    pub sample_id: String,
    pub run: u32,
    pub analyte: String,
    pub unit: String,
    pub original: MeasuredValue,
    pub duplicate: MeasuredValue,
    pub detection_limit: Option<f64>,
}

/// Method blank reading for one analyte.
#[derive(Debug, Clone, PartialEq)]
pub struct BlankRecord {
    pub sample_id: String,
    pub run: u32,
    pub analyte: String,
    pub unit: String,
    pub measured: MeasuredValue,
    pub detection_limit: Option<f64>,
}

/// Non-finite or negative limits are not usable.
fn clean_limit(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite() && *x >= 0.0)
}

fn clean_value(v: MeasuredValue) -> MeasuredValue {
    match v {
        MeasuredValue::Detected(x) if !x.is_finite() => MeasuredValue::Missing,
        other => other,
    }
}

impl CrmRecord {
    pub fn new(
        sample_id: impl Into<String>,
        run: u32,
        analyte: impl Into<String>,
        unit: impl Into<String>,
        measured: MeasuredValue,
        certified: Option<f64>,
        detection_limit: Option<f64>,
    ) -> Self {
        Self {
            sample_id: sample_id.into(),
            run,
            analyte: analyte.into(),
            unit: unit.into(),
            measured: clean_value(measured),
            certified: certified.filter(|c| c.is_finite()),
            detection_limit: clean_limit(detection_limit),
        }
    }

    /// First field preventing evaluation, in evaluation order.
    pub fn missing_field(&self) -> Option<RequiredField> {
        if self.certified.is_none() {
            return Some(RequiredField::CertifiedValue);
        }
        if self.measured.is_missing() {
            return Some(RequiredField::MeasuredValue);
        }
        None
    }
}

impl DuplicatePair {
    pub fn new(
        sample_id: impl Into<String>,
        run: u32,
        analyte: impl Into<String>,
        unit: impl Into<String>,
        original: MeasuredValue,
        duplicate: MeasuredValue,
        detection_limit: Option<f64>,
    ) -> Self {
        Self {
            sample_id: sample_id.into(),
            run,
            analyte: analyte.into(),
            unit: unit.into(),
            original: clean_value(original),
            duplicate: clean_value(duplicate),
            detection_limit: clean_limit(detection_limit),
        }
    }

    pub fn missing_field(&self) -> Option<RequiredField> {
        if self.original.is_missing() {
            return Some(RequiredField::OriginalValue);
        }
        if self.duplicate.is_missing() {
            return Some(RequiredField::DuplicateValue);
        }
        None
    }

    pub fn both_censored(&self) -> bool {
        self.original.is_censored() && self.duplicate.is_censored()
    }
}

impl BlankRecord {
    pub fn new(
        sample_id: impl Into<String>,
        run: u32,
        analyte: impl Into<String>,
        unit: impl Into<String>,
        measured: MeasuredValue,
        detection_limit: Option<f64>,
    ) -> Self {
        Self {
            sample_id: sample_id.into(),
            run,
            analyte: analyte.into(),
            unit: unit.into(),
            measured: clean_value(measured),
            detection_limit: clean_limit(detection_limit),
        }
    }

    pub fn missing_field(&self) -> Option<RequiredField> {
        if self.measured.is_missing() {
            return Some(RequiredField::MeasuredValue);
        }
        if self.detection_limit.is_none() {
            return Some(RequiredField::DetectionLimit);
        }
        None
    }
}

/// Typed QC records parsed from one certificate, in input order.
#[derive(Debug, Clone, Default)]
pub struct QcRecords {
    pub crm: Vec<CrmRecord>,
    pub duplicates: Vec<DuplicatePair>,
    pub blanks: Vec<BlankRecord>,
}

impl QcRecords {
    pub fn is_empty(&self) -> bool {
        self.crm.is_empty() && self.duplicates.is_empty() && self.blanks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.crm.len() + self.duplicates.len() + self.blanks.len()
    }
}
