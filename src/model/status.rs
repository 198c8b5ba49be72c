use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QcStatus {
    Pass,
    Fail,
    NotApplicable,
}

impl QcStatus {
    pub fn name(self) -> &'static str {
        match self {
            QcStatus::Pass => "Pass",
            QcStatus::Fail => "Fail",
            QcStatus::NotApplicable => "NotApplicable",
        }
    }
}

/// Field a record needs for its category's evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RequiredField {
    MeasuredValue,
    CertifiedValue,
    OriginalValue,
    DuplicateValue,
    DetectionLimit,
}

impl RequiredField {
    pub fn name(self) -> &'static str {
        match self {
            RequiredField::MeasuredValue => "measured value",
            RequiredField::CertifiedValue => "certified value",
            RequiredField::OriginalValue => "original value",
            RequiredField::DuplicateValue => "duplicate value",
            RequiredField::DetectionLimit => "detection limit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Degenerate {
    ZeroCertifiedValue,
    ZeroPairMean,
}

/// Why a record was classified NotApplicable. Per-record data problems are
/// absorbed here instead of being raised as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NaReason {
    MissingRequiredField(RequiredField),
    DegenerateArithmetic(Degenerate),
    BelowDetection,
}

impl NaReason {
    pub fn describe(self) -> String {
        match self {
            NaReason::MissingRequiredField(field) => format!("missing {}", field.name()),
            NaReason::DegenerateArithmetic(Degenerate::ZeroCertifiedValue) => {
                "certified value is zero".to_string()
            }
            NaReason::DegenerateArithmetic(Degenerate::ZeroPairMean) => {
                "duplicate pair mean is zero".to_string()
            }
            NaReason::BelowDetection => "both values below detection limit".to_string(),
        }
    }
}
