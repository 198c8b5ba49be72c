use std::fmt;
use std::str::FromStr;

use crate::error::QcError;

/// A reported assay cell after parsing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeasuredValue {
    Detected(f64),
    /// Reported as "<DL".
    Censored,
    Missing,
}

impl MeasuredValue {
    /// Parse a certificate cell. `>x` over-range qualifiers and non-numeric
    /// text are treated as missing.
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();
        if s.is_empty() {
            return MeasuredValue::Missing;
        }
        if s.starts_with('<') {
            return MeasuredValue::Censored;
        }
        match s.parse::<f64>() {
            Ok(v) if v.is_finite() => MeasuredValue::Detected(v),
            _ => MeasuredValue::Missing,
        }
    }

    pub fn is_censored(self) -> bool {
        matches!(self, MeasuredValue::Censored)
    }

    pub fn is_missing(self) -> bool {
        matches!(self, MeasuredValue::Missing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SubstitutionRule {
    Half,
    Sqrt2,
    Zero,
    Dl,
    Fixed(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    pub value: f64,
    pub substituted: bool,
}

impl SubstitutionRule {
    /// Replacement value for a censored reading. `None` when the rule needs
    /// a detection limit and none is known.
    pub fn substitute(self, dl: Option<f64>) -> Option<f64> {
        match self {
            SubstitutionRule::Half => dl.map(|dl| dl / 2.0),
            SubstitutionRule::Sqrt2 => dl.map(|dl| dl / std::f64::consts::SQRT_2),
            SubstitutionRule::Zero => Some(0.0),
            SubstitutionRule::Dl => dl,
            SubstitutionRule::Fixed(v) => Some(v),
        }
    }

    pub fn resolve(self, value: MeasuredValue, dl: Option<f64>) -> Option<Resolved> {
        match value {
            MeasuredValue::Detected(v) => Some(Resolved {
                value: v,
                substituted: false,
            }),
            MeasuredValue::Censored => self.substitute(dl).map(|v| Resolved {
                value: v,
                substituted: true,
            }),
            MeasuredValue::Missing => None,
        }
    }
}

impl FromStr for SubstitutionRule {
    type Err = QcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rule = s.trim().to_ascii_lowercase();
        match rule.as_str() {
            "half" => Ok(SubstitutionRule::Half),
            "sqrt2" => Ok(SubstitutionRule::Sqrt2),
            "zero" => Ok(SubstitutionRule::Zero),
            "dl" => Ok(SubstitutionRule::Dl),
            other => match other.parse::<f64>() {
                Ok(v) if v.is_finite() && v >= 0.0 => Ok(SubstitutionRule::Fixed(v)),
                _ => Err(QcError::InvalidSubstitutionRule(s.trim().to_string())),
            },
        }
    }
}

impl fmt::Display for SubstitutionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubstitutionRule::Half => f.write_str("half"),
            SubstitutionRule::Sqrt2 => f.write_str("sqrt2"),
            SubstitutionRule::Zero => f.write_str("zero"),
            SubstitutionRule::Dl => f.write_str("dl"),
            SubstitutionRule::Fixed(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/bdl.rs"]
mod tests;
