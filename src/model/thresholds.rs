use crate::error::QcError;
use crate::model::bdl::SubstitutionRule;
use crate::model::range::AcceptRange;

/// Evaluation tolerances for one run. Built once, validated, then passed
/// by reference into every evaluator.
#[derive(Debug, Clone, PartialEq)]
pub struct ToleranceConfig {
    /// Lower CRM recovery bound, percent.
    pub crm_low_tol: f64,
    /// Upper CRM recovery bound, percent.
    pub crm_high_tol: f64,
    /// Maximum duplicate RPD, percent.
    pub duplicate_rpd_tol: f64,
    /// Blank threshold as a multiple of the detection limit.
    pub blank_tol_factor: f64,
    pub bdl_sub_rule: SubstitutionRule,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            crm_low_tol: 80.0,
            crm_high_tol: 120.0,
            duplicate_rpd_tol: 30.0,
            blank_tol_factor: 3.0,
            bdl_sub_rule: SubstitutionRule::Half,
        }
    }
}

impl ToleranceConfig {
    pub fn validate(&self) -> Result<(), QcError> {
        let bounds = [
            ("crm_low_tol", self.crm_low_tol),
            ("crm_high_tol", self.crm_high_tol),
            ("duplicate_rpd_tol", self.duplicate_rpd_tol),
            ("blank_tol_factor", self.blank_tol_factor),
        ];
        for (setting, value) in bounds {
            if !value.is_finite() {
                return Err(QcError::ConfigurationInvalid {
                    setting,
                    message: format!("must be a finite number, got {value}"),
                });
            }
            if value < 0.0 {
                return Err(QcError::ConfigurationInvalid {
                    setting,
                    message: format!("must be non-negative, got {value}"),
                });
            }
        }
        if self.crm_low_tol >= self.crm_high_tol {
            return Err(QcError::ConfigurationInvalid {
                setting: "crm_low_tol",
                message: format!(
                    "must be below crm_high_tol ({} >= {})",
                    self.crm_low_tol, self.crm_high_tol
                ),
            });
        }
        Ok(())
    }

    pub fn crm_range(&self) -> AcceptRange {
        AcceptRange::Between {
            low: self.crm_low_tol,
            high: self.crm_high_tol,
        }
    }

    pub fn rpd_range(&self) -> AcceptRange {
        AcceptRange::AtMost(self.duplicate_rpd_tol)
    }

    pub fn blank_threshold(&self, detection_limit: f64) -> f64 {
        self.blank_tol_factor * detection_limit
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/thresholds.rs"]
mod tests;
