//! Tolerance configuration: JSON file values layered under CLI flags.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::QcError;
use crate::model::bdl::SubstitutionRule;
use crate::model::thresholds::ToleranceConfig;

/// `"half"` or a fixed number such as `0.005`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RuleSetting {
    Fixed(f64),
    Named(String),
}

impl RuleSetting {
    pub fn to_rule(&self) -> Result<SubstitutionRule, QcError> {
        match self {
            RuleSetting::Fixed(v) => {
                if v.is_finite() && *v >= 0.0 {
                    Ok(SubstitutionRule::Fixed(*v))
                } else {
                    Err(QcError::InvalidSubstitutionRule(v.to_string()))
                }
            }
            RuleSetting::Named(name) => name.parse(),
        }
    }
}

/// Partial tolerance settings. Unset fields keep the lower layer's value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToleranceOverrides {
    pub crm_low_tol: Option<f64>,
    pub crm_high_tol: Option<f64>,
    pub duplicate_rpd_tol: Option<f64>,
    pub blank_tol_factor: Option<f64>,
    pub bdl_sub_rule: Option<RuleSetting>,
}

impl ToleranceOverrides {
    /// `top` wins field by field.
    pub fn layered(self, top: ToleranceOverrides) -> ToleranceOverrides {
        ToleranceOverrides {
            crm_low_tol: top.crm_low_tol.or(self.crm_low_tol),
            crm_high_tol: top.crm_high_tol.or(self.crm_high_tol),
            duplicate_rpd_tol: top.duplicate_rpd_tol.or(self.duplicate_rpd_tol),
            blank_tol_factor: top.blank_tol_factor.or(self.blank_tol_factor),
            bdl_sub_rule: top.bdl_sub_rule.or(self.bdl_sub_rule),
        }
    }

    /// Apply over the defaults and validate.
    pub fn into_config(self) -> Result<ToleranceConfig, QcError> {
        let mut config = ToleranceConfig::default();
        if let Some(v) = self.crm_low_tol {
            config.crm_low_tol = v;
        }
        if let Some(v) = self.crm_high_tol {
            config.crm_high_tol = v;
        }
        if let Some(v) = self.duplicate_rpd_tol {
            config.duplicate_rpd_tol = v;
        }
        if let Some(v) = self.blank_tol_factor {
            config.blank_tol_factor = v;
        }
        if let Some(rule) = &self.bdl_sub_rule {
            config.bdl_sub_rule = rule.to_rule()?;
        }
        config.validate()?;
        debug!(?config, "tolerance configuration resolved");
        Ok(config)
    }
}

pub fn load_overrides(path: &Path) -> Result<ToleranceOverrides, QcError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
#[path = "../tests/src_inline/config.rs"]
mod tests;
