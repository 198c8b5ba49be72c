use thiserror::Error;

use crate::input::InputError;

/// Fatal errors. Per-record data problems never surface here; they become
/// NotApplicable rows.
#[derive(Debug, Error)]
pub enum QcError {
    #[error(
        "invalid BDL substitution rule '{0}' (use half, sqrt2, zero, dl or a non-negative number)"
    )]
    InvalidSubstitutionRule(String),
    #[error("invalid configuration: {setting} {message}")]
    ConfigurationInvalid {
        setting: &'static str,
        message: String,
    },
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QcError>;
