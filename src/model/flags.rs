use serde::Serialize;

/// Informational annotations. Flags never change a record's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Flag {
    BdlSubstituted,
    CertifiedBelowDl,
    CertifiedBelow10xDl,
    MeasuredBelowDl,
    Below10xDl,
    AboveDetectionLimit,
}

impl Flag {
    pub fn name(self) -> &'static str {
        match self {
            Flag::BdlSubstituted => "BDL_SUBSTITUTED",
            Flag::CertifiedBelowDl => "CERTIFIED_BELOW_DL",
            Flag::CertifiedBelow10xDl => "CERTIFIED_BELOW_10X_DL",
            Flag::MeasuredBelowDl => "MEASURED_BELOW_DL",
            Flag::Below10xDl => "BELOW_10X_DL",
            Flag::AboveDetectionLimit => "ABOVE_DL",
        }
    }
}

pub fn flag_order() -> &'static [Flag] {
    &[
        Flag::BdlSubstituted,
        Flag::CertifiedBelowDl,
        Flag::CertifiedBelow10xDl,
        Flag::MeasuredBelowDl,
        Flag::Below10xDl,
        Flag::AboveDetectionLimit,
    ]
}

pub fn ordered(flags: &[Flag]) -> Vec<Flag> {
    let mut out = Vec::with_capacity(flags.len());
    for flag in flag_order() {
        if flags.contains(flag) {
            out.push(*flag);
        }
    }
    out
}

pub fn format_flags(flags: &[Flag]) -> String {
    if flags.is_empty() {
        return String::new();
    }
    flags
        .iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(",")
}
