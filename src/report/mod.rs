pub mod context;
pub mod json;
pub mod text;

pub fn format_f64(v: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, v)
}

/// Fixed-precision cell; missing values are empty.
pub fn format_opt(v: Option<f64>, decimals: usize) -> String {
    match v {
        Some(v) if v.is_finite() => format_f64(v, decimals),
        _ => String::new(),
    }
}

pub fn format_pct(fraction: Option<f64>) -> String {
    match fraction {
        Some(f) => format!("{:.1}%", f * 100.0),
        None => "n/a".to_string(),
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation with an n-1 denominator. `None` for fewer than
/// two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
