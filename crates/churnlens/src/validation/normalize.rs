use std::sync::LazyLock;

use regex::Regex;

const NULL_TOKENS: &[&str] = &["n/a", "na", "-", "null", "none", "unknown"];

static LEADING_FLOAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?(\d+\.?\d*|\.\d+)").expect("valid float prefix regex"));

/// Best-effort conversion of a free-text money or number cell.
///
/// Currency symbols, thousands separators and other decoration are
/// stripped. Only the first decimal point is kept; digits after later
/// points are appended to the fraction (`"12.3.4"` is `12.34`).
pub fn normalize_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lowered = trimmed.to_lowercase();
    if NULL_TOKENS.contains(&lowered.as_str()) {
        return None;
    }

    if let Ok(value) = trimmed.parse::<f64>() {
        if value.is_finite() {
            return Some(value);
        }
    }

    let stripped: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    let cleaned = match stripped.split_once('.') {
        Some((whole, rest)) => format!("{}.{}", whole, rest.replace('.', "")),
        None => stripped,
    };

    LEADING_FLOAT
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Renders a normalized value the way it is written back into the dataset.
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}
