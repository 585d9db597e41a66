//! Default substitution and number formatting shared by every fragment.
//!
//! Absent values never fail a render: money falls back to `$0.00`, counts to
//! `0`, percentages to `0.00%`, free text to `-`.

pub const MISSING_TEXT: &str = "-";

pub const POSITIVE_CLASS: &str = "positive";
pub const NEGATIVE_CLASS: &str = "negative";

/// `$12500.50`, `$-42.10`
pub fn money(value: Option<f64>) -> String {
    format!("${:.2}", value.unwrap_or(0.0))
}

/// `+1.20%`, `-0.30%`
pub fn signed_percent(value: Option<f64>) -> String {
    format!("{:+.2}%", value.unwrap_or(0.0))
}

/// `-10.00%`
pub fn percent(value: Option<f64>) -> String {
    format!("{:.2}%", value.unwrap_or(0.0))
}

/// Win rates are shown as whole numbers: `63%`
pub fn whole_percent(value: Option<f64>) -> String {
    format!("{:.0}%", value.unwrap_or(0.0))
}

pub fn count(value: Option<u64>) -> String {
    value.unwrap_or(0).to_string()
}

/// Position sizes: four decimals
pub fn quantity(value: Option<f64>) -> String {
    format!("{:.4}", value.unwrap_or(0.0))
}

pub fn text(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => MISSING_TEXT.to_string(),
    }
}

/// Zero counts as positive.
pub fn trend_class(value: Option<f64>) -> &'static str {
    if value.unwrap_or(0.0) < 0.0 { NEGATIVE_CLASS } else { POSITIVE_CLASS }
}
