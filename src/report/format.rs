//! Display formatting for report figures.
//!
//! Missing values render as an empty string. Negative values keep their
//! leading `-`, which the table renderer picks up as the negative marker.

/// Format a number with thousands separators and exactly `decimals` decimals.
///
/// ```
/// use report_oxide::report::format_number;
///
/// assert_eq!(format_number(Some(1234567.891), 1), "1,234,567.9");
/// assert_eq!(format_number(Some(-1200.0), 0), "-1,200");
/// assert_eq!(format_number(None, 2), "");
/// ```
pub fn format_number(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => group_thousands(v, decimals),
        _ => String::new(),
    }
}

/// Format a currency amount: `$` followed by [`format_number`].
pub fn format_currency(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("${}", group_thousands(v, decimals)),
        _ => String::new(),
    }
}

/// Format a ratio as a whole percentage, `0.125` → `"13%"`.
///
/// Halves round away from zero.
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => {
            let percent = (v * 100.0).round();
            // -0.4% rounds to "-0%" otherwise
            let percent = if percent == 0.0 { 0.0 } else { percent };
            format!("{}%", percent as i64)
        },
        _ => String::new(),
    }
}

fn group_thousands(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(fixed.len() + integer.len() / 3 + 1);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }

    let is_zero = fixed.bytes().all(|b| b == b'0' || b == b'.');
    if value < 0.0 && !is_zero {
        grouped.insert(0, '-');
    }
    grouped
}
