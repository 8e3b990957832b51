//! Number formatting shared by the report and TUI layers.

/// Format a number with thousands separators and a fixed number of decimals.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    let negative = value < 0.0;
    let factor = 10_f64.powi(decimals as i32);
    let scaled = (value.abs() * factor).round();

    let integer_part = (scaled / factor).trunc() as u64;
    let frac_digits = (scaled - (integer_part as f64) * factor).round() as u64;

    let grouped = group_thousands(&integer_part.to_string());
    let body = if decimals == 0 {
        grouped
    } else {
        format!(
            "{}.{:0width$}",
            grouped,
            frac_digits,
            width = decimals as usize
        )
    };

    // "-0" is not a useful rendering of a value that rounded to zero.
    if negative && scaled > 0.0 {
        format!("-{}", body)
    } else {
        body
    }
}

/// Format a minutes total compactly: whole values without decimals, other
/// values with one decimal place.
///
/// ```
/// use dashboard_core::formatting::format_minutes;
///
/// assert_eq!(format_minutes(40.0), "40");
/// assert_eq!(format_minutes(2.25), "2.3");
/// assert_eq!(format_minutes(1500.0), "1,500");
/// ```
pub fn format_minutes(minutes: f64) -> String {
    if minutes.fract() == 0.0 {
        format_number(minutes, 0)
    } else {
        format_number(minutes, 1)
    }
}

/// Calculate `(part / whole) * 100`, rounded to `decimal_places`.
///
/// Returns `0.0` if `whole` is zero.
///
/// ```
/// use dashboard_core::formatting::percentage;
///
/// assert!((percentage(50.0, 200.0, 1) - 25.0).abs() < 1e-9);
/// assert_eq!(percentage(0.0, 0.0, 2), 0.0);
/// ```
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let raw = (part / whole) * 100.0;
    let factor = 10_f64.powi(decimal_places as i32);
    (raw * factor).round() / factor
}

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + s.len() / 3);
    for (i, ch) in s.chars().enumerate() {
        if i != 0 && (s.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────
