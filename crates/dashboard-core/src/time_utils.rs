//! Lenient date and timestamp parsing for activity exports.
//!
//! Exports come from machines with different locale settings, so the same
//! column may hold `03/04/2024`, `2024-04-03 09:15:00` or `3 Apr 2024`.
//! Numeric dates are resolved with a preferred field order
//! ([`DateOrder`]); when the preferred reading is not a valid calendar date
//! the swapped reading is tried before giving up.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use tracing::debug;

// ── DateOrder ─────────────────────────────────────────────────────────────────

/// Preferred interpretation of the two leading fields of a numeric date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    /// `03/04/2024` is 3 April.
    DayFirst,
    /// `03/04/2024` is March 4.
    MonthFirst,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Parse the primary `Date` column: day-first, time-of-day discarded.
pub fn parse_date_day_first(s: &str) -> Option<NaiveDate> {
    parse_datetime(s, DateOrder::DayFirst).map(|dt| dt.date())
}

/// Parse the secondary `WrittenAt` column with the default month-first order.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    parse_datetime(s, DateOrder::MonthFirst)
}

/// Parse a date or date-time string.
///
/// Date-only inputs resolve to midnight.  Explicit UTC offsets are accepted
/// but the local wall-clock reading is kept, so the hour of day reflects the
/// time written on the originating machine.
///
/// Returns `None` for empty strings, null markers (`NaN`, `NaT`, `null`) and
/// anything that is not a valid calendar date.
pub fn parse_datetime(s: &str, order: DateOrder) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() || is_null_marker(trimmed) {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local());
    }

    if let Some(dt) = parse_numeric(trimmed, order) {
        return Some(dt);
    }

    if let Some(dt) = parse_named_month(trimmed) {
        return Some(dt);
    }

    debug!("could not parse date-like value \"{}\"", trimmed);
    None
}

/// Expand a two-digit year the way `strptime`'s `%y` does: `69..=99` map to
/// the 1900s, `00..=68` to the 2000s.
pub fn expand_two_digit_year(year: i32) -> i32 {
    if year >= 69 {
        1900 + year
    } else {
        2000 + year
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn is_null_marker(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "nan" | "nat" | "null" | "none" | "n/a"
    )
}

fn numeric_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?x)
            ^(\d{1,4})[-/.](\d{1,2})[-/.](\d{1,4})
            (?:[T\s]+(\d{1,2}):(\d{2})(?::(\d{2})(?:[.,](\d{1,9}))?)?\s*([AaPp][Mm])?)?
            \s*(?:Z|[+-]\d{2}:?\d{2})?$",
        )
        .expect("regex is valid")
    })
}

/// Parse `a/b/c` style dates (any of `-`, `/`, `.` as separators) with an
/// optional time part.
fn parse_numeric(s: &str, order: DateOrder) -> Option<NaiveDateTime> {
    let caps = numeric_pattern().captures(s)?;

    let first = caps.get(1)?.as_str();
    let second: u32 = caps.get(2)?.as_str().parse().ok()?;
    let third = caps.get(3)?.as_str();

    let date = if first.len() == 4 {
        // Year-first (ISO-like) dates are unambiguous regardless of order.
        if third.len() > 2 {
            return None;
        }
        let year: i32 = first.parse().ok()?;
        let day: u32 = third.parse().ok()?;
        NaiveDate::from_ymd_opt(year, second, day)?
    } else {
        let year = match third.len() {
            4 => third.parse().ok()?,
            1 | 2 => expand_two_digit_year(third.parse().ok()?),
            _ => return None,
        };
        let lead: u32 = first.parse().ok()?;
        let (day, month) = match order {
            DateOrder::DayFirst => (lead, second),
            DateOrder::MonthFirst => (second, lead),
        };
        NaiveDate::from_ymd_opt(year, month, day)
            .or_else(|| NaiveDate::from_ymd_opt(year, day, month))?
    };

    let time = match caps.get(4) {
        None => NaiveTime::MIN,
        Some(hour) => {
            let mut hour: u32 = hour.as_str().parse().ok()?;
            let minute: u32 = caps.get(5)?.as_str().parse().ok()?;
            let second: u32 = caps
                .get(6)
                .map(|m| m.as_str().parse())
                .transpose()
                .ok()?
                .unwrap_or(0);
            let nanos = caps.get(7).map(|m| fraction_to_nanos(m.as_str())).unwrap_or(0);

            if let Some(meridiem) = caps.get(8) {
                if hour == 0 || hour > 12 {
                    return None;
                }
                let pm = meridiem.as_str().eq_ignore_ascii_case("pm");
                hour = match (pm, hour) {
                    (false, 12) => 0,
                    (true, 12) => 12,
                    (true, h) => h + 12,
                    (false, h) => h,
                };
            }
            NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)?
        }
    };

    Some(date.and_time(time))
}

/// Convert a fractional-seconds digit string (1–9 digits) to nanoseconds.
fn fraction_to_nanos(digits: &str) -> u32 {
    let padded = format!("{:0<9}", digits);
    padded[..9].parse().unwrap_or(0)
}

/// Parse dates that spell the month out, e.g. `3 Apr 2024` or `April 3, 2024 14:05`.
fn parse_named_month(s: &str) -> Option<NaiveDateTime> {
    const DATETIME_FMTS: &[&str] = &[
        "%d %b %Y %H:%M:%S",
        "%d %b %Y %H:%M",
        "%d %B %Y %H:%M:%S",
        "%d %B %Y %H:%M",
        "%b %d %Y %H:%M:%S",
        "%B %d %Y %H:%M:%S",
        "%b %d, %Y %H:%M:%S",
        "%B %d, %Y %H:%M:%S",
        "%d-%b-%Y %H:%M:%S",
    ];
    const DATE_FMTS: &[&str] = &[
        "%d %b %Y",
        "%d %B %Y",
        "%b %d %Y",
        "%B %d %Y",
        "%b %d, %Y",
        "%B %d, %Y",
        "%d-%b-%Y",
        "%d-%b-%y",
    ];

    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }
    None
}

// ── Tests ─────────────────────────────────────────────────────────────────────
