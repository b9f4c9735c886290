//! PDF date parsing
//!
//! Dates in the Info dictionary are text strings of the form
//! `D:YYYYMMDDHHmmSSOHH'mm'`. Everything after the year is optional and real
//! producers frequently drop the `D:` prefix or the trailing apostrophe, so the
//! parser accepts those variants as well.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};

/// Parse a PDF date string into a timestamp with its UTC offset
///
/// Missing fields default to the earliest valid value (January, day 1, midnight, UTC).
/// Returns `None` for anything that is not a well-formed date.
///
/// Supported forms:
/// - `"D:2024"` → 2024-01-01T00:00:00Z
/// - `"D:20241120153000"` → 2024-11-20T15:30:00Z
/// - `"D:20241120153000+02'00'"` → 2024-11-20T15:30:00+02:00
/// - `"20241120153000-05'30"` → 2024-11-20T15:30:00-05:30
pub fn parse_pdf_date(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    let text = text.strip_prefix("D:").unwrap_or(text);

    let digits_end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let (digits, zone) = text.split_at(digits_end);

    if digits.len() < 4 || digits.len() % 2 != 0 || digits.len() > 14 {
        return None;
    }

    let field = |start: usize, default: u32| -> Option<u32> {
        match digits.get(start..start + 2) {
            Some(s) => s.parse().ok(),
            None => Some(default),
        }
    };

    let year: i32 = digits[0..4].parse().ok()?;
    let month = field(4, 1)?;
    let day = field(6, 1)?;
    let hour = field(8, 0)?;
    let minute = field(10, 0)?;
    let second = field(12, 0)?;

    let offset = parse_zone(zone)?;
    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;

    offset.from_local_datetime(&naive).single()
}

/// Parse the `OHH'mm'` suffix; an empty suffix means UTC
fn parse_zone(zone: &str) -> Option<FixedOffset> {
    let mut chars = zone.chars();
    let sign = match chars.next() {
        None | Some('Z') | Some('z') => return FixedOffset::east_opt(0),
        Some('+') => 1,
        Some('-') => -1,
        Some(_) => return None,
    };

    let rest: String = chars.filter(|c| *c != '\'').collect();
    if rest.is_empty() {
        return FixedOffset::east_opt(0);
    }
    if !rest.chars().all(|c| c.is_ascii_digit()) || rest.len() > 4 {
        return None;
    }

    let hours: i32 = rest.get(0..2).unwrap_or(&rest).parse().ok()?;
    let minutes: i32 = match rest.get(2..) {
        Some(m) if !m.is_empty() => m.parse().ok()?,
        _ => 0,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Format a timestamp in the standard format: "Month day, year HH:MM"
/// Example: "November 20, 2024 15:30"
pub fn format_date(date: &DateTime<FixedOffset>) -> String {
    date.format("%B %-d, %Y %H:%M").to_string()
}
