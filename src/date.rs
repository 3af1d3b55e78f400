use chrono::{DateTime, Datelike, Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static DAY_MONTH_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2})/(\d{2})/(\d{4})$").unwrap());
static MONTH_YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{2})/(\d{4})$").unwrap());
static ISO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap());

// Tried in order once the strict forms have failed.
const FALLBACK_FORMATS: [&str; 10] = [
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%Y-%m-%d %H:%M:%S",
];

/// Parses a milestone date string into a calendar day.
///
/// Strict forms are tried first (`DD/MM/YYYY`, `MM/YYYY`, `YYYY-MM-DD`), then a
/// handful of looser human formats. Returns `None` for anything unparseable,
/// including impossible days such as `31/02/2024`: no format rolls over.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(caps) = DAY_MONTH_YEAR_RE.captures(value) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    if let Some(caps) = MONTH_YEAR_RE.captures(value) {
        let month: u32 = caps[1].parse().ok()?;
        let year: i32 = caps[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1);
    }
    if let Some(caps) = ISO_RE.captures(value) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    parse_fallback(value)
}

fn parse_fallback(value: &str) -> Option<NaiveDate> {
    if let Ok(stamp) = DateTime::parse_from_rfc3339(value) {
        return Some(stamp.date_naive());
    }
    for format in FALLBACK_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }
    // "March 2024" / "Mar 2024": first of the month.
    let with_day = format!("1 {value}");
    for format in ["%d %B %Y", "%d %b %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&with_day, format) {
            return Some(date);
        }
    }
    None
}

/// Formats a day as zero-padded `DD/MM/YYYY`, the format drag commits use.
pub fn format_date(date: NaiveDate) -> String {
    format!("{:02}/{:02}/{:04}", date.day(), date.month(), date.year())
}

/// Day number used by the time scale.
pub fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Inverse of [`day_number`]; fractional days floor to the containing day.
pub fn from_day_number(value: f64) -> Option<NaiveDate> {
    if !value.is_finite() || value.abs() > i32::MAX as f64 {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(value.floor() as i32)
}

/// Every first-of-month within `[min, max]`, ascending.
pub fn month_starts(min: NaiveDate, max: NaiveDate) -> Vec<NaiveDate> {
    let mut months = Vec::new();
    if max < min {
        return months;
    }
    let mut cursor = match min.with_day(1) {
        Some(first) if first == min => first,
        Some(first) => match first.checked_add_months(Months::new(1)) {
            Some(next) => next,
            None => return months,
        },
        None => return months,
    };
    while cursor <= max {
        months.push(cursor);
        match cursor.checked_add_months(Months::new(1)) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    months
}
