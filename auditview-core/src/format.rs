//! Display formatting by semantic type.
//!
//! All functions here are pure. Anything time-relative takes `now` explicitly
//! so callers (and tests) decide the reference instant.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::models::SemanticType;

/// Placeholder for absent values
pub const EMPTY: &str = "-";

const NANOS_PER_MILLI: f64 = 1_000_000.0;
const MINUTES_IN_DAY: i64 = 1_440;
const MINUTES_IN_ALMOST_TWO_DAYS: i64 = 2_520;
const MINUTES_IN_MONTH: i64 = 43_200;
const MINUTES_IN_TWO_MONTHS: i64 = 86_400;

pub(crate) fn date_like() -> &'static Regex {
    static DATE_LIKE: OnceLock<Regex> = OnceLock::new();
    DATE_LIKE.get_or_init(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("valid regex"))
}

/// Format a raw value for display according to its column type
pub fn format(value: &Value, semantic_type: SemanticType, now: DateTime<Utc>) -> String {
    if value.is_null() {
        return EMPTY.to_string();
    }

    match semantic_type {
        SemanticType::Datetime => match value {
            Value::String(raw) if date_like().is_match(raw) => format_date(raw, now),
            other => stringify(other),
        },
        SemanticType::Boolean => yes_no(is_truthy(value)).to_string(),
        SemanticType::Number => match value.as_f64() {
            Some(n) => format_number(n),
            None => stringify(value),
        },
        SemanticType::Duration => match value.as_f64() {
            Some(ns) => format_duration_ns(ns),
            None => stringify(value),
        },
        SemanticType::String => stringify(value),
    }
}

/// Plain string form: strings bare, integral numbers without a fraction,
/// everything else as JSON
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => EMPTY.to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

pub const fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Loose truthiness: `false`, `0`, `""` and null are false
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Parse an RFC 3339 timestamp, a naive `YYYY-MM-DDTHH:MM:SS[.f]` (read as
/// UTC) or a bare `YYYY-MM-DD` (midnight UTC)
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Relative time with suffix ("3 days ago", "in about 2 hours").
/// Unparseable input passes through unchanged.
pub fn format_date(raw: &str, now: DateTime<Utc>) -> String {
    parse_datetime(raw).map_or_else(|| raw.to_string(), |at| relative_time(at, now))
}

/// Relative time with suffix
pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let distance = distance_words(at, now);
    if at > now {
        format!("in {distance}")
    } else {
        format!("{distance} ago")
    }
}

/// Relative time without suffix ("3 days")
pub fn distance_words(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let (earlier, later) = if at <= now { (at, now) } else { (now, at) };
    let seconds = (later - earlier).num_seconds();
    let minutes = (seconds as f64 / 60.0).round() as i64;

    if minutes < 2 {
        return if minutes == 0 {
            "less than a minute".to_string()
        } else {
            "1 minute".to_string()
        };
    }
    if minutes < 45 {
        return format!("{minutes} minutes");
    }
    if minutes < 90 {
        return "about 1 hour".to_string();
    }
    if minutes < MINUTES_IN_DAY {
        let hours = (minutes as f64 / 60.0).round() as i64;
        return format!("about {hours} hours");
    }
    if minutes < MINUTES_IN_ALMOST_TWO_DAYS {
        return "1 day".to_string();
    }
    if minutes < MINUTES_IN_MONTH {
        let days = (minutes as f64 / MINUTES_IN_DAY as f64).round() as i64;
        return format!("{days} days");
    }
    if minutes < MINUTES_IN_TWO_MONTHS {
        let months = (minutes as f64 / MINUTES_IN_MONTH as f64).round() as i64;
        return plural_about(months, "month");
    }

    let months = calendar_months_between(earlier, later);
    if months < 12 {
        let nearest = (minutes as f64 / MINUTES_IN_MONTH as f64).round() as i64;
        return plural(nearest, "month");
    }

    let years = months / 12;
    match months % 12 {
        0..=2 => plural_about(years, "year"),
        3..=8 => format!("over {}", plural(years, "year")),
        _ => format!("almost {}", plural(years + 1, "year")),
    }
}

fn calendar_months_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    let mut months = i64::from(later.year() - earlier.year()) * 12
        + i64::from(later.month()) - i64::from(earlier.month());
    let later_rest = (later.day(), later.num_seconds_from_midnight());
    let earlier_rest = (earlier.day(), earlier.num_seconds_from_midnight());
    if months > 0 && later_rest < earlier_rest {
        months -= 1;
    }
    months
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

fn plural_about(count: i64, unit: &str) -> String {
    format!("about {}", plural(count, unit))
}

/// en-US grouped number with at most three fraction digits
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "∞".to_string() } else { "-∞".to_string() };
    }

    let abs = n.abs();
    let scaled = (abs * 1000.0).round();
    let (int_digits, fraction) = if scaled < 9.0e18 {
        let scaled = scaled as u64;
        (
            (scaled / 1000).to_string(),
            format!("{:03}", scaled % 1000).trim_end_matches('0').to_string(),
        )
    } else {
        (format!("{abs:.0}"), String::new())
    };

    let is_zero = int_digits.chars().all(|c| c == '0') && fraction.is_empty();
    let sign = if n < 0.0 && !is_zero { "-" } else { "" };
    let grouped = group_thousands(&int_digits);
    if fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction}")
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Human duration from nanoseconds, e.g. `"2 hours 3 minutes"`.
///
/// Components are calendar fields measured from the Unix epoch and truncate,
/// so 7.5 s reads as "7 seconds". Empty, negative and sub-second durations
/// read as `"0s"`.
pub fn format_duration_ns(nanos: f64) -> String {
    if !nanos.is_finite() {
        return stringify(&Value::from(nanos));
    }
    if nanos <= 0.0 {
        return "0s".to_string();
    }

    let millis = (nanos / NANOS_PER_MILLI).trunc();
    if millis > i64::MAX as f64 {
        return format_number(nanos);
    }
    let Some(end) = DateTime::<Utc>::from_timestamp_millis(millis as i64) else {
        return format_number(nanos);
    };

    let components = [
        (i64::from(end.year() - 1970), "year"),
        (i64::from(end.month0()), "month"),
        (i64::from(end.day0()), "day"),
        (i64::from(end.hour()), "hour"),
        (i64::from(end.minute()), "minute"),
        (i64::from(end.second()), "second"),
    ];

    let parts: Vec<String> = components
        .iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, unit)| plural(*count, unit))
        .collect();

    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}

/// Whole hours between two instants, truncated toward zero
pub fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_hours()
}

/// `"<h>h"` below one day, otherwise `"<d>d <h>h"`
pub fn format_hours(hours: i64) -> String {
    if hours < 24 {
        format!("{hours}h")
    } else {
        format!("{}d {}h", hours / 24, hours % 24)
    }
}

/// Uppercase the first character
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
