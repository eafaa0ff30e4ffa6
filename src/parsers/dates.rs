use chrono::{ DateTime, NaiveDate, NaiveDateTime, Utc };
use tracing::warn;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y%m%d %H:%M:%S",
    "%Y.%m.%d %H:%M:%S",
    "%d-%b-%Y %H:%M:%S",
];

/// Offsets without a colon (`+0000`), which RFC 3339 rejects
const ZONED_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%.f%z"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%Y.%m.%d", "%d-%b-%Y", "%d.%m.%Y", "%Y/%m/%d"];

/// Parse the timestamp formats WHOIS servers commonly use. Values without a
/// zone are taken as UTC; date-only values resolve to midnight.
pub fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Some(time.with_timezone(&Utc));
    }
    for format in ZONED_FORMATS {
        if let Ok(time) = DateTime::parse_from_str(value, format) {
            return Some(time.with_timezone(&Utc));
        }
    }

    // Trailing zone names such as "UTC" or "(GMT)" carry no extra information
    let stripped = value
        .trim_end_matches(|c: char| c == ')' || c == '(')
        .trim_end_matches("UTC")
        .trim_end_matches("GMT")
        .trim_end_matches(['Z', '(', ' ']);
    let stripped = stripped.split('.').next().filter(|_| stripped.contains('T')).unwrap_or(stripped);

    for format in DATETIME_FORMATS {
        if let Ok(time) = NaiveDateTime::parse_from_str(stripped, format) {
            return Some(time.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(stripped, format) {
            return date.and_hms_opt(0, 0, 0).map(|time| time.and_utc());
        }
    }

    warn!("Unrecognised date format: {}", value);
    None
}
