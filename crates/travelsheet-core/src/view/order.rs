//! Ordering keys shared by the ledger and wishlist views.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parses a backend timestamp into epoch milliseconds.
///
/// Accepts RFC 3339 and the sheet's `YYYY-MM-DD HH:MM:SS` / `YYYY/MM/DD`
/// spellings. Anything else is 0, so it sorts as the oldest.
pub fn parse_loose_timestamp(raw: &str) -> i64 {
    let text = raw.trim();
    if text.is_empty() {
        return 0;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return parsed.timestamp_millis();
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return parsed.and_utc().timestamp_millis();
        }
    }
    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(text, format) {
            if let Some(midnight) = parsed.and_hms_opt(0, 0, 0) {
                return midnight.and_utc().timestamp_millis();
            }
        }
    }

    tracing::debug!("[ViewEngine] unparseable timestamp '{}' ranks as oldest", text);
    0
}

/// Compares the numeric portions of two identifiers without overflow.
///
/// Non-digit characters are ignored; ids without digits count as zero.
pub fn compare_numeric_ids(a: &str, b: &str) -> Ordering {
    let a = significant_digits(a);
    let b = significant_digits(b);
    a.len().cmp(&b.len()).then_with(|| a.cmp(&b))
}

fn significant_digits(id: &str) -> String {
    let digits: String = id.chars().filter(char::is_ascii_digit).collect();
    digits.trim_start_matches('0').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loose_timestamp_formats() {
        let dashed = parse_loose_timestamp("2024-05-01 10:00:00");
        let slashed = parse_loose_timestamp("2024/05/01 10:00:00");
        assert_eq!(dashed, slashed);
        assert!(dashed > 0);
        assert_eq!(
            parse_loose_timestamp("2024-05-01T10:00:00.000Z"),
            dashed
        );
        assert!(parse_loose_timestamp("2024-05-02") > dashed);
    }

    #[test]
    fn test_loose_timestamp_invalid_is_zero() {
        assert_eq!(parse_loose_timestamp(""), 0);
        assert_eq!(parse_loose_timestamp("yesterday"), 0);
    }

    #[test]
    fn test_numeric_ids_beyond_u64() {
        assert_eq!(
            compare_numeric_ids("99999999999999999999999", "100000000000000000000000"),
            Ordering::Less
        );
        assert_eq!(compare_numeric_ids("10", "9"), Ordering::Greater);
        assert_eq!(compare_numeric_ids("007", "7"), Ordering::Equal);
        assert_eq!(compare_numeric_ids("w12", "11"), Ordering::Greater);
        assert_eq!(compare_numeric_ids("", "0"), Ordering::Equal);
    }
}
