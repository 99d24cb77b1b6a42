// src/extractors/period.rs

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

// "Date: 1/31/2024" — 1-2 digit month/day, 4-digit year
static REPORT_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Date:\s*([0-9]{1,2})/([0-9]{1,2})/([0-9]{4})")
        .expect("Failed to compile REPORT_DATE_RE")
});

/// Extracts the report date as an ISO-8601 string to use as the time-series
/// key. Falls back to the supplied label (typically the filename) when no
/// "Date:" marker is found or the numeric triple is not a valid calendar
/// date. Never fails.
pub fn extract_period(text: &str, fallback: &str) -> String {
    if let Some(caps) = REPORT_DATE_RE.captures(text) {
        if let Some(date) = parse_date(&caps) {
            return date.format("%Y-%m-%d").to_string();
        }
        tracing::debug!(
            "Report date '{}' is not a valid calendar date, using fallback label",
            &caps[0]
        );
    }
    fallback.to_string()
}

fn parse_date(caps: &regex::Captures<'_>) -> Option<NaiveDate> {
    let month: u32 = caps[1].parse().ok()?;
    let day: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_report_date_to_iso() {
        assert_eq!(
            extract_period("Subscriber Counts v2 Date: 1/31/2024", "report.pdf"),
            "2024-01-31"
        );
        assert_eq!(
            extract_period("date: 12/9/2023 more text", "x"),
            "2023-12-09"
        );
    }

    #[test]
    fn missing_marker_returns_fallback_unchanged() {
        assert_eq!(
            extract_period("no date marker here", "jan_report.pdf"),
            "jan_report.pdf"
        );
    }

    #[test]
    fn invalid_calendar_date_returns_fallback() {
        assert_eq!(extract_period("Date: 13/45/2024", "fallback"), "fallback");
        assert_eq!(extract_period("Date: 2/30/2024", "fallback"), "fallback");
    }

    #[test]
    fn iso_labels_sort_chronologically() {
        let a = extract_period("Date: 1/31/2024", "x");
        let b = extract_period("Date: 2/1/2024", "x");
        assert!(a < b);
    }
}
