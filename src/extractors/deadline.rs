// src/extractors/deadline.rs

// --- Imports ---
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

// Numeric day/month/year, separators / - .
const NUMERIC_DATE: &str = r"\d{1,2}[-/.]\d{1,2}[-/.]\d{2,4}";
const MONTHS: &str = "jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec";

// --- Regex Patterns (Lazy Static) ---
// Order matters: labeled forms must be tried before the bare catch-all date,
// otherwise any date-shaped substring would win.
static DEADLINE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        format!(r"deadline[:\s]*({NUMERIC_DATE})"),
        format!(r"due[:\s]*({NUMERIC_DATE})"),
        format!(r"closes?[:\s]*({NUMERIC_DATE})"),
        format!(r"expires?[:\s]*({NUMERIC_DATE})"),
        format!(r"apply by[:\s]*({NUMERIC_DATE})"),
        format!(r"({NUMERIC_DATE})"),
        r"deadline[:\s]*(\d{1,2}\s+\w+\s+\d{2,4})".to_string(),
        r"due[:\s]*(\d{1,2}\s+\w+\s+\d{2,4})".to_string(),
        format!(r"(\d{{1,2}}\s+(?:{MONTHS})\w*\s+\d{{2,4}})"),
        // No capture group: the whole "month day, year" match is the value.
        format!(r"(?:{MONTHS})\w*\s+\d{{1,2}},?\s+\d{{2,4}}"),
    ]
    .iter()
    .filter_map(|pat| Regex::new(pat).ok())
    .collect()
});

// Day-first variants are tried before month-first ones, so "03/04/2026"
// reads as 3 April.
const DATE_FORMATS: [&str; 12] = [
    "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%m-%d-%Y",
    "%d.%m.%Y", "%m.%d.%Y", "%Y-%m-%d", "%Y/%m/%d",
    "%d %B %Y", "%d %b %Y", "%B %d, %Y", "%b %d, %Y",
];

/// Finds the first deadline-looking substring in `text`.
///
/// Returns the pattern's capture group when it has one, otherwise the whole
/// match. The text is lower-cased first, so textual months come back lower-case.
pub fn extract_deadline(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let text_lower = text.to_lowercase();

    DEADLINE_PATTERNS.iter().find_map(|re| {
        re.captures(&text_lower).map(|caps| {
            caps.get(1)
                .or_else(|| caps.get(0))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        })
    })
}

/// Parses a raw deadline against the known formats, first match wins.
pub fn parse_deadline(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(raw, fmt)
            .ok()
            // chrono's %Y accepts short years; only four-digit years count.
            .filter(|date| date.year() >= 1000)
    })
}

/// True only when `raw` parses and its date (at midnight) lies before `now`.
/// Absent or unparseable deadlines are never treated as passed.
pub fn is_passed(raw: Option<&str>, now: NaiveDateTime) -> bool {
    let Some(raw) = raw else {
        return false;
    };
    match parse_deadline(raw) {
        Some(date) => {
            let passed = date.and_time(NaiveTime::MIN) < now;
            tracing::trace!("Deadline '{}' parsed as {} (passed: {})", raw, date, passed);
            passed
        }
        None => {
            tracing::trace!("Unparseable deadline '{}', keeping candidate", raw);
            false
        }
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_labeled_pattern_wins_over_bare_date() {
        let text = "Deadline: 12/05/2026 see also 01/01/2020";
        assert_eq!(extract_deadline(text).as_deref(), Some("12/05/2026"));
    }

    #[test]
    fn test_bare_date_is_first_match_in_text() {
        let text = "Posted 01.02.2025, review on 15-03-2025";
        assert_eq!(extract_deadline(text).as_deref(), Some("01.02.2025"));
    }

    #[test]
    fn test_due_and_expires_labels() {
        let text = "Posted 05/05/2025. Payment due: 01/02/2026";
        assert_eq!(extract_deadline(text).as_deref(), Some("01/02/2026"));

        let text = "Listed 01.01.2025, offer expires 30-06-2026";
        assert_eq!(extract_deadline(text).as_deref(), Some("30-06-2026"));

        assert_eq!(extract_deadline("Voucher Expire:15.08.2027").as_deref(), Some("15.08.2027"));
    }

    #[test]
    fn test_textual_month_patterns() {
        assert_eq!(extract_deadline("Deadline: 15 March 2026").as_deref(), Some("15 march 2026"));
        assert_eq!(extract_deadline("Closing on 3 Sept 2025 at noon").as_deref(), Some("3 sept 2025"));
        assert_eq!(extract_deadline("Applications open until March 5, 2026").as_deref(), Some("march 5, 2026"));
    }

    #[test]
    fn test_no_deadline_found() {
        assert_eq!(extract_deadline("no dates here"), None);
        assert_eq!(extract_deadline(""), None);
    }

    #[test]
    fn test_passed_deadline_detection() {
        let now = at(2025, 1, 1);
        assert!(is_passed(Some("25/12/2000"), now));
        assert!(!is_passed(Some("25/12/2099"), now));
        assert!(is_passed(Some("2000-12-25"), now));
        assert!(is_passed(Some("15 march 2024"), now));
        assert!(!is_passed(Some("march 5, 2026"), now));
    }

    #[test]
    fn test_unparseable_or_absent_is_not_passed() {
        let now = at(2025, 1, 1);
        assert!(!is_passed(Some("sometime soon"), now));
        assert!(!is_passed(None, now));
        // two-digit years never parse
        assert!(!is_passed(Some("25/12/00"), now));
    }

    #[test]
    fn test_day_first_order_for_ambiguous_dates() {
        assert_eq!(parse_deadline("03/04/2026"), NaiveDate::from_ymd_opt(2026, 4, 3));
        // Not a valid day-first date, falls through to month-first
        assert_eq!(parse_deadline("12/25/2026"), NaiveDate::from_ymd_opt(2026, 12, 25));
    }
}
