//! Permissive date parsing for source-page date strings.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

/// Formats seen in listing cells and recall letters, tried in order.
const DATE_FORMATS: [&str; 8] = [
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

lazy_static! {
    static ref YEAR_RE: Regex = Regex::new(r"\b((?:19|20)\d{2})\b").expect("static regex");
}

/// Parse a date string, tolerating label prefixes, month-only values and
/// bare years. Returns `None` rather than guessing when nothing matches.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let mut text = raw.trim();
    for prefix in ["date:", "Date:", "on "] {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest.trim();
        }
    }
    if text.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }

    // "2023-06" style month values anchor to the first of the month.
    if let Some((year, month)) = text.split_once('-') {
        if let (Ok(y), Ok(m)) = (year.parse::<i32>(), month.parse::<u32>()) {
            if let Some(date) = NaiveDate::from_ymd_opt(y, m, 1) {
                return Some(date);
            }
        }
    }

    // Last resort: any plausible year in the string, anchored to January 1.
    if let Some(cap) = YEAR_RE.captures(text) {
        if let Ok(year) = cap[1].parse::<i32>() {
            return NaiveDate::from_ymd_opt(year, 1, 1);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_common_formats() {
        assert_eq!(parse_date("15/03/2023"), Some(d(2023, 3, 15)));
        assert_eq!(parse_date("15-03-2023"), Some(d(2023, 3, 15)));
        assert_eq!(parse_date("2023-03-15"), Some(d(2023, 3, 15)));
        assert_eq!(parse_date("15 March 2023"), Some(d(2023, 3, 15)));
        assert_eq!(parse_date("March 15, 2023"), Some(d(2023, 3, 15)));
        assert_eq!(parse_date("Mar 15, 2023"), Some(d(2023, 3, 15)));
    }

    #[test]
    fn test_label_prefix_is_tolerated() {
        assert_eq!(parse_date("Date: 15/03/2023"), Some(d(2023, 3, 15)));
    }

    #[test]
    fn test_month_only_anchors_to_first() {
        assert_eq!(parse_date("2023-06"), Some(d(2023, 6, 1)));
    }

    #[test]
    fn test_bare_year_anchors_to_january() {
        assert_eq!(parse_date("recalled in 2021"), Some(d(2021, 1, 1)));
    }

    #[test]
    fn test_unparseable_is_none() {
        assert_eq!(parse_date("next Tuesday"), None);
        assert_eq!(parse_date(""), None);
    }
}
