use std::ops::Range;

use chrono::NaiveDate;
use regex::{Captures, Regex};

use super::{first_match, re, Matcher};
use crate::types::{DateFormat, ExtractedDate, RawText};

// Guards only keep digits from joining the match, so OCR-merged text such as
// "DATE03/15/2024" or "ORDER2024-03-15" still yields a date.
re!(re_date_numeric,
    r"(?:^|\D)(\d{1,2})([/-])(\d{1,2})([/-])(\d{4}|\d{2})(?:\D|$)");
re!(re_date_iso,
    r"(?:^|\D)(\d{4})-(\d{2})-(\d{2})(?:\D|$)");
re!(re_date_month_name,
    r"(?i)(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s+(\d{1,2}),?\s+(\d{4})(?:\D|$)");

/// One date layout: a pattern plus the rule that turns its captures into a
/// calendar date. Matches that are not real dates are skipped.
pub struct DateMatcher {
    format: DateFormat,
    pattern: fn() -> &'static Regex,
    build: fn(&Captures<'_>) -> Option<NaiveDate>,
}

impl DateMatcher {
    /// Every candidate in `haystack` with the byte span of the date itself
    /// (first to last capture group, guards excluded).
    fn candidates<'h>(&self, haystack: &'h str) -> impl Iterator<Item = (Range<usize>, Captures<'h>)> {
        let re = (self.pattern)();
        let mut at = 0;
        // Resume at the end of the date, not the match: the trailing guard may
        // have eaten the separator in front of the next date.
        std::iter::from_fn(move || {
            let c = re.captures_at(haystack, at)?;
            let span = c.get(1)?.start()..c.get(c.len() - 1)?.end();
            at = span.end;
            Some((span, c))
        })
    }

    fn find_in(&self, haystack: &str) -> Option<ExtractedDate> {
        self.candidates(haystack).find_map(|(span, c)| {
            let date = (self.build)(&c);
            if date.is_none() {
                tracing::debug!(candidate = &haystack[span], format = %self.format, "not a calendar date");
            }
            date.map(|date| ExtractedDate { date, matched_format: self.format })
        })
    }

    /// Whether a real date in this layout makes up the whole line, allowing
    /// a leading "date"/"time" label and punctuation around it.
    fn covers(&self, line: &str) -> bool {
        self.candidates(line).any(|(span, c)| {
            let label: String = line[..span.start]
                .chars()
                .filter(|ch| ch.is_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            let tail_is_bare = !line[span.end..].chars().any(char::is_alphabetic);
            matches!(label.as_str(), "" | "date" | "time")
                && tail_is_bare
                && (self.build)(&c).is_some()
        })
    }
}

impl Matcher for DateMatcher {
    type Output = ExtractedDate;

    fn find(&self, text: &RawText) -> Option<ExtractedDate> {
        let found = self.find_in(&text.joined())?;
        tracing::debug!(date = %found.date, format = %self.format, "date found");
        Some(found)
    }
}

pub const MONTH_DAY_YEAR: DateMatcher = DateMatcher {
    format: DateFormat::MonthDayYear,
    pattern: re_date_numeric,
    build: build_month_day_year,
};

pub const ISO_YEAR_MONTH_DAY: DateMatcher = DateMatcher {
    format: DateFormat::IsoYearMonthDay,
    pattern: re_date_iso,
    build: build_iso,
};

pub const MONTH_NAME_DAY_YEAR: DateMatcher = DateMatcher {
    format: DateFormat::MonthNameDayYear,
    pattern: re_date_month_name,
    build: build_month_name,
};

/// Priority order. A later layout is only tried when no earlier layout occurs
/// anywhere in the text.
const DATE_MATCHERS: &[&dyn Matcher<Output = ExtractedDate>] =
    &[&MONTH_DAY_YEAR, &ISO_YEAR_MONTH_DAY, &MONTH_NAME_DAY_YEAR];

/// Locate the transaction date. Never guesses: no match means `None`.
pub fn extract_date(text: &RawText) -> Option<ExtractedDate> {
    first_match(DATE_MATCHERS, text)
}

/// Whether `line` is nothing but a date (optionally labeled), in any
/// supported layout. "JOE'S DINER 03/15/24" is not; "Date: March 15, 2024" is.
pub fn is_date_line(line: &str) -> bool {
    [MONTH_DAY_YEAR, ISO_YEAR_MONTH_DAY, MONTH_NAME_DAY_YEAR]
        .iter()
        .any(|m| m.covers(line))
}

// ── Capture → date ────────────────────────────────────────────────────────────

fn build_month_day_year(c: &Captures<'_>) -> Option<NaiveDate> {
    // Mixed separators ("03/15-2024") are not a date.
    if c.get(2)?.as_str() != c.get(4)?.as_str() {
        return None;
    }
    let month: u32 = c.get(1)?.as_str().parse().ok()?;
    let day: u32 = c.get(3)?.as_str().parse().ok()?;
    let year = expand_year(c.get(5)?.as_str().parse().ok()?);
    NaiveDate::from_ymd_opt(year, month, day)
}

fn build_iso(c: &Captures<'_>) -> Option<NaiveDate> {
    let y: i32 = c.get(1)?.as_str().parse().ok()?;
    let m: u32 = c.get(2)?.as_str().parse().ok()?;
    let d: u32 = c.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

fn build_month_name(c: &Captures<'_>) -> Option<NaiveDate> {
    let month = month_name_to_num(c.get(1)?.as_str())?;
    let day: u32 = c.get(2)?.as_str().parse().ok()?;
    let year: i32 = c.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn expand_year(y: i32) -> i32 {
    if y < 100 { 2000 + y } else { y }
}

fn month_name_to_num(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    match prefix.as_str() {
        "jan" => Some(1), "feb" => Some(2), "mar" => Some(3), "apr" => Some(4),
        "may" => Some(5), "jun" => Some(6), "jul" => Some(7), "aug" => Some(8),
        "sep" => Some(9), "oct" => Some(10), "nov" => Some(11), "dec" => Some(12),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn date(text: &str) -> Option<ExtractedDate> {
        extract_date(&RawText::from_text(text))
    }

    #[test]
    fn slash_format() {
        let d = date("STARBUCKS\n01/15/2024\n$5.50").unwrap();
        assert_eq!(d.date, ymd(2024, 1, 15));
        assert_eq!(d.matched_format, DateFormat::MonthDayYear);
        assert_eq!(d.iso_date(), "2024-01-15");
    }

    #[test]
    fn short_slash_format_expands_year() {
        assert_eq!(date("3/5/24").unwrap().date, ymd(2024, 3, 5));
    }

    #[test]
    fn hyphenated_month_first() {
        let d = date("DATE 12-31-2023").unwrap();
        assert_eq!(d.date, ymd(2023, 12, 31));
        assert_eq!(d.matched_format, DateFormat::MonthDayYear);
    }

    #[test]
    fn iso_format() {
        let d = date("AMAZON\nOrder 2024-03-15\nTotal $49.99").unwrap();
        assert_eq!(d.date, ymd(2024, 3, 15));
        assert_eq!(d.matched_format, DateFormat::IsoYearMonthDay);
    }

    #[test]
    fn month_name_format() {
        let d = date("WHOLE FOODS\nDate: March 15, 2024\nTotal $87.50").unwrap();
        assert_eq!(d.date, ymd(2024, 3, 15));
        assert_eq!(d.matched_format, DateFormat::MonthNameDayYear);
    }

    #[test]
    fn abbreviated_month_name() {
        assert_eq!(date("sept. 9 2023").unwrap().date, ymd(2023, 9, 9));
        assert_eq!(date("DEC 1, 2022").unwrap().date, ymd(2022, 12, 1));
    }

    #[test]
    fn all_three_present_slash_wins() {
        let d = date("03/15/2024\n2024-03-15\nMarch 15, 2024").unwrap();
        assert_eq!(d.date, ymd(2024, 3, 15));
        assert_eq!(d.matched_format, DateFormat::MonthDayYear);
    }

    #[test]
    fn pattern_priority_outranks_position() {
        let d = date("January 2, 2024\n2024-02-03\nVISA\n04/05/2024").unwrap();
        assert_eq!(d.date, ymd(2024, 4, 5));
        assert_eq!(d.matched_format, DateFormat::MonthDayYear);

        let d = date("January 2, 2024\n2024-02-03").unwrap();
        assert_eq!(d.matched_format, DateFormat::IsoYearMonthDay);
    }

    #[test]
    fn invalid_calendar_dates_are_skipped() {
        let d = date("13/45/2024\n02/29/2024").unwrap();
        assert_eq!(d.date, ymd(2024, 2, 29));

        let d = date("02/30/2023\n2023-06-01").unwrap();
        assert_eq!(d.date, ymd(2023, 6, 1));
        assert_eq!(d.matched_format, DateFormat::IsoYearMonthDay);
    }

    #[test]
    fn mixed_separators_are_rejected() {
        assert_eq!(date("03/15-2024"), None);
    }

    #[test]
    fn iso_date_is_not_read_as_month_first() {
        let d = date("2024-03-15").unwrap();
        assert_eq!(d.matched_format, DateFormat::IsoYearMonthDay);
    }

    #[test]
    fn no_date_is_none() {
        assert_eq!(date("TOTAL $5.00\nTHANK YOU"), None);
        assert_eq!(date(""), None);
    }

    #[test]
    fn dates_merged_with_words_are_found() {
        assert_eq!(date("DATE03/15/2024").unwrap().date, ymd(2024, 3, 15));
        assert_eq!(date("03/15/2024TIME 14:02").unwrap().date, ymd(2024, 3, 15));

        let d = date("ORDER2024-03-15").unwrap();
        assert_eq!(d.date, ymd(2024, 3, 15));
        assert_eq!(d.matched_format, DateFormat::IsoYearMonthDay);

        let d = date("DateMarch 15, 2024").unwrap();
        assert_eq!(d.date, ymd(2024, 3, 15));
        assert_eq!(d.matched_format, DateFormat::MonthNameDayYear);
    }

    #[test]
    fn digits_never_join_a_date() {
        assert_eq!(date("123/15/2024"), None);
        assert_eq!(date("03/15/20245"), None);
        assert_eq!(date("12024-03-15"), None);
    }

    #[test]
    fn adjacent_dates_are_both_seen() {
        let d = date("13/45/2024 02/29/2024").unwrap();
        assert_eq!(d.date, ymd(2024, 2, 29));
    }

    #[test]
    fn date_lines_in_every_layout() {
        assert!(is_date_line("Date: 03/15/2024"));
        assert!(is_date_line("  03/15/2024 14:22:05"));
        assert!(is_date_line("2024-03-15"));
        assert!(is_date_line("Mar 15, 2024"));
        assert!(is_date_line("TIME: March 15, 2024."));
        assert!(!is_date_line("JOE'S DINER 03/15/24"));
        assert!(!is_date_line("03/15/2024 CASHIER DAVE"));
        assert!(!is_date_line("13/45/2024"));
        assert!(!is_date_line("STARBUCKS #1234"));
    }
}
