//! Small formatting helpers used by page objects and fixtures.
//!
//! Every function takes its date or time explicitly; the `*_now` variants
//! read the local clock.

use crate::result::{ProbeError, ProbeResult};
use chrono::{Datelike, Days, Local, NaiveDate, NaiveDateTime, Weekday};
use std::time::Duration;

/// Characters the UI uses for layout only
pub const UI_FORMATTING_CHARS: &[char] = &['\n', '\r', '\t', '\u{a0}', '\u{200b}'];

/// Parse `"30s"`, `"5m"`, `"1h"` or a bare number of seconds
pub fn parse_duration_spec(spec: &str) -> ProbeResult<Duration> {
    let spec = spec.trim().to_ascii_lowercase();
    let invalid = || ProbeError::invalid_request(format!("invalid duration {spec:?}"));
    let (digits, scale) = match spec.chars().last() {
        Some('h') => (&spec[..spec.len() - 1], 3600),
        Some('m') => (&spec[..spec.len() - 1], 60),
        Some('s') => (&spec[..spec.len() - 1], 1),
        Some(c) if c.is_ascii_digit() => (spec.as_str(), 1),
        _ => return Err(invalid()),
    };
    let amount: u64 = digits.trim().parse().map_err(|_| invalid())?;
    let secs = amount
        .checked_mul(scale)
        .ok_or_else(|| ProbeError::config(format!("duration {spec:?} is too large")))?;
    Ok(Duration::from_secs(secs))
}

/// Date and time as the app renders them in links, e.g. `14 April 2025 at 2:30pm`
#[must_use]
pub fn link_formatted_date_time(at: NaiveDateTime) -> String {
    at.format("%-d %B %Y at %-I:%M%P").to_string()
}

/// [`link_formatted_date_time`] for the local clock
#[must_use]
pub fn link_formatted_now() -> String {
    link_formatted_date_time(Local::now().naive_local())
}

/// `YYYYMMDDHHMMSS`, used to make names unique
#[must_use]
pub fn compact_timestamp(at: NaiveDateTime) -> String {
    at.format("%Y%m%d%H%M%S").to_string()
}

/// [`compact_timestamp`] for the local clock
#[must_use]
pub fn compact_timestamp_now() -> String {
    compact_timestamp(Local::now().naive_local())
}

/// `today` moved by `offset_days`, as `YYYYMMDD`.
///
/// A non-zero offset landing on a weekend rolls forward to Monday.
pub fn offset_business_date(today: NaiveDate, offset_days: i64) -> ProbeResult<String> {
    let out_of_range =
        || ProbeError::invalid_request(format!("offset of {offset_days} days is out of range"));
    let magnitude = Days::new(offset_days.unsigned_abs());
    let mut date = if offset_days >= 0 {
        today.checked_add_days(magnitude)
    } else {
        today.checked_sub_days(magnitude)
    }
    .ok_or_else(out_of_range)?;
    if offset_days != 0 {
        while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            date = date.succ_opt().ok_or_else(out_of_range)?;
        }
    }
    Ok(date.format("%Y%m%d").to_string())
}

/// Strip layout-only characters from UI text
#[must_use]
pub fn clean_text(text: &str) -> String {
    text.chars()
        .filter(|c| !UI_FORMATTING_CHARS.contains(c))
        .collect()
}

/// Birth-date window (1 September to 31 August) of children in `year_group`
/// during the calendar year of `today`
pub fn academic_year_bounds(today: NaiveDate, year_group: i32) -> ProbeResult<(NaiveDate, NaiveDate)> {
    let year = today.year() - year_group - 6;
    let start = NaiveDate::from_ymd_opt(year, 9, 1);
    let end = NaiveDate::from_ymd_opt(year + 1, 8, 31);
    start.zip(end).ok_or_else(|| {
        ProbeError::invalid_request(format!("year group {year_group} is out of range"))
    })
}

/// A date of birth inside the window of `year_group`.
///
/// `pick` selects the day within the window and wraps around, so any value
/// (a row number, a counter) yields a valid date.
pub fn date_of_birth_for_year_group(
    today: NaiveDate,
    year_group: i32,
    pick: u64,
) -> ProbeResult<NaiveDate> {
    let (start, end) = academic_year_bounds(today, year_group)?;
    let span = u64::try_from((end - start).num_days()).unwrap_or(0) + 1;
    start
        .checked_add_days(Days::new(pick % span))
        .ok_or_else(|| ProbeError::invalid_request("date of birth out of range"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(h, min, s).unwrap())
    }

    mod duration_tests {
        use super::*;

        #[test]
        fn test_units() {
            assert_eq!(parse_duration_spec("30s").unwrap(), Duration::from_secs(30));
            assert_eq!(parse_duration_spec("1m").unwrap(), Duration::from_secs(60));
            assert_eq!(parse_duration_spec("1H").unwrap(), Duration::from_secs(3600));
            assert_eq!(parse_duration_spec("45").unwrap(), Duration::from_secs(45));
        }

        #[test]
        fn test_rejects_garbage() {
            assert!(parse_duration_spec("").is_err());
            assert!(parse_duration_spec("m").is_err());
            assert!(parse_duration_spec("2d").is_err());
        }

        #[test]
        fn test_overflow_is_an_error() {
            let err = parse_duration_spec("9999999999999999h").unwrap_err();
            assert!(matches!(err, ProbeError::Config { .. }));
            assert!(parse_duration_spec("18446744073709551615s").is_ok());
        }
    }

    mod format_tests {
        use super::*;

        #[test]
        fn test_link_format() {
            assert_eq!(
                link_formatted_date_time(at(2025, 4, 14, 14, 30, 0)),
                "14 April 2025 at 2:30pm"
            );
            assert_eq!(
                link_formatted_date_time(at(2025, 1, 3, 9, 5, 0)),
                "3 January 2025 at 9:05am"
            );
        }

        #[test]
        fn test_compact_timestamp() {
            let t = at(2025, 4, 14, 8, 7, 6);
            assert_eq!(compact_timestamp(t), "20250414080706");
        }

        #[test]
        fn test_cleaning() {
            assert_eq!(clean_text("Batch\u{a0}GB1\n added\t"), "BatchGB1 added");
        }
    }

    mod date_tests {
        use super::*;

        fn date(y: i32, m: u32, d: u32) -> NaiveDate {
            NaiveDate::from_ymd_opt(y, m, d).unwrap()
        }

        #[test]
        fn test_offset_skips_weekend() {
            // 2025-04-14 is a Monday; +5 lands on Saturday
            assert_eq!(offset_business_date(date(2025, 4, 14), 5).unwrap(), "20250421");
            assert_eq!(offset_business_date(date(2025, 4, 14), -2).unwrap(), "20250414");
        }

        #[test]
        fn test_zero_offset_keeps_weekend() {
            assert_eq!(offset_business_date(date(2025, 4, 19), 0).unwrap(), "20250419");
        }

        #[test]
        fn test_year_group_window() {
            let (start, end) = academic_year_bounds(date(2025, 6, 1), 8).unwrap();
            assert_eq!(start, date(2011, 9, 1));
            assert_eq!(end, date(2012, 8, 31));
        }

        #[test]
        fn test_dob_always_inside_window() {
            let today = date(2025, 6, 1);
            let (start, end) = academic_year_bounds(today, 9).unwrap();
            for pick in [0, 1, 200, 365, 366, 10_000] {
                let dob = date_of_birth_for_year_group(today, 9, pick).unwrap();
                assert!(dob >= start && dob <= end);
            }
        }
    }
}
