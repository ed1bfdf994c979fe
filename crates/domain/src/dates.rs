//! `dd-MM-yyyy` codec for project dates.

use chrono::NaiveDate;

use tracker_core::{DomainError, DomainResult};

pub const PROJECT_DATE_FORMAT: &str = "%d-%m-%Y";

/// Parse exactly `DD-MM-YYYY`: two-digit day and month, four-digit year, no sign.
///
/// A day past the end of its month is clamped to the month's last day, so
/// `31-02-2023` reads as 2023-02-28. Days above 31, months outside 1..=12 and
/// year zero are rejected.
pub fn parse_project_date(raw: &str) -> DomainResult<NaiveDate> {
    let (day, month, year) = split_fields(raw).ok_or_else(|| DomainError::date_parse(raw))?;
    if !(1..=31).contains(&day) || !(1..=12).contains(&month) || year == 0 {
        return Err(DomainError::date_parse(raw));
    }

    (day.min(28)..=day)
        .rev()
        .find_map(|d| NaiveDate::from_ymd_opt(year, month, d))
        .ok_or_else(|| DomainError::date_parse(raw))
}

fn split_fields(raw: &str) -> Option<(u32, u32, i32)> {
    let bytes = raw.as_bytes();
    if bytes.len() != 10 || bytes[2] != b'-' || bytes[5] != b'-' {
        return None;
    }
    let digits = |range: core::ops::Range<usize>| -> Option<u32> {
        bytes[range].iter().try_fold(0u32, |acc, b| {
            b.is_ascii_digit().then(|| acc * 10 + u32::from(b - b'0'))
        })
    };

    let day = digits(0..2)?;
    let month = digits(3..5)?;
    let year = digits(6..10)?;
    Some((day, month, i32::try_from(year).ok()?))
}

pub fn parse_optional(raw: Option<&str>) -> DomainResult<Option<NaiveDate>> {
    raw.map(parse_project_date).transpose()
}

pub fn format_project_date(date: NaiveDate) -> String {
    date.format(PROJECT_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_day_month_year() {
        assert_eq!(
            parse_project_date("24-12-2023").unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 24).unwrap()
        );
    }

    #[test]
    fn rejects_other_layouts_and_impossible_dates() {
        for raw in [
            "2023-12-24",
            "",
            "24/12/2023",
            "1-1-2024",
            "01-01-24",
            "01-01-+2024",
            "+1-01-2024",
            "32-01-2024",
            "00-01-2024",
            "15-13-2024",
            "15-00-2024",
            "15-06-0000",
            "15-06-20245",
        ] {
            assert_eq!(parse_project_date(raw), Err(DomainError::date_parse(raw)));
        }
    }

    #[test]
    fn days_past_month_end_clamp_to_last_day() {
        let ymd = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(parse_project_date("31-02-2023").unwrap(), ymd(2023, 2, 28));
        assert_eq!(parse_project_date("30-02-2024").unwrap(), ymd(2024, 2, 29));
        assert_eq!(parse_project_date("31-04-2024").unwrap(), ymd(2024, 4, 30));
        assert_eq!(parse_project_date("29-02-2024").unwrap(), ymd(2024, 2, 29));
        assert_eq!(parse_project_date("05-03-2024").unwrap(), ymd(2024, 3, 5));
    }

    #[test]
    fn absent_dates_stay_absent() {
        assert_eq!(parse_optional(None).unwrap(), None);
    }

    proptest! {
        #[test]
        fn formatted_dates_parse_back(days in 0i64..80_000) {
            let date = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap() + chrono::Duration::days(days);
            prop_assert_eq!(parse_project_date(&format_project_date(date)).unwrap(), date);
        }
    }
}
