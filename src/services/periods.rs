use std::sync::LazyLock;

use chrono::{Duration, Months, NaiveDate};
use regex::Regex;

use crate::analytics::model::DateRange;
use crate::error::AnalyticsError;

static LOOKBACK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(\d{1,3})\s*([dwmy])\s*$").unwrap());

/// Range ending `today` covering a selector such as `1m`, `3m`, `6m`, `2w` or `1y`.
pub fn lookback_range(selector: &str, today: NaiveDate) -> Result<DateRange, AnalyticsError> {
    let captures = LOOKBACK_REGEX.captures(selector).ok_or_else(|| {
        AnalyticsError::invalid_input(format!(
            "unsupported period '{}', expected e.g. 1m, 3m, 6m",
            selector
        ))
    })?;

    let amount: u32 = captures[1]
        .parse()
        .map_err(|_| AnalyticsError::invalid_input(format!("invalid period '{}'", selector)))?;
    if amount == 0 {
        return Err(AnalyticsError::invalid_input("period length must be positive"));
    }

    let unit = captures[2].to_ascii_lowercase();
    let back = match unit.as_str() {
        "d" => today.checked_sub_signed(Duration::days(i64::from(amount))),
        "w" => today.checked_sub_signed(Duration::weeks(i64::from(amount))),
        "m" => today.checked_sub_months(Months::new(amount)),
        _ => today.checked_sub_months(Months::new(amount * 12)),
    }
    .ok_or_else(|| AnalyticsError::invalid_input(format!("period '{}' is out of range", selector)))?;

    DateRange::new(back + Duration::days(1), today)
}

/// Current and previous equal-length ranges for `month`, `quarter` or `year`.
pub fn comparison_ranges(
    selector: &str,
    today: NaiveDate,
) -> Result<(DateRange, DateRange), AnalyticsError> {
    let length = match selector.trim().to_ascii_lowercase().as_str() {
        "month" => 30,
        "quarter" => 91,
        "year" => 365,
        _ => {
            return Err(AnalyticsError::invalid_input(format!(
                "unsupported comparison period '{}', expected month, quarter or year",
                selector
            )));
        }
    };

    let current = DateRange::new(today - Duration::days(length - 1), today)?;
    Ok((current, current.preceding()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_lookback_months() {
        let today = date("2025-06-15");

        let one = lookback_range("1m", today).unwrap();
        assert_eq!(one.start, date("2025-05-16"));
        assert_eq!(one.end, today);

        let six = lookback_range("6M", today).unwrap();
        assert_eq!(six.start, date("2024-12-16"));
    }

    #[test]
    fn test_lookback_days_weeks_years() {
        let today = date("2025-06-15");

        assert_eq!(lookback_range("7d", today).unwrap().len_days(), 7);
        assert_eq!(lookback_range("2w", today).unwrap().len_days(), 14);
        assert_eq!(lookback_range("1y", today).unwrap().start, date("2024-06-16"));
    }

    #[test]
    fn test_lookback_rejects_garbage() {
        let today = date("2025-06-15");

        assert!(lookback_range("quarterly", today).is_err());
        assert!(lookback_range("0m", today).is_err());
        assert!(lookback_range("", today).is_err());
    }

    #[test]
    fn test_comparison_ranges_are_adjacent() {
        let (current, previous) = comparison_ranges("month", date("2025-06-30")).unwrap();

        assert_eq!(current.start, date("2025-06-01"));
        assert_eq!(previous.end, date("2025-05-31"));
        assert_eq!(previous.len_days(), 30);

        let (year, _) = comparison_ranges("year", date("2025-06-30")).unwrap();
        assert_eq!(year.len_days(), 365);
        assert!(comparison_ranges("decade", date("2025-06-30")).is_err());
    }
}
