//! Shared utilities for the orders pipeline.
//!
//! This module contains common helper functions used across multiple modules
//! to reduce code duplication and ensure consistency.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use polars::prelude::*;
use std::collections::HashSet;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a date or datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

/// Check whether the frame has a column with this exact name.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Check whether the frame has every listed column.
pub fn has_columns(df: &DataFrame, names: &[&str]) -> bool {
    names.iter().all(|name| has_column(df, name))
}

/// Make names unique in order: a repeated name gets a `.1`, `.2`, ... suffix.
pub fn dedupe_names<I: IntoIterator<Item = String>>(names: I) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    names
        .into_iter()
        .map(|base| {
            let mut name = base.clone();
            let mut suffix = 1;
            while !seen.insert(name.clone()) {
                name = format!("{}.{}", base, suffix);
                suffix += 1;
            }
            name
        })
        .collect()
}

/// Datetime type used for every temporal column the pipeline produces.
pub fn millis_datetime_dtype() -> DataType {
    DataType::Datetime(TimeUnit::Milliseconds, None)
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Datetime layouts tried in order. Slash dates are month-first, and the
/// month-first layouts run before `%Y/` since `%Y` accepts any digit count.
const DATETIME_FORMATS: [&str; 11] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d-%b-%Y %H:%M:%S",
];

/// Date-only layouts tried in order. Two-digit years come first, then
/// four-digit month-first, then year-first: `1/2/23` is 2023-01-02.
const DATE_FORMATS: [&str; 9] = [
    "%Y-%m-%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%d-%b-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%Y%m%d",
];

/// Parse a date or datetime string, returning `None` when no layout matches.
///
/// ```rust,ignore
/// assert!(parse_datetime_str("11/8/2016").is_some());
/// assert!(parse_datetime_str("not a date").is_none());
/// ```
pub fn parse_datetime_str(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }

    None
}

/// Parse a numeric string after trimming, returning `None` on failure.
///
/// No thousands separators or currency symbols are stripped: "1,200" is not a number.
/// `NaN` and infinities are treated as missing.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

// =============================================================================
// Datetime Conversion Utilities
// =============================================================================

/// Milliseconds since the Unix epoch for a naive (UTC) datetime.
pub fn datetime_to_millis(dt: NaiveDateTime) -> i64 {
    dt.and_utc().timestamp_millis()
}

/// Naive (UTC) datetime for milliseconds since the Unix epoch.
pub fn millis_to_datetime(ms: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.naive_utc())
}

/// Render a datetime as `YYYY-MM-DD`, adding the time only when it is not midnight.
pub fn format_datetime(dt: &NaiveDateTime) -> String {
    if dt.time() == NaiveTime::MIN {
        dt.format("%Y-%m-%d").to_string()
    } else if dt.nanosecond() == 0 {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
    }
}

/// Build a `Datetime(ms)` series from epoch milliseconds.
pub fn datetime_series(name: &str, millis: Vec<Option<i64>>) -> PolarsResult<Series> {
    Series::new(name.into(), millis).cast(&millis_datetime_dtype())
}

// =============================================================================
// Series Extraction Utilities
// =============================================================================

/// Values of a series as `f64`, nulls preserved. Non-numeric values become null.
pub fn series_to_f64(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let floats = series.cast(&DataType::Float64)?;
    Ok(floats.f64()?.into_iter().collect())
}

/// Values of a date/datetime series as epoch milliseconds, nulls preserved.
pub fn series_to_millis(series: &Series) -> PolarsResult<Vec<Option<i64>>> {
    let millis = series
        .cast(&millis_datetime_dtype())?
        .cast(&DataType::Int64)?;
    Ok(millis.i64()?.into_iter().collect())
}

/// Values of any series rendered as text, nulls preserved.
///
/// Temporal values use [`format_datetime`]; everything else uses polars' string cast.
pub fn series_to_strings(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    if is_datetime_dtype(series.dtype()) {
        return Ok(series_to_millis(series)?
            .into_iter()
            .map(|ms| ms.and_then(millis_to_datetime).map(|dt| format_datetime(&dt)))
            .collect());
    }

    let text = series.cast(&DataType::String)?;
    Ok(text
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

/// First non-null value of a series rendered as text.
pub fn first_non_null_string(series: &Series) -> PolarsResult<Option<String>> {
    Ok(series_to_strings(series)?.into_iter().flatten().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(NaiveTime::MIN)
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_datetime_str("2023-01-05"), Some(ymd(2023, 1, 5)));
        assert_eq!(parse_datetime_str("  2023-01-05  "), Some(ymd(2023, 1, 5)));
    }

    #[test]
    fn test_parse_us_slash_date_is_month_first() {
        assert_eq!(parse_datetime_str("11/8/2016"), Some(ymd(2016, 11, 8)));
        assert_eq!(parse_datetime_str("1/2/23"), Some(ymd(2023, 1, 2)));
        assert_eq!(parse_datetime_str("12/31/99"), Some(ymd(1999, 12, 31)));
    }

    #[test]
    fn test_parse_year_first_slash_date() {
        assert_eq!(parse_datetime_str("2023/01/05"), Some(ymd(2023, 1, 5)));
        let with_time = parse_datetime_str("2023/01/05 08:30:00").unwrap();
        assert_eq!(with_time.date(), ymd(2023, 1, 5).date());
        assert_eq!(with_time.hour(), 8);
    }

    #[test]
    fn test_parse_two_digit_year_with_time() {
        let parsed = parse_datetime_str("1/2/23 10:30").unwrap();
        assert_eq!(parsed.date(), ymd(2023, 1, 2).date());
        assert_eq!(parsed.hour(), 10);
        assert_eq!(parsed.minute(), 30);
    }

    #[test]
    fn test_parse_datetime_with_time() {
        let parsed = parse_datetime_str("2023-01-05 13:45:00").unwrap();
        assert_eq!(parsed.hour(), 13);
        assert_eq!(parsed.minute(), 45);

        let rfc = parse_datetime_str("2023-01-05T10:00:00Z").unwrap();
        assert_eq!(rfc.hour(), 10);
    }

    #[test]
    fn test_parse_named_month() {
        assert_eq!(parse_datetime_str("05-Jan-2023"), Some(ymd(2023, 1, 5)));
        assert_eq!(parse_datetime_str("January 5, 2023"), Some(ymd(2023, 1, 5)));
    }

    #[test]
    fn test_parse_invalid_dates() {
        assert_eq!(parse_datetime_str(""), None);
        assert_eq!(parse_datetime_str("not a date"), None);
        assert_eq!(parse_datetime_str("2023-13-45"), None);
    }

    #[test]
    fn test_parse_numeric_string() {
        assert_eq!(parse_numeric_string(" 42.5 "), Some(42.5));
        assert_eq!(parse_numeric_string("-10"), Some(-10.0));
        assert_eq!(parse_numeric_string("abc"), None);
        assert_eq!(parse_numeric_string("1,200"), None);
        assert_eq!(parse_numeric_string(""), None);
        assert_eq!(parse_numeric_string("NaN"), None);
        assert_eq!(parse_numeric_string("inf"), None);
    }

    #[test]
    fn test_millis_round_trip() {
        let dt = ymd(2023, 1, 5);
        let ms = datetime_to_millis(dt);
        assert_eq!(millis_to_datetime(ms), Some(dt));
    }

    #[test]
    fn test_format_datetime() {
        assert_eq!(format_datetime(&ymd(2023, 1, 5)), "2023-01-05");
        let with_time = parse_datetime_str("2023-01-05 08:30:00").unwrap();
        assert_eq!(format_datetime(&with_time), "2023-01-05 08:30:00");
    }

    #[test]
    fn test_series_to_strings_datetime() {
        let ms = datetime_to_millis(ymd(2023, 1, 5));
        let series = datetime_series("d", vec![Some(ms), None]).unwrap();
        let strings = series_to_strings(&series).unwrap();
        assert_eq!(strings, vec![Some("2023-01-05".to_string()), None]);
    }

    #[test]
    fn test_series_to_f64_casts_integers() {
        let series = Series::new("n".into(), &[Some(1i64), None, Some(3)]);
        assert_eq!(
            series_to_f64(&series).unwrap(),
            vec![Some(1.0), None, Some(3.0)]
        );
    }

    #[test]
    fn test_first_non_null_string() {
        let series = Series::new("s".into(), &[None, Some("b"), Some("c")]);
        assert_eq!(
            first_non_null_string(&series).unwrap(),
            Some("b".to_string())
        );

        let empty = Series::new("s".into(), &[None::<&str>, None]);
        assert_eq!(first_non_null_string(&empty).unwrap(), None);
    }

    #[test]
    fn test_dedupe_names() {
        let names = ["Sales", "Profit", "Sales", "Sales"].map(String::from);
        assert_eq!(
            dedupe_names(names),
            vec!["Sales", "Profit", "Sales.1", "Sales.2"]
        );
    }

    #[test]
    fn test_has_columns() {
        let df = df! {
            "Sales" => [1.0],
            "Profit" => [2.0],
        }
        .unwrap();
        assert!(has_columns(&df, &["Sales", "Profit"]));
        assert!(!has_columns(&df, &["Sales", "Category"]));
    }
}
