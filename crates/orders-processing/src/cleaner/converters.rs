//! Type conversion functions for data cleaning.
//!
//! Every converter degrades unparsable values to null instead of failing.

use crate::utils::{
    datetime_series, datetime_to_millis, is_numeric_dtype, millis_datetime_dtype,
    parse_datetime_str, parse_numeric_string,
};
use anyhow::Result;
use polars::prelude::*;

/// Convert a column to `Datetime(ms)`.
///
/// Text is parsed with [`parse_datetime_str`]; numbers are rendered as text
/// first (so `20230105` parses); other types become all-null.
pub(crate) fn coerce_datetime(series: &Series) -> Result<Series> {
    let name = series.name().clone();

    match series.dtype() {
        DataType::Datetime(TimeUnit::Milliseconds, None) => Ok(series.clone()),
        DataType::Datetime(_, _) | DataType::Date => Ok(series.cast(&millis_datetime_dtype())?),
        DataType::String => {
            let str_series = series.str()?;
            let mut millis: Vec<Option<i64>> = Vec::with_capacity(str_series.len());

            for opt_val in str_series.into_iter() {
                millis.push(
                    opt_val
                        .and_then(parse_datetime_str)
                        .map(datetime_to_millis),
                );
            }

            Ok(datetime_series(name.as_str(), millis)?)
        }
        dtype if is_numeric_dtype(dtype) => {
            let as_text = series.cast(&DataType::String)?;
            coerce_datetime(&as_text)
        }
        _ => Ok(datetime_series(name.as_str(), vec![None; series.len()])?),
    }
}

/// Convert a column to a numeric type.
///
/// Numeric columns keep their dtype. Text columns become `Int64` when every
/// value is a clean integer, otherwise `Float64` with unparsable values as
/// null. Anything else is cast to `Float64` non-strictly. NaN and infinities
/// count as missing and become null.
pub(crate) fn coerce_numeric(series: &Series) -> Result<Series> {
    if is_numeric_dtype(series.dtype()) {
        return null_non_finite(series);
    }

    if series.dtype() != &DataType::String {
        return null_non_finite(&series.cast(&DataType::Float64)?);
    }

    let str_series = series.str()?;

    if str_series.null_count() == 0 {
        let integers: Option<Vec<i64>> = str_series
            .into_iter()
            .map(|opt_val| opt_val.and_then(|v| v.trim().parse::<i64>().ok()))
            .collect();
        if let Some(values) = integers {
            return Ok(Series::new(series.name().clone(), values));
        }
    }

    let mut result_vec: Vec<Option<f64>> = Vec::with_capacity(str_series.len());
    for opt_val in str_series.into_iter() {
        result_vec.push(opt_val.and_then(parse_numeric_string));
    }

    Ok(Series::new(series.name().clone(), result_vec))
}

/// Replace NaN and infinite values of a float column with null, keeping the dtype.
fn null_non_finite(series: &Series) -> Result<Series> {
    let dtype = series.dtype();
    if !matches!(dtype, DataType::Float32 | DataType::Float64) {
        return Ok(series.clone());
    }

    let floats = series.cast(&DataType::Float64)?;
    let values: Vec<Option<f64>> = floats
        .f64()?
        .into_iter()
        .map(|opt_val| opt_val.filter(|v| v.is_finite()))
        .collect();

    Ok(Series::new(series.name().clone(), values).cast(dtype)?)
}

/// Trim surrounding whitespace from every value of a text column.
pub(crate) fn trim_string_values(series: &Series) -> Result<Series> {
    let str_series = series.str()?;
    let trimmed: Vec<Option<&str>> = str_series
        .into_iter()
        .map(|opt_val| opt_val.map(str::trim))
        .collect();

    Ok(Series::new(series.name().clone(), trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::series_to_strings;

    fn is_null_at(series: &Series, idx: usize) -> bool {
        matches!(series.get(idx).unwrap(), AnyValue::Null)
    }

    // ========================================================================
    // coerce_datetime() tests
    // ========================================================================

    #[test]
    fn test_coerce_datetime_from_strings() {
        let series = Series::new("Order Date".into(), &["2023-01-05", "11/8/2016", "garbage"]);
        let result = coerce_datetime(&series).unwrap();

        assert_eq!(result.dtype(), &millis_datetime_dtype());
        assert_eq!(result.len(), 3);
        assert!(is_null_at(&result, 2));
        assert_eq!(
            series_to_strings(&result).unwrap(),
            vec![
                Some("2023-01-05".to_string()),
                Some("2016-11-08".to_string()),
                None
            ]
        );
    }

    #[test]
    fn test_coerce_datetime_preserves_nulls() {
        let series = Series::new("Ship Date".into(), &[Some("2023-01-05"), None]);
        let result = coerce_datetime(&series).unwrap();
        assert_eq!(result.null_count(), 1);
    }

    #[test]
    fn test_coerce_datetime_from_integer_layout() {
        let series = Series::new("date_key".into(), &[20230105i64, 20231231]);
        let result = coerce_datetime(&series).unwrap();
        assert_eq!(result.null_count(), 0);
        assert_eq!(
            series_to_strings(&result).unwrap()[1],
            Some("2023-12-31".to_string())
        );
    }

    #[test]
    fn test_coerce_datetime_boolean_is_null() {
        let series = Series::new("updated_date".into(), &[true, false]);
        let result = coerce_datetime(&series).unwrap();
        assert_eq!(result.null_count(), 2);
    }

    // ========================================================================
    // coerce_numeric() tests
    // ========================================================================

    #[test]
    fn test_coerce_numeric_keeps_numeric_columns() {
        let series = Series::new("Quantity".into(), &[1i64, 2, 3]);
        let result = coerce_numeric(&series).unwrap();
        assert_eq!(result.dtype(), &DataType::Int64);
    }

    #[test]
    fn test_coerce_numeric_integer_text() {
        let series = Series::new("Postal Code".into(), &["10024", " 94110 "]);
        let result = coerce_numeric(&series).unwrap();
        assert_eq!(result.dtype(), &DataType::Int64);
        assert_eq!(result.i64().unwrap().get(1), Some(94110));
    }

    #[test]
    fn test_coerce_numeric_invalid_becomes_null() {
        let series = Series::new("Sales".into(), &["100.5", "abc", "7"]);
        let result = coerce_numeric(&series).unwrap();

        assert_eq!(result.dtype(), &DataType::Float64);
        assert_eq!(result.f64().unwrap().get(0), Some(100.5));
        assert!(is_null_at(&result, 1));
        assert_eq!(result.f64().unwrap().get(2), Some(7.0));
    }

    #[test]
    fn test_coerce_numeric_text_with_nulls_is_float() {
        let series = Series::new("Quantity".into(), &[Some("1"), None]);
        let result = coerce_numeric(&series).unwrap();
        assert_eq!(result.dtype(), &DataType::Float64);
        assert_eq!(result.null_count(), 1);
    }

    #[test]
    fn test_coerce_numeric_non_finite_floats_become_null() {
        let series = Series::new("Sales".into(), &[100.0, f64::NAN, 50.0, f64::INFINITY]);
        let result = coerce_numeric(&series).unwrap();

        assert_eq!(result.dtype(), &DataType::Float64);
        let values: Vec<Option<f64>> = result.f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(100.0), None, Some(50.0), None]);
    }

    #[test]
    fn test_coerce_numeric_non_finite_text_becomes_null() {
        let series = Series::new("Profit".into(), &["20.5", "NaN", "nan", "-inf", "3"]);
        let result = coerce_numeric(&series).unwrap();

        assert_eq!(result.dtype(), &DataType::Float64);
        let values: Vec<Option<f64>> = result.f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(20.5), None, None, None, Some(3.0)]);
    }

    #[test]
    fn test_coerce_numeric_float32_keeps_dtype() {
        let series = Series::new("Discount".into(), &[0.2f32, f32::NAN]);
        let result = coerce_numeric(&series).unwrap();
        assert_eq!(result.dtype(), &DataType::Float32);
        assert_eq!(result.null_count(), 1);
    }

    // ========================================================================
    // trim_string_values() tests
    // ========================================================================

    #[test]
    fn test_trim_string_values() {
        let series = Series::new("Region".into(), &[Some("  West "), None, Some("East")]);
        let result = trim_string_values(&series).unwrap();
        let values: Vec<Option<&str>> = result.str().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("West"), None, Some("East")]);
    }
}
