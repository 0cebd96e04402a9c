//! Statistical summaries for column profiling.

use crate::types::DescriptiveTables;
use crate::utils::{is_numeric_dtype, series_to_f64, series_to_strings};
use anyhow::Result;
use polars::prelude::*;
use std::collections::HashMap;

/// Numeric summary of one column.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct NumericSummary {
    pub count: u64,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Build the numeric and categorical descriptive tables.
///
/// Numeric columns are integer or float typed; every other column (text,
/// datetime, boolean) goes to the categorical table. Both tables list the
/// source column name first, in frame order.
pub fn describe(df: &DataFrame) -> Result<DescriptiveTables> {
    let mut numeric_names = Vec::new();
    let mut numeric_stats = Vec::new();
    let mut categorical_names = Vec::new();
    let mut n_unique = Vec::new();
    let mut top = Vec::new();

    for col in df.get_columns() {
        let series = col.as_materialized_series();
        if is_numeric_dtype(series.dtype()) {
            numeric_names.push(series.name().to_string());
            numeric_stats.push(summarize_numeric(series)?);
        } else {
            let (unique, most_frequent) = summarize_categorical(series)?;
            categorical_names.push(series.name().to_string());
            n_unique.push(unique as u64);
            top.push(most_frequent);
        }
    }

    let pick = |f: fn(&NumericSummary) -> Option<f64>| -> Vec<Option<f64>> {
        numeric_stats.iter().map(f).collect()
    };

    let numeric = DataFrame::new(vec![
        Series::new("column".into(), numeric_names).into_column(),
        Series::new(
            "count".into(),
            numeric_stats.iter().map(|s| s.count).collect::<Vec<u64>>(),
        )
        .into_column(),
        Series::new("mean".into(), pick(|s| s.mean)).into_column(),
        Series::new("std".into(), pick(|s| s.std)).into_column(),
        Series::new("min".into(), pick(|s| s.min)).into_column(),
        Series::new("25%".into(), pick(|s| s.q25)).into_column(),
        Series::new("50%".into(), pick(|s| s.median)).into_column(),
        Series::new("75%".into(), pick(|s| s.q75)).into_column(),
        Series::new("max".into(), pick(|s| s.max)).into_column(),
    ])?;

    let categorical = DataFrame::new(vec![
        Series::new("column".into(), categorical_names).into_column(),
        Series::new("n_unique".into(), n_unique).into_column(),
        Series::new("top".into(), top).into_column(),
    ])?;

    Ok(DescriptiveTables {
        numeric,
        categorical,
    })
}

/// count, mean, sample std, min, quartiles and max of a numeric column.
pub(crate) fn summarize_numeric(series: &Series) -> Result<NumericSummary> {
    let mut values: Vec<f64> = series_to_f64(series)?.into_iter().flatten().collect();
    if values.is_empty() {
        return Ok(NumericSummary::default());
    }

    values.sort_by(f64::total_cmp);
    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;

    Ok(NumericSummary {
        count: n as u64,
        mean: Some(mean),
        std: calculate_std(&values, mean),
        min: values.first().copied(),
        q25: percentile(&values, 0.25),
        median: percentile(&values, 0.5),
        q75: percentile(&values, 0.75),
        max: values.last().copied(),
    })
}

/// Sample standard deviation (ddof = 1); `None` below two values.
pub(crate) fn calculate_std(values: &[f64], mean: f64) -> Option<f64> {
    let n = values.len() as f64;
    if n < 2.0 {
        return None;
    }

    let variance: f64 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}

/// Percentile of sorted values, interpolating linearly between the closest ranks.
pub(crate) fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let pos = p * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let fraction = pos - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Distinct non-null count and most frequent value (first seen wins ties).
pub(crate) fn summarize_categorical(series: &Series) -> Result<(usize, Option<String>)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();

    for value in series_to_strings(series)?.into_iter().flatten() {
        let count = counts.entry(value).or_insert_with_key(|key| {
            first_seen.push(key.clone());
            0
        });
        *count += 1;
    }

    let mut top: Option<(&String, usize)> = None;
    for value in &first_seen {
        let count = counts.get(value).copied().unwrap_or(0);
        if top.is_none_or(|(_, best)| count > best) {
            top = Some((value, count));
        }
    }

    Ok((first_seen.len(), top.map(|(value, _)| value.clone())))
}
