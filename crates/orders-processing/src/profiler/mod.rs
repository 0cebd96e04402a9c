//! Data profiling module for the derived order table.
//!
//! This module provides:
//! - Headline KPIs (totals, overall margin, order date range)
//! - Descriptive statistics for numeric and categorical columns
//! - A per-column data dictionary

mod kpi;
mod statistics;

pub use kpi::compute_kpis;
pub use statistics::describe;

use crate::utils::first_non_null_string;
use anyhow::Result;
use polars::prelude::*;

/// Build the data dictionary: one row per column with its dtype, missing
/// count and first non-null value.
pub fn build_data_dictionary(df: &DataFrame) -> Result<DataFrame> {
    let width = df.width();
    let mut names = Vec::with_capacity(width);
    let mut dtypes = Vec::with_capacity(width);
    let mut missing = Vec::with_capacity(width);
    let mut samples = Vec::with_capacity(width);

    for col in df.get_columns() {
        let series = col.as_materialized_series();
        names.push(series.name().to_string());
        dtypes.push(series.dtype().to_string());
        missing.push(series.null_count() as u64);
        samples.push(first_non_null_string(series)?);
    }

    Ok(DataFrame::new(vec![
        Series::new("column".into(), names).into_column(),
        Series::new("dtype".into(), dtypes).into_column(),
        Series::new("n_missing".into(), missing).into_column(),
        Series::new("sample_value".into(), samples).into_column(),
    ])?)
}
