//! Headline KPIs over the derived order table.

use crate::types::{DateRange, KpiSummary, columns};
use crate::utils::{has_column, is_datetime_dtype, millis_to_datetime, series_to_f64, series_to_millis};
use anyhow::Result;
use polars::prelude::*;

/// Compute total sales, total profit, overall margin and order date range.
///
/// A key is only filled when its source columns exist; the margin also needs
/// a non-zero sales total and the date range a datetime `Order Date` with at
/// least one value.
pub fn compute_kpis(df: &DataFrame) -> Result<KpiSummary> {
    let total_sales = column_total(df, columns::SALES)?;
    let total_profit = column_total(df, columns::PROFIT)?;

    let overall_profit_margin = match (total_sales, total_profit) {
        (Some(sales), Some(profit)) if sales != 0.0 => Some(profit / sales),
        _ => None,
    };

    Ok(KpiSummary {
        total_sales,
        total_profit,
        overall_profit_margin,
        date_range: order_date_range(df)?,
    })
}

/// Sum of a column with nulls skipped, `None` when the column is absent.
fn column_total(df: &DataFrame, name: &str) -> Result<Option<f64>> {
    if !has_column(df, name) {
        return Ok(None);
    }
    let values = series_to_f64(df.column(name)?.as_materialized_series())?;
    Ok(Some(values.into_iter().flatten().sum()))
}

fn order_date_range(df: &DataFrame) -> Result<Option<DateRange>> {
    if !has_column(df, columns::ORDER_DATE) {
        return Ok(None);
    }
    let series = df.column(columns::ORDER_DATE)?.as_materialized_series();
    if !is_datetime_dtype(series.dtype()) {
        return Ok(None);
    }

    let millis: Vec<i64> = series_to_millis(series)?.into_iter().flatten().collect();
    let (Some(min), Some(max)) = (millis.iter().min(), millis.iter().max()) else {
        return Ok(None);
    };

    let render = |ms: i64| millis_to_datetime(ms).map(|dt| dt.format("%Y-%m-%d").to_string());
    Ok(render(*min)
        .zip(render(*max))
        .map(|(min, max)| DateRange { min, max }))
}
