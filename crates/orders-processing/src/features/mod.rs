//! Derived columns appended to the cleaned order table.
//!
//! Each column is only added when its source columns are present:
//! - `OrderYear` and `OrderMonth` need a datetime `Order Date`
//! - `ShipDelayDays` additionally needs a datetime `Ship Date`
//! - `ProfitMargin` needs numeric `Sales` and `Profit`

use crate::types::columns;
use crate::utils::{
    datetime_series, datetime_to_millis, has_column, is_datetime_dtype, is_numeric_dtype,
    millis_to_datetime, series_to_f64, series_to_millis,
};
use anyhow::Result;
use chrono::{Datelike, NaiveDate, NaiveTime};
use polars::prelude::*;
use tracing::{debug, info, warn};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Appends derived columns to a cleaned table.
#[derive(Debug, Default, Clone, Copy)]
pub struct FeatureDeriver;

impl FeatureDeriver {
    /// Append every derivable column. Existing columns with the same names are replaced.
    pub fn derive(&self, mut df: DataFrame) -> Result<DataFrame> {
        info!("Deriving features...");

        let order_millis = datetime_column_millis(&df, columns::ORDER_DATE)?;

        if let Some(order) = &order_millis {
            df.with_column(order_year(order))?;
            df.with_column(order_month(order)?)?;
            debug!("Added {} and {}", columns::ORDER_YEAR, columns::ORDER_MONTH);

            if let Some(ship) = datetime_column_millis(&df, columns::SHIP_DATE)? {
                df.with_column(ship_delay_days(order, &ship))?;
                debug!("Added {}", columns::SHIP_DELAY_DAYS);
            }
        }

        if let Some(margin) = profit_margin(&df)? {
            df.with_column(margin)?;
            debug!("Added {}", columns::PROFIT_MARGIN);
        }

        info!("Feature derivation complete: {:?}", df.shape());
        Ok(df)
    }
}

/// Epoch milliseconds of a date column, or `None` if it is absent or not temporal.
fn datetime_column_millis(df: &DataFrame, name: &str) -> Result<Option<Vec<Option<i64>>>> {
    if !has_column(df, name) {
        return Ok(None);
    }

    let series = df.column(name)?.as_materialized_series();
    if !is_datetime_dtype(series.dtype()) {
        warn!(
            "Column '{}' is {} rather than a datetime; skipping derived date features",
            name,
            series.dtype()
        );
        return Ok(None);
    }

    Ok(Some(series_to_millis(series)?))
}

fn order_year(order: &[Option<i64>]) -> Series {
    let years: Vec<Option<i32>> = order
        .iter()
        .map(|ms| ms.and_then(millis_to_datetime).map(|dt| dt.year()))
        .collect();
    Series::new(columns::ORDER_YEAR.into(), years)
}

fn order_month(order: &[Option<i64>]) -> Result<Series> {
    let months: Vec<Option<i64>> = order
        .iter()
        .map(|ms| {
            ms.and_then(millis_to_datetime)
                .and_then(|dt| NaiveDate::from_ymd_opt(dt.year(), dt.month(), 1))
                .map(|first| datetime_to_millis(first.and_time(NaiveTime::MIN)))
        })
        .collect();
    Ok(datetime_series(columns::ORDER_MONTH, months)?)
}

/// Whole days between order and shipment, rounded toward negative infinity.
fn ship_delay_days(order: &[Option<i64>], ship: &[Option<i64>]) -> Series {
    let delays: Vec<Option<i64>> = order
        .iter()
        .zip(ship)
        .map(|(o, s)| match (o, s) {
            (Some(o), Some(s)) => Some((s - o).div_euclid(MILLIS_PER_DAY)),
            _ => None,
        })
        .collect();
    Series::new(columns::SHIP_DELAY_DAYS.into(), delays)
}

fn profit_margin(df: &DataFrame) -> Result<Option<Series>> {
    if !has_column(df, columns::SALES) || !has_column(df, columns::PROFIT) {
        return Ok(None);
    }

    let sales = df.column(columns::SALES)?.as_materialized_series();
    let profit = df.column(columns::PROFIT)?.as_materialized_series();
    if !is_numeric_dtype(sales.dtype()) || !is_numeric_dtype(profit.dtype()) {
        warn!("Sales or Profit is not numeric; skipping {}", columns::PROFIT_MARGIN);
        return Ok(None);
    }

    let margins: Vec<Option<f64>> = series_to_f64(sales)?
        .into_iter()
        .zip(series_to_f64(profit)?)
        .map(|(sales, profit)| match (sales, profit) {
            (Some(s), Some(p)) if s != 0.0 => Some(p / s),
            _ => None,
        })
        .collect();

    Ok(Some(Series::new(columns::PROFIT_MARGIN.into(), margins)))
}
