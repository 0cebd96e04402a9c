//! Data cleaning module for order datasets.
//!
//! This module provides functionality for:
//! - Normalizing column names
//! - Coercing date-like and known numeric columns
//! - Trimming text values
//! - Removing duplicate rows
//! - Dropping rows that miss essential fields

mod converters;

use crate::types::{CleaningStats, columns};
use crate::utils::{dedupe_names, has_column};
use anyhow::Result;
use converters::{coerce_datetime, coerce_numeric, trim_string_values};
use polars::prelude::*;
use tracing::{debug, info};

/// Data cleaner for order datasets.
#[derive(Debug, Default, Clone, Copy)]
pub struct DataCleaner;

impl DataCleaner {
    /// Clean a copy of `df`. The input frame is left untouched.
    ///
    /// Steps run in a fixed order so that duplicates are detected on coerced
    /// values and the essential-field filter sees nulls produced by coercion:
    /// 1. Strip whitespace from column names
    /// 2. Parse every column whose name contains "date" into a datetime
    /// 3. Parse Sales, Profit, Discount, Quantity and Postal Code as numbers
    /// 4. Trim whitespace from text values
    /// 5. Remove exact duplicate rows, keeping the first occurrence
    /// 6. Drop rows missing Order Date, Sales or Profit (whichever exist)
    pub fn clean(&self, df: &DataFrame) -> Result<(DataFrame, CleaningStats)> {
        let mut stats = CleaningStats::default();

        info!("Performing data cleaning...");

        // 1. Column names
        let mut df = normalize_column_names(df)?;

        // 2. Dates
        let date_columns: Vec<String> = df
            .get_column_names()
            .into_iter()
            .filter(|name| name.to_lowercase().contains("date"))
            .map(|name| name.to_string())
            .collect();
        for name in &date_columns {
            let series = df.column(name)?.as_materialized_series().clone();
            let before_nulls = series.null_count();
            let converted = coerce_datetime(&series)?;
            let unparsable = converted.null_count().saturating_sub(before_nulls);
            df.replace(name, converted)?;
            debug!("Parsed '{}' as datetime ({} unparsable values)", name, unparsable);
        }
        if !date_columns.is_empty() {
            stats.actions.push(format!(
                "Parsed {} date columns: {:?}",
                date_columns.len(),
                date_columns
            ));
        }

        // 3. Numerics
        let mut numeric_columns = Vec::new();
        for name in columns::NUMERIC {
            if !has_column(&df, name) {
                continue;
            }
            let series = df.column(name)?.as_materialized_series().clone();
            let converted = coerce_numeric(&series)?;
            debug!("Coerced '{}' to {}", name, converted.dtype());
            df.replace(name, converted)?;
            numeric_columns.push(name);
        }
        if !numeric_columns.is_empty() {
            stats.actions.push(format!(
                "Coerced {} numeric columns: {:?}",
                numeric_columns.len(),
                numeric_columns
            ));
        }

        // 4. Strings
        let text_columns: Vec<String> = df
            .get_columns()
            .iter()
            .filter(|col| col.dtype() == &DataType::String)
            .map(|col| col.name().to_string())
            .collect();
        for name in &text_columns {
            let trimmed = trim_string_values(df.column(name)?.as_materialized_series())?;
            df.replace(name, trimmed)?;
        }
        debug!("Trimmed whitespace in {} text columns", text_columns.len());

        // 5. Duplicates
        let before_duplicates = df.height();
        df = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
        stats.duplicates_removed = before_duplicates - df.height();

        if stats.duplicates_removed > 0 {
            let pct = (stats.duplicates_removed as f64 / before_duplicates as f64) * 100.0;
            stats.actions.push(format!(
                "Removed {} duplicate rows ({:.1}%)",
                stats.duplicates_removed, pct
            ));
            debug!("Removed {} duplicate rows", stats.duplicates_removed);
        } else {
            stats.actions.push("No duplicate rows found".to_string());
            debug!("No duplicate rows found");
        }

        // 6. Essential fields
        let essential: Vec<&str> = columns::ESSENTIAL
            .into_iter()
            .filter(|name| has_column(&df, name))
            .collect();

        if essential.is_empty() {
            stats
                .actions
                .push("No essential columns present; no rows dropped".to_string());
        } else {
            let before_rows = df.height();
            df = drop_rows_missing(&df, &essential)?;
            stats.rows_missing_essentials = before_rows - df.height();

            if stats.rows_missing_essentials > 0 {
                stats.actions.push(format!(
                    "Removed {} rows missing essential fields {:?}",
                    stats.rows_missing_essentials, essential
                ));
                debug!(
                    "Removed {} rows missing essential fields",
                    stats.rows_missing_essentials
                );
            } else {
                stats
                    .actions
                    .push("No rows missing essential fields".to_string());
            }
        }

        info!("Cleaning complete: {:?}", df.shape());
        Ok((df, stats))
    }
}

/// Strip leading/trailing whitespace from every column name. Names that
/// collide after trimming get `.1`, `.2`, ... suffixes in column order.
fn normalize_column_names(df: &DataFrame) -> Result<DataFrame> {
    let names = dedupe_names(
        df.get_column_names()
            .into_iter()
            .map(|name| name.trim().to_string()),
    );

    let renamed: Vec<Column> = df
        .get_columns()
        .iter()
        .zip(names)
        .map(|(col, name)| {
            if name == col.name().as_str() {
                col.clone()
            } else {
                debug!("Renamed column '{}' to '{}'", col.name(), name);
                col.as_materialized_series()
                    .clone()
                    .with_name(name.into())
                    .into_column()
            }
        })
        .collect();

    Ok(DataFrame::new(renamed)?)
}

/// Keep only rows where every listed column is non-null.
fn drop_rows_missing(df: &DataFrame, required: &[&str]) -> Result<DataFrame> {
    let mut mask = BooleanChunked::full("mask".into(), true, df.height());
    for name in required {
        let present = df.column(name)?.as_materialized_series().is_not_null();
        mask = &mask & &present;
    }
    Ok(df.filter(&mask)?)
}
