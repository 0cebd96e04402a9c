//! Grouped aggregations over the derived order table.
//!
//! All grouping goes through polars' lazy `group_by_stable` so groups come out
//! in first-seen order, and sorting keeps that order for equal values.

use crate::config::DEFAULT_TOP_N_PRODUCTS;
use crate::types::{Aggregates, GroupDimension, GroupTable, columns};
use crate::utils::has_columns;
use anyhow::Result;
use polars::prelude::*;
use tracing::{debug, info};

/// Builds group tables, the monthly sales series and the top products table.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    top_n_products: usize,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_N_PRODUCTS)
    }
}

impl Aggregator {
    pub fn new(top_n_products: usize) -> Self {
        Self { top_n_products }
    }

    /// Run every aggregation whose source columns are present.
    pub fn aggregate(&self, df: &DataFrame) -> Result<Aggregates> {
        info!("Aggregating sales...");
        let mut aggregates = Aggregates::default();

        for dimension in GroupDimension::ALL {
            let key = dimension.column();
            if !has_columns(df, &[key, columns::SALES, columns::PROFIT]) {
                debug!("Skipping {}: missing columns", dimension.key());
                continue;
            }

            let table = sales_profit_by(df, key)?.collect()?;
            debug!("{}: {} groups", dimension.key(), table.height());
            aggregates
                .group_tables
                .push(GroupTable { dimension, table });
        }

        if has_columns(df, &[columns::ORDER_MONTH, columns::SALES]) {
            let monthly = monthly_sales(df)?;
            debug!("monthly_sales: {} months", monthly.height());
            aggregates.monthly_sales = Some(monthly);
        }

        if has_columns(
            df,
            &[columns::PRODUCT_NAME, columns::SALES, columns::PROFIT],
        ) {
            let top = sales_profit_by(df, columns::PRODUCT_NAME)?
                .limit(self.top_n_products as IdxSize)
                .collect()?;
            debug!("top products: {} rows", top.height());
            aggregates.top_products = Some(top);
        }

        info!(
            "Aggregation complete: {} group tables",
            aggregates.group_tables.len()
        );
        Ok(aggregates)
    }
}

/// Summed Sales and Profit per non-null `key`, with the margin recomputed from
/// the sums, sorted by Sales descending.
fn sales_profit_by(df: &DataFrame, key: &str) -> Result<LazyFrame> {
    let sales = col(columns::SALES).cast(DataType::Float64);
    let profit = col(columns::PROFIT).cast(DataType::Float64);

    Ok(df
        .clone()
        .lazy()
        .filter(col(key).is_not_null())
        .group_by_stable([col(key)])
        .agg([col(columns::SALES).sum(), col(columns::PROFIT).sum()])
        .with_column(
            when(sales.clone().neq(lit(0.0)))
                .then(profit / sales)
                .otherwise(lit(NULL))
                .alias(columns::PROFIT_MARGIN),
        )
        .sort(
            [columns::SALES],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_nulls_last(true)
                .with_maintain_order(true),
        ))
}

/// Summed Sales per month, ascending, rows without a month skipped.
fn monthly_sales(df: &DataFrame) -> Result<DataFrame> {
    Ok(df
        .clone()
        .lazy()
        .filter(col(columns::ORDER_MONTH).is_not_null())
        .group_by_stable([col(columns::ORDER_MONTH)])
        .agg([col(columns::SALES).sum()])
        .sort([columns::ORDER_MONTH], SortMultipleOptions::default())
        .collect()?)
}
