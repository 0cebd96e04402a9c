use crate::error::{Result, ResultExt};
use crate::types::{Aggregates, DescriptiveTables, KpiSummary};
use crate::utils::{is_datetime_dtype, millis_to_datetime, series_to_millis};
use chrono::{NaiveTime, Timelike};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CLEAN_CSV: &str = "superstore_clean.csv";
pub const DESC_NUMERIC_CSV: &str = "desc_numeric.csv";
pub const DESC_CATEGORICAL_CSV: &str = "desc_categorical.csv";
pub const KPI_JSON: &str = "kpi_summary.json";
pub const MONTHLY_SALES_CSV: &str = "monthly_sales.csv";
pub const TOP_PRODUCTS_CSV: &str = "top10_products.csv";
pub const DATA_DICTIONARY_CSV: &str = "data_dictionary.csv";
pub const README_MD: &str = "README.md";

const README: &str = "# Orders: Cleaning & Descriptive Statistics

Outputs written by `orders-processing`.

## Files
- superstore_clean.csv: cleaned orders with derived columns
- desc_numeric.csv, desc_categorical.csv: descriptive statistics per column
- group_by_category.csv, group_by_subcategory.csv, group_by_region.csv, group_by_state.csv: sales and profit per group
- monthly_sales.csv: sales per month (when order dates are present)
- top10_products.csv: best-selling products
- kpi_summary.json: headline KPIs
- data_dictionary.csv: column types, missing counts and sample values
- sales_by_category.png, monthly_sales.png: charts
";

/// Everything the writer serializes for one run.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactSet<'a> {
    pub data: &'a DataFrame,
    pub kpis: &'a KpiSummary,
    pub descriptive: &'a DescriptiveTables,
    pub aggregates: &'a Aggregates,
    pub dictionary: &'a DataFrame,
}

/// Writes the run's tables, KPIs and README into one directory.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write every artifact, returning the paths in write order.
    ///
    /// Core tables, the KPI JSON, the data dictionary and the README are always
    /// written; group, monthly and top product tables only when they have rows.
    pub fn write_all(&self, artifacts: &ArtifactSet<'_>) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_dir).context(format!(
            "Creating output directory {}",
            self.output_dir.display()
        ))?;
        let mut written = Vec::new();

        written.push(self.write_csv(artifacts.data, CLEAN_CSV)?);
        written.push(self.write_csv(&artifacts.descriptive.numeric, DESC_NUMERIC_CSV)?);
        written.push(self.write_csv(&artifacts.descriptive.categorical, DESC_CATEGORICAL_CSV)?);
        written.push(self.write_json(artifacts.kpis, KPI_JSON)?);

        for group in &artifacts.aggregates.group_tables {
            if group.table.height() > 0 {
                written.push(self.write_csv(&group.table, &group.dimension.file_name())?);
            } else {
                debug!("Skipping empty {}", group.dimension.key());
            }
        }

        if let Some(monthly) = artifacts.aggregates.monthly_sales.as_ref().filter(|t| t.height() > 0) {
            written.push(self.write_csv(monthly, MONTHLY_SALES_CSV)?);
        }
        if let Some(top) = artifacts.aggregates.top_products.as_ref().filter(|t| t.height() > 0) {
            written.push(self.write_csv(top, TOP_PRODUCTS_CSV)?);
        }

        written.push(self.write_csv(artifacts.dictionary, DATA_DICTIONARY_CSV)?);
        written.push(self.write_text(README, README_MD)?);

        Ok(written)
    }

    fn write_csv(&self, df: &DataFrame, file_name: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(file_name);
        let mut rendered = render_temporal_columns(df)?;

        let mut file = File::create(&path).context(format!("Creating {}", path.display()))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .finish(&mut rendered)
            .context(format!("Writing {}", path.display()))?;

        info!("Saved: {}", path.display());
        Ok(path)
    }

    fn write_json(&self, kpis: &KpiSummary, file_name: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(file_name);
        let json = serde_json::to_string_pretty(kpis)?;
        fs::write(&path, json).context(format!("Writing {}", path.display()))?;
        info!("Saved: {}", path.display());
        Ok(path)
    }

    fn write_text(&self, content: &str, file_name: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(file_name);
        fs::write(&path, content).context(format!("Writing {}", path.display()))?;
        info!("Saved: {}", path.display());
        Ok(path)
    }
}

/// Replace datetime columns with text: `YYYY-MM-DD` when every value is at
/// midnight, otherwise `YYYY-MM-DD HH:MM:SS`.
pub(crate) fn render_temporal_columns(df: &DataFrame) -> Result<DataFrame> {
    let mut rendered = df.clone();

    for col in df.get_columns() {
        let series = col.as_materialized_series();
        if !is_datetime_dtype(series.dtype()) {
            continue;
        }

        let values: Vec<_> = series_to_millis(series)?
            .into_iter()
            .map(|ms| ms.and_then(millis_to_datetime))
            .collect();
        let date_only = values
            .iter()
            .flatten()
            .all(|dt| dt.time() == NaiveTime::MIN);
        let format = if date_only {
            "%Y-%m-%d"
        } else {
            "%Y-%m-%d %H:%M:%S"
        };

        let text: Vec<Option<String>> = values
            .iter()
            .map(|dt| dt.map(|dt| dt.with_nanosecond(0).unwrap_or(dt).format(format).to_string()))
            .collect();
        rendered.replace(series.name().as_str(), Series::new(series.name().clone(), text))?;
    }

    Ok(rendered)
}
