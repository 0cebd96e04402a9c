//! Output generation module.
//!
//! This module provides functionality for writing a run's results to disk:
//! - [`ArtifactWriter`] serializes the cleaned table, descriptive tables,
//!   group tables, KPI JSON, data dictionary and a README
//! - [`ChartRenderer`] draws the category bar chart and monthly line chart
//!
//! # Example
//!
//! ```rust,ignore
//! use orders_processing::reporting::{ArtifactSet, ArtifactWriter, ChartRenderer};
//!
//! let writer = ArtifactWriter::new("outputs");
//! let mut written = writer.write_all(&ArtifactSet {
//!     data: &result.data,
//!     kpis: &result.kpis,
//!     descriptive: &result.descriptive,
//!     aggregates: &result.aggregates,
//!     dictionary: &dictionary,
//! })?;
//! written.extend(ChartRenderer.render(&result.aggregates, writer.output_dir())?);
//! ```

mod charts;
mod writer;

pub use charts::{ChartRenderer, MONTHLY_SALES_PNG, SALES_BY_CATEGORY_PNG};
pub use writer::{
    ArtifactSet, ArtifactWriter, CLEAN_CSV, DATA_DICTIONARY_CSV, DESC_CATEGORICAL_CSV,
    DESC_NUMERIC_CSV, KPI_JSON, MONTHLY_SALES_CSV, README_MD, TOP_PRODUCTS_CSV,
};
