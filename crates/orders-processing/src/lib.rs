//! Retail Orders Processing Library
//!
//! Cleans a retail orders export (CSV or Excel) and produces descriptive
//! statistics, headline KPIs, grouped aggregates and charts, built on Polars.
//!
//! # Overview
//!
//! The pipeline runs these stages in order:
//!
//! - **Loading**: CSV with encoding/inference fallbacks, or an Excel sheet (prefers `Orders`)
//! - **Cleaning**: Column name trimming, date and numeric coercion, deduplication,
//!   dropping rows without Order Date, Sales or Profit
//! - **Feature Derivation**: OrderYear, OrderMonth, ShipDelayDays, ProfitMargin
//! - **Profiling**: KPI summary, numeric/categorical descriptive tables, data dictionary
//! - **Aggregation**: Sales/Profit by Category, Sub-Category, Region and State,
//!   monthly sales, top products
//! - **Reporting**: CSV/JSON/README artifacts and two PNG charts
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use orders_processing::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::builder()
//!     .input_path("data/orders.csv")
//!     .output_dir("outputs")
//!     .build()?;
//!
//! let result = Pipeline::builder().config(config).build()?.run()?;
//!
//! println!("Rows: {}", result.data.height());
//! println!("{}", serde_json::to_string_pretty(&result.kpis)?);
//! ```
//!
//! # Using the stages directly
//!
//! ```rust,ignore
//! use orders_processing::{DataCleaner, FeatureDeriver, compute_kpis, load_dataset};
//!
//! let raw = load_dataset("orders.csv".as_ref(), "Orders")?;
//! let (cleaned, stats) = DataCleaner.clean(&raw)?;
//! let derived = FeatureDeriver.derive(cleaned)?;
//! let kpis = compute_kpis(&derived)?;
//! ```

pub mod aggregates;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod features;
pub mod loader;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use aggregates::Aggregator;
pub use cleaner::DataCleaner;
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use error::{PipelineError, ResultExt};
pub use features::FeatureDeriver;
pub use loader::{InputFormat, load_dataset};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use profiler::{build_data_dictionary, compute_kpis, describe};
pub use reporting::{ArtifactSet, ArtifactWriter, ChartRenderer};
pub use types::{
    Aggregates, CleaningStats, DateRange, DescriptiveTables, GroupDimension, GroupTable,
    KpiSummary, PipelineResult, RunSummary,
};
pub use utils::{is_numeric_dtype, parse_datetime_str};
