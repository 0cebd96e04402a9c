//! Main orders pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating the load, clean, derive, summarize, aggregate and write stages.

use crate::aggregates::Aggregator;
use crate::cleaner::DataCleaner;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::features::FeatureDeriver;
use crate::loader::load_dataset;
use crate::profiler::{build_data_dictionary, compute_kpis, describe};
use crate::reporting::{ArtifactSet, ArtifactWriter, ChartRenderer};
use crate::types::{PipelineResult, RunSummary};
use polars::prelude::*;
use std::time::Instant;
use tracing::info;

/// The orders pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use orders_processing::{Pipeline, PipelineConfig};
///
/// // Load the configured input and write every artifact
/// let result = Pipeline::builder()
///     .config(PipelineConfig::builder().input_path("orders.csv").build()?)
///     .build()?
///     .run()?;
///
/// // In memory only, from an existing DataFrame
/// let result = Pipeline::builder()
///     .config(PipelineConfig::builder().save_to_disk(false).build()?)
///     .build()?
///     .process(dataframe)?;
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    cleaner: DataCleaner,
    deriver: FeatureDeriver,
    aggregator: Aggregator,
    charts: ChartRenderer,
}

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load `config.input_path` and process it.
    ///
    /// # Errors
    ///
    /// Load errors ([`PipelineError::FileNotFound`], [`PipelineError::UnsupportedFormat`], ...)
    /// are returned before any other stage runs.
    pub fn run(&self) -> Result<PipelineResult> {
        info!("Step 1: Loading dataset...");
        let raw = load_dataset(&self.config.input_path, &self.config.excel_sheet)?;
        self.process(raw)
    }

    /// Run every stage after loading on an in-memory table.
    ///
    /// Charts and artifacts are only written when `save_to_disk` is set.
    /// Errors are returned without logging; the caller reports them once.
    pub fn process(&self, raw: DataFrame) -> Result<PipelineResult> {
        let result = self.process_internal(raw)?;
        info!("Pipeline completed in {} ms", result.summary.duration_ms);
        Ok(result)
    }

    fn process_internal(&self, raw: DataFrame) -> Result<PipelineResult> {
        let start_time = Instant::now();

        let mut summary = RunSummary {
            rows_before: raw.height(),
            columns_before: raw.width(),
            ..Default::default()
        };

        // Step 2: Cleaning
        info!("Step 2: Cleaning dataset...");
        let (cleaned, stats) = self
            .cleaner
            .clean(&raw)
            .map_err(|e| PipelineError::CleaningFailed(e.to_string()))?;
        summary.duplicates_removed = stats.duplicates_removed;
        summary.rows_missing_essentials = stats.rows_missing_essentials;

        // Step 3: Derived columns
        info!("Step 3: Deriving features...");
        let data = self
            .deriver
            .derive(cleaned)
            .map_err(|e| PipelineError::FeatureDerivationFailed(e.to_string()))?;
        summary.rows_after = data.height();
        summary.columns_after = data.width();

        // Step 4: KPIs
        info!("Step 4: Computing KPIs...");
        let kpis = compute_kpis(&data).map_err(|e| PipelineError::SummaryFailed(e.to_string()))?;

        // Step 5: Descriptive statistics
        info!("Step 5: Computing descriptive statistics...");
        let descriptive =
            describe(&data).map_err(|e| PipelineError::SummaryFailed(e.to_string()))?;

        // Step 6: Aggregates
        info!("Step 6: Aggregating...");
        let aggregates = self
            .aggregator
            .aggregate(&data)
            .map_err(|e| PipelineError::AggregationFailed(e.to_string()))?;

        // Step 7 and 8: Artifacts and charts
        let mut artifacts = Vec::new();
        if self.config.save_to_disk {
            info!("Step 7: Saving output files...");
            let dictionary = build_data_dictionary(&data)
                .map_err(|e| PipelineError::SummaryFailed(e.to_string()))?;
            let writer = ArtifactWriter::new(&self.config.output_dir);
            artifacts = writer
                .write_all(&ArtifactSet {
                    data: &data,
                    kpis: &kpis,
                    descriptive: &descriptive,
                    aggregates: &aggregates,
                    dictionary: &dictionary,
                })
                .map_err(|e| PipelineError::ArtifactWriteFailed(e.to_string()))?;

            info!("Step 8: Rendering charts...");
            let charts = self
                .charts
                .render(&aggregates, writer.output_dir())
                .map_err(|e| PipelineError::ChartRenderFailed(e.to_string()))?;
            artifacts.extend(charts);
        } else {
            info!("Step 7: Skipping output files (save_to_disk disabled)");
        }

        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        Ok(PipelineResult {
            data,
            kpis,
            descriptive,
            aggregates,
            cleaning_actions: stats.actions,
            summary,
            artifacts,
        })
    }
}

/// Builder for [`Pipeline`].
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
}

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the pipeline, validating the configuration.
    ///
    /// # Errors
    ///
    /// [`PipelineError::InvalidConfig`] when validation fails.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            aggregator: Aggregator::new(config.top_n_products),
            config,
            cleaner: DataCleaner,
            deriver: FeatureDeriver,
            charts: ChartRenderer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GroupDimension;
    use pretty_assertions::assert_eq;

    fn in_memory() -> Pipeline {
        Pipeline::builder()
            .config(PipelineConfig::builder().save_to_disk(false).build().unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let config = PipelineConfig {
            top_n_products: 0,
            ..Default::default()
        };
        let err = Pipeline::builder().config(config).build().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_builder_defaults() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert_eq!(pipeline.config().top_n_products, 10);
        assert!(pipeline.config().save_to_disk);
    }

    #[test]
    fn test_process_in_memory() {
        let raw = df! {
            "Order Date" => ["2023-01-05", "2023-01-20", "2023-01-20"],
            "Ship Date" => ["2023-01-10", "2023-01-25", "2023-01-25"],
            "Sales" => [100.0, 50.0, 50.0],
            "Profit" => [20.0, -10.0, -10.0],
            "Category" => ["Tech", "Tech", "Tech"],
        }
        .unwrap();

        let result = in_memory().process(raw).unwrap();

        assert_eq!(result.summary.rows_before, 3);
        assert_eq!(result.summary.rows_after, 2);
        assert_eq!(result.summary.duplicates_removed, 1);
        assert_eq!(result.summary.columns_after, 9);
        assert_eq!(result.kpis.total_sales, Some(150.0));
        assert!(result.artifacts.is_empty());
        assert!(result.aggregates.group(GroupDimension::Category).is_some());
        assert!(!result.cleaning_actions.is_empty());
    }

    #[test]
    fn test_run_missing_input() {
        let config = PipelineConfig::builder()
            .input_path("no/such/orders.csv")
            .save_to_disk(false)
            .build()
            .unwrap();
        let err = Pipeline::builder().config(config).build().unwrap().run().unwrap_err();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    }
}
