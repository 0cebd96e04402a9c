//! Custom error types for the orders processing pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. Stage helpers
//! work with `anyhow::Result` internally; the pipeline maps their failures into
//! the stage-specific variants below so callers can match on what went wrong.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the orders pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input path does not exist.
    #[error("Input file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Input extension is not one of csv, xlsx, xls.
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// Workbook could not be opened or no sheet could be read.
    #[error("Failed to read workbook: {0}")]
    ExcelReadFailed(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Data cleaning failed.
    #[error("Failed to clean data: {0}")]
    CleaningFailed(String),

    /// Derived columns could not be computed.
    #[error("Failed to derive features: {0}")]
    FeatureDerivationFailed(String),

    /// KPI or descriptive statistics could not be computed.
    #[error("Failed to summarize dataset: {0}")]
    SummaryFailed(String),

    /// Grouped aggregation failed.
    #[error("Failed to aggregate dataset: {0}")]
    AggregationFailed(String),

    /// Chart rendering failed.
    #[error("Failed to render chart: {0}")]
    ChartRenderFailed(String),

    /// Writing an output artifact failed.
    #[error("Failed to write artifacts: {0}")]
    ArtifactWriteFailed(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PipelineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code, used in CLI diagnostics.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::FileNotFound(_) => "FILE_NOT_FOUND",
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::ExcelReadFailed(_) => "EXCEL_READ_FAILED",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::CleaningFailed(_) => "CLEANING_FAILED",
            Self::FeatureDerivationFailed(_) => "FEATURE_DERIVATION_FAILED",
            Self::SummaryFailed(_) => "SUMMARY_FAILED",
            Self::AggregationFailed(_) => "AGGREGATION_FAILED",
            Self::ChartRenderFailed(_) => "CHART_RENDER_FAILED",
            Self::ArtifactWriteFailed(_) => "ARTIFACT_WRITE_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error was raised while loading the input file.
    pub fn is_load_error(&self) -> bool {
        match self {
            Self::FileNotFound(_) | Self::UnsupportedFormat(_) | Self::ExcelReadFailed(_) => true,
            Self::WithContext { source, .. } => source.is_load_error(),
            _ => false,
        }
    }
}

impl From<crate::config::ConfigValidationError> for PipelineError {
    fn from(err: crate::config::ConfigValidationError) -> Self {
        PipelineError::InvalidConfig(err.to_string())
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PipelineError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PipelineError::Io(e).with_context(context))
    }
}
