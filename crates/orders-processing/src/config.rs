//! Configuration types for the orders pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default input file, relative to the working directory.
pub const DEFAULT_INPUT_PATH: &str = "data/US Superstore data - Orders.csv";

/// Default output directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";

/// Sheet preferred when the input is an Excel workbook.
pub const DEFAULT_EXCEL_SHEET: &str = "Orders";

/// Number of rows kept in the top products table.
pub const DEFAULT_TOP_N_PRODUCTS: usize = 10;

/// Configuration for the orders pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use orders_processing::config::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .input_path("data/orders.xlsx")
///     .output_dir("reports")
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Input dataset (`.csv`, `.xlsx` or `.xls`).
    /// Default: "data/US Superstore data - Orders.csv"
    pub input_path: PathBuf,

    /// Directory receiving every output artifact. Created if absent.
    /// Default: "outputs"
    pub output_dir: PathBuf,

    /// Sheet tried first for Excel inputs before falling back to the first sheet.
    /// Default: "Orders"
    pub excel_sheet: String,

    /// Number of products kept in the top products table.
    /// Default: 10
    pub top_n_products: usize,

    /// Whether to render charts and write artifacts to disk.
    /// When false, results are kept in memory only.
    /// Default: true
    pub save_to_disk: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            excel_sheet: DEFAULT_EXCEL_SHEET.to_string(),
            top_n_products: DEFAULT_TOP_N_PRODUCTS,
            save_to_disk: true,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.top_n_products == 0 {
            return Err(ConfigValidationError::InvalidTopN(self.top_n_products));
        }

        if self.excel_sheet.trim().is_empty() {
            return Err(ConfigValidationError::EmptySheetName);
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigValidationError::EmptyPath("output_dir".to_string()));
        }

        if self.input_path.as_os_str().is_empty() {
            return Err(ConfigValidationError::EmptyPath("input_path".to_string()));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid top products count: {0} (must be at least 1)")]
    InvalidTopN(usize),

    #[error("Excel sheet name must not be empty")]
    EmptySheetName,

    #[error("Path for '{0}' must not be empty")]
    EmptyPath(String),
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    input_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    excel_sheet: Option<String>,
    top_n_products: Option<usize>,
    save_to_disk: Option<bool>,
}

impl PipelineConfigBuilder {
    /// Set the input dataset path.
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    /// Set the output directory for artifacts.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the preferred Excel sheet.
    pub fn excel_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.excel_sheet = Some(sheet.into());
        self
    }

    /// Set how many products the top products table keeps.
    pub fn top_n_products(mut self, n: usize) -> Self {
        self.top_n_products = Some(n);
        self
    }

    /// Enable or disable writing charts and artifacts.
    pub fn save_to_disk(mut self, save: bool) -> Self {
        self.save_to_disk = Some(save);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let config = PipelineConfig {
            input_path: self
                .input_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_PATH)),
            output_dir: self
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            excel_sheet: self
                .excel_sheet
                .unwrap_or_else(|| DEFAULT_EXCEL_SHEET.to_string()),
            top_n_products: self.top_n_products.unwrap_or(DEFAULT_TOP_N_PRODUCTS),
            save_to_disk: self.save_to_disk.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.input_path, PathBuf::from(DEFAULT_INPUT_PATH));
        assert_eq!(config.output_dir, PathBuf::from("outputs"));
        assert_eq!(config.excel_sheet, "Orders");
        assert_eq!(config.top_n_products, 10);
        assert!(config.save_to_disk);
    }

    #[test]
    fn test_builder_defaults() {
        let config = PipelineConfig::builder().build().unwrap();
        assert_eq!(config.top_n_products, 10);
        assert_eq!(config.excel_sheet, "Orders");
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PipelineConfig::builder()
            .input_path("orders.xlsx")
            .output_dir("reports")
            .excel_sheet("Sheet1")
            .top_n_products(5)
            .save_to_disk(false)
            .build()
            .unwrap();

        assert_eq!(config.input_path, PathBuf::from("orders.xlsx"));
        assert_eq!(config.output_dir, PathBuf::from("reports"));
        assert_eq!(config.excel_sheet, "Sheet1");
        assert_eq!(config.top_n_products, 5);
        assert!(!config.save_to_disk);
    }

    #[test]
    fn test_validation_invalid_top_n() {
        let result = PipelineConfig::builder().top_n_products(0).build();

        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidTopN(0)
        ));
    }

    #[test]
    fn test_validation_blank_sheet_name() {
        let result = PipelineConfig::builder().excel_sheet("  ").build();

        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptySheetName
        ));
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "input_path": "data/orders.csv",
            "output_dir": "custom_output",
            "excel_sheet": "Orders",
            "top_n_products": 3,
            "save_to_disk": false
        }"#;

        let config: PipelineConfig = serde_json::from_str(json).expect("Should deserialize");

        assert_eq!(config.output_dir.to_str().unwrap(), "custom_output");
        assert_eq!(config.top_n_products, 3);
        assert!(!config.save_to_disk);
        assert!(config.validate().is_ok());
    }
}
