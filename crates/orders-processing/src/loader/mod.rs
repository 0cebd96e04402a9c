//! Dataset loading.
//!
//! Reads a single CSV or Excel file into a polars `DataFrame`. CSV files go
//! through a small ladder of reader strategies so that odd encodings or
//! columns with conflicting types still load; Excel files prefer a named
//! sheet and fall back to the first one.

mod excel;

pub use excel::load_excel;

use crate::error::{PipelineError, Result, ResultExt};
use polars::io::csv::read::{CsvEncoding, CsvParseOptions, CsvReadOptions};
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Supported input file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Excel,
}

impl InputFormat {
    /// Detect the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" | "xls" => Ok(Self::Excel),
            "" => Err(PipelineError::UnsupportedFormat(String::new())),
            other => Err(PipelineError::UnsupportedFormat(format!(".{}", other))),
        }
    }
}

/// Load a dataset from disk.
///
/// # Errors
///
/// - [`PipelineError::FileNotFound`] when `path` does not exist.
/// - [`PipelineError::UnsupportedFormat`] when the extension is not csv, xlsx or xls.
/// - Reader errors for files that exist but cannot be parsed.
pub fn load_dataset(path: &Path, excel_sheet: &str) -> Result<DataFrame> {
    if !path.exists() {
        return Err(PipelineError::FileNotFound(path.to_path_buf()));
    }

    let format = InputFormat::from_path(path)?;

    info!("Loading dataset from: {}", path.display());
    let df = match format {
        InputFormat::Csv => load_csv_with_fallbacks(path)?,
        InputFormat::Excel => load_excel(path, excel_sheet)?,
    };
    info!("Dataset loaded successfully: {:?}", df.shape());

    Ok(df)
}

/// Read a CSV file, trying progressively more forgiving reader settings.
pub fn load_csv_with_fallbacks(path: &Path) -> Result<DataFrame> {
    // Strategy 1: Standard loading with full schema inference
    match CsvReadOptions::default()
        .with_infer_schema_length(None)
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Standard loading failed: {}", e);
        }
    }

    // Strategy 2: Lossy UTF-8 for exports written in a legacy encoding
    match CsvReadOptions::default()
        .with_infer_schema_length(None)
        .with_has_header(true)
        .with_parse_options(
            CsvParseOptions::default()
                .with_quote_char(Some(b'"'))
                .with_encoding(CsvEncoding::LossyUtf8),
        )
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
    {
        Ok(df) => {
            warn!(
                "{} is not valid UTF-8; invalid bytes were replaced",
                path.display()
            );
            return Ok(df);
        }
        Err(e) => {
            debug!("Lossy UTF-8 loading failed: {}", e);
        }
    }

    // Strategy 3: Every column as text; cleaning coerces the known columns later
    warn!(
        "Schema inference failed for {}; reading all columns as text",
        path.display()
    );
    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(0))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_encoding(CsvEncoding::LossyUtf8))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .context(format!("Reading {} as text", path.display()))?;

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content).unwrap();
        path
    }

    #[test]
    fn test_input_format_detection() {
        assert_eq!(
            InputFormat::from_path(Path::new("orders.csv")).unwrap(),
            InputFormat::Csv
        );
        assert_eq!(
            InputFormat::from_path(Path::new("orders.XLSX")).unwrap(),
            InputFormat::Excel
        );
        assert_eq!(
            InputFormat::from_path(Path::new("orders.xls")).unwrap(),
            InputFormat::Excel
        );
    }

    #[test]
    fn test_unsupported_extension() {
        let err = InputFormat::from_path(Path::new("orders.txt")).unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat(ref ext) if ext == ".txt"));

        let err = InputFormat::from_path(Path::new("orders")).unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = load_dataset(Path::new("does/not/exist.csv"), "Orders").unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound(_)));
    }

    #[test]
    fn test_txt_file_rejected_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "orders.txt", b"Sales,Profit\n1,2\n");

        let err = load_dataset(&path, "Orders").unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
    }

    #[test]
    fn test_load_csv_infers_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "orders.csv",
            b"Order Date,Sales,Category\n2023-01-05,100.5,Tech\n2023-01-20,50,Office\n",
        );

        let df = load_dataset(&path, "Orders").unwrap();
        assert_eq!(df.shape(), (2, 3));
        assert_eq!(df.column("Sales").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("Category").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_load_csv_with_latin1_bytes() {
        let dir = tempfile::tempdir().unwrap();
        // 0xE9 is 'é' in Latin-1 and invalid on its own in UTF-8
        let path = write_temp(
            &dir,
            "orders.csv",
            b"Customer,Sales\nRen\xE9,10\nAnna,20\n",
        );

        let df = load_csv_with_fallbacks(&path).unwrap();
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn test_empty_csv_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "empty.csv", b"");

        let err = load_csv_with_fallbacks(&path).unwrap_err();
        assert_eq!(err.error_code(), "POLARS_ERROR");
        assert!(err.to_string().starts_with("Reading "));
        assert!(err.to_string().contains("empty.csv"));
    }
}
