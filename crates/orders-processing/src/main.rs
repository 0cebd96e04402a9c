//! CLI entry point for the orders pipeline.

use anyhow::Result;
use clap::Parser;
use orders_processing::config::{DEFAULT_INPUT_PATH, DEFAULT_OUTPUT_DIR};
use orders_processing::{GroupDimension, Pipeline, PipelineConfig, PipelineResult};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Clean a retail orders export and write descriptive statistics",
    long_about = "Loads a CSV or Excel orders export, cleans it, derives date and margin \
                  columns, and writes descriptive tables, grouped aggregates, KPIs and charts \
                  to the output directory.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  RUST_LOG    Log filter (default: info)\n\n\
                  EXAMPLES:\n  \
                  orders-processing -i data/orders.xlsx -o reports/"
)]
struct Args {
    /// Path to the orders file (.csv, .xlsx or .xls), relative to the working directory
    #[arg(short, long, default_value = DEFAULT_INPUT_PATH)]
    input: String,

    /// Output directory for results, relative to the working directory
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output: String,
}

/// Initialize the tracing subscriber. Logs go to stderr so stdout only carries the report.
fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let config = PipelineConfig::builder()
        .input_path(&args.input)
        .output_dir(&args.output)
        .build()?;

    let result = match Pipeline::builder().config(config).build()?.run() {
        Ok(result) => result,
        Err(e) => {
            error!("Pipeline failed [{}]: {}", e.error_code(), e);
            return Err(e.into());
        }
    };

    print_report(&result)?;
    info!("Saved {} artifacts to {}", result.artifacts.len(), args.output);

    Ok(())
}

fn print_report(result: &PipelineResult) -> Result<()> {
    let (rows, cols) = result.data.shape();
    println!("Rows: {} Cols: {}", rows, cols);
    println!("KPIs:");
    println!("{}", serde_json::to_string_pretty(&result.kpis)?);

    if let Some(by_category) = result.aggregates.group(GroupDimension::Category) {
        println!("\nSales by Category (top):");
        println!("{}", by_category.head(Some(5)));
    }

    if let Some(top) = &result.aggregates.top_products {
        println!("\nTop 10 Products (by Sales):");
        println!("{}", top.head(Some(5)));
    }

    Ok(())
}
