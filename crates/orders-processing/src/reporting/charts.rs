//! PNG charts drawn with plotters' bitmap backend.
//!
//! Without the `fonts` feature plotters has no font backend and panics on any
//! text draw, so default builds emit no caption and no label areas. Bars,
//! lines and the mesh are still drawn.

use crate::types::{Aggregates, GroupDimension, columns};
use crate::utils::{series_to_f64, series_to_strings};
use anyhow::{Result, anyhow};
use plotters::prelude::*;
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name of the category bar chart.
pub const SALES_BY_CATEGORY_PNG: &str = "sales_by_category.png";
/// File name of the monthly line chart.
pub const MONTHLY_SALES_PNG: &str = "monthly_sales.png";

const CHART_SIZE: (u32, u32) = (800, 600);
const SERIES_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Text is only drawn when a font backend is compiled in.
const DRAW_TEXT: bool = cfg!(feature = "fonts");
/// Bottom and left label area sizes. Zero-sized areas are never drawn into.
const LABEL_AREAS: (u32, u32) = if DRAW_TEXT { (60, 90) } else { (0, 0) };

/// Renders the two summary charts.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChartRenderer;

impl ChartRenderer {
    /// Draw every chart whose source table exists and has rows. Returns the files written.
    pub fn render(&self, aggregates: &Aggregates, out_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        if let Some(by_category) = aggregates
            .group(GroupDimension::Category)
            .filter(|t| t.height() > 0)
        {
            let (labels, values) = labelled_sales(by_category, columns::CATEGORY)?;
            let path = out_dir.join(SALES_BY_CATEGORY_PNG);
            draw_bar_chart(&path, "Sales by Category", "Category", &labels, &values)?;
            info!("Chart saved: {}", path.display());
            written.push(path);
        }

        if let Some(monthly) = aggregates.monthly_sales.as_ref().filter(|t| t.height() > 0) {
            let (labels, values) = labelled_sales(monthly, columns::ORDER_MONTH)?;
            let path = out_dir.join(MONTHLY_SALES_PNG);
            draw_line_chart(&path, "Monthly Sales", "Month", &labels, &values)?;
            info!("Chart saved: {}", path.display());
            written.push(path);
        }

        Ok(written)
    }
}

/// Text labels from `label_col` paired with Sales values (nulls drawn as zero).
fn labelled_sales(table: &DataFrame, label_col: &str) -> Result<(Vec<String>, Vec<f64>)> {
    let labels = series_to_strings(table.column(label_col)?.as_materialized_series())?
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect();
    let values = series_to_f64(table.column(columns::SALES)?.as_materialized_series())?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect();
    Ok((labels, values))
}

/// Value axis spanning zero and every value, padded by a tenth.
fn value_range(values: &[f64]) -> std::ops::Range<f64> {
    let min = values.iter().copied().fold(0.0, f64::min);
    let max = values.iter().copied().fold(0.0, f64::max);
    let pad = ((max - min) * 0.1).max(1.0);
    let lower = if min < 0.0 { min - pad } else { 0.0 };
    lower..max + pad
}

/// Margins and label areas shared by both charts; the caption only with fonts.
fn chart_builder<'a, 'b, DB: DrawingBackend>(
    root: &'a DrawingArea<DB, plotters::coord::Shift>,
    title: &str,
) -> ChartBuilder<'a, 'b, DB> {
    let mut builder = ChartBuilder::on(root);
    builder
        .margin(20)
        .x_label_area_size(LABEL_AREAS.0)
        .y_label_area_size(LABEL_AREAS.1);
    if DRAW_TEXT {
        builder.caption(title, ("sans-serif", 28));
    }
    builder
}

fn draw_bar_chart(
    path: &Path,
    title: &str,
    x_desc: &str,
    labels: &[String],
    values: &[f64],
) -> Result<()> {
    debug!("Drawing bar chart with {} bars", values.len());
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_error)?;

    let mut chart = chart_builder(&root, title)
        .build_cartesian_2d(
            (0u32..values.len() as u32).into_segmented(),
            value_range(values),
        )
        .map_err(draw_error)?;

    let label_for = |v: &SegmentValue<u32>| match v {
        SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(x_desc)
        .y_desc("Sales")
        .x_label_formatter(&label_for)
        .draw()
        .map_err(draw_error)?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(SERIES_COLOR.filled())
                .margin(12)
                .data(values.iter().enumerate().map(|(i, v)| (i as u32, *v))),
        )
        .map_err(draw_error)?;

    root.present().map_err(draw_error)?;
    Ok(())
}

fn draw_line_chart(
    path: &Path,
    title: &str,
    x_desc: &str,
    labels: &[String],
    values: &[f64],
) -> Result<()> {
    debug!("Drawing line chart with {} points", values.len());
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_error)?;

    let last = values.len().saturating_sub(1).max(1);
    let mut chart = chart_builder(&root, title)
        .build_cartesian_2d(0usize..last, value_range(values))
        .map_err(draw_error)?;

    let label_for = |i: &usize| labels.get(*i).cloned().unwrap_or_default();
    chart
        .configure_mesh()
        .x_labels(labels.len().min(12))
        .x_desc(x_desc)
        .y_desc("Sales")
        .x_label_formatter(&label_for)
        .draw()
        .map_err(draw_error)?;

    chart
        .draw_series(LineSeries::new(
            values.iter().enumerate().map(|(i, v)| (i, *v)),
            SERIES_COLOR.stroke_width(2),
        ))
        .map_err(draw_error)?;

    root.present().map_err(draw_error)?;
    Ok(())
}

fn draw_error<E: std::fmt::Display>(e: E) -> anyhow::Error {
    anyhow!("drawing failed: {}", e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GroupTable;
    use crate::utils::datetime_series;
    use polars::df;

    fn category_table() -> DataFrame {
        df! {
            "Category" => ["Technology", "Furniture", "Office Supplies"],
            "Sales" => [836154.03, 741999.80, 719047.03],
            "Profit" => [145454.95, 18451.27, 122490.80],
        }
        .unwrap()
    }

    #[test]
    fn test_value_range_spans_zero() {
        let range = value_range(&[10.0, 50.0]);
        assert_eq!(range.start, 0.0);
        assert!(range.end > 50.0);

        let negative = value_range(&[-20.0, 10.0]);
        assert!(negative.start < -20.0);

        let flat = value_range(&[0.0]);
        assert!(flat.end > flat.start);
    }

    #[test]
    fn test_renders_both_charts() {
        let dir = tempfile::tempdir().unwrap();
        let jan = 1_672_531_200_000i64;
        let feb = 1_675_209_600_000i64;
        let mut monthly = df! { "Sales" => [120.5, 80.0] }.unwrap();
        monthly
            .with_column(datetime_series("OrderMonth", vec![Some(jan), Some(feb)]).unwrap())
            .unwrap();

        let aggregates = Aggregates {
            group_tables: vec![GroupTable {
                dimension: GroupDimension::Category,
                table: category_table(),
            }],
            monthly_sales: Some(monthly),
            top_products: None,
        };

        let written = ChartRenderer.render(&aggregates, dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        for path in &written {
            assert!(path.exists());
            assert!(std::fs::metadata(path).unwrap().len() > 0);
        }
    }

    #[test]
    fn test_single_month_renders() {
        let dir = tempfile::tempdir().unwrap();
        let mut monthly = df! { "Sales" => [42.0] }.unwrap();
        monthly
            .with_column(datetime_series("OrderMonth", vec![Some(0)]).unwrap())
            .unwrap();
        let aggregates = Aggregates {
            monthly_sales: Some(monthly),
            ..Default::default()
        };

        let written = ChartRenderer.render(&aggregates, dir.path()).unwrap();
        assert_eq!(written, vec![dir.path().join(MONTHLY_SALES_PNG)]);
    }

    #[test]
    fn test_category_chart_is_png_without_font_backend() {
        if !DRAW_TEXT {
            assert_eq!(LABEL_AREAS, (0, 0));
        }

        let dir = tempfile::tempdir().unwrap();
        let aggregates = Aggregates {
            group_tables: vec![GroupTable {
                dimension: GroupDimension::Category,
                table: category_table(),
            }],
            ..Default::default()
        };

        let written = ChartRenderer.render(&aggregates, dir.path()).unwrap();
        assert_eq!(written, vec![dir.path().join(SALES_BY_CATEGORY_PNG)]);
        let bytes = std::fs::read(&written[0]).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_no_tables_no_charts() {
        let dir = tempfile::tempdir().unwrap();
        let written = ChartRenderer
            .render(&Aggregates::default(), dir.path())
            .unwrap();
        assert!(written.is_empty());
        assert!(!dir.path().join(SALES_BY_CATEGORY_PNG).exists());
    }
}
