use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Column names the pipeline knows about.
pub mod columns {
    pub const ORDER_DATE: &str = "Order Date";
    pub const SHIP_DATE: &str = "Ship Date";
    pub const SALES: &str = "Sales";
    pub const PROFIT: &str = "Profit";
    pub const DISCOUNT: &str = "Discount";
    pub const QUANTITY: &str = "Quantity";
    pub const POSTAL_CODE: &str = "Postal Code";
    pub const CATEGORY: &str = "Category";
    pub const SUB_CATEGORY: &str = "Sub-Category";
    pub const REGION: &str = "Region";
    pub const STATE: &str = "State";
    pub const PRODUCT_NAME: &str = "Product Name";

    // Derived
    pub const ORDER_YEAR: &str = "OrderYear";
    pub const ORDER_MONTH: &str = "OrderMonth";
    pub const SHIP_DELAY_DAYS: &str = "ShipDelayDays";
    pub const PROFIT_MARGIN: &str = "ProfitMargin";

    /// Columns coerced to numbers during cleaning.
    pub const NUMERIC: [&str; 5] = [SALES, PROFIT, DISCOUNT, QUANTITY, POSTAL_CODE];

    /// Rows missing any of these (when the column exists) are dropped.
    pub const ESSENTIAL: [&str; 3] = [ORDER_DATE, SALES, PROFIT];
}

/// Headline figures for the whole dataset.
///
/// Every field is optional: a key is only present when its source columns exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_sales: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_profit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_profit_margin: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

/// First and last order dates as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub min: String,
    pub max: String,
}

/// Per-column descriptive statistics.
#[derive(Debug, Clone)]
pub struct DescriptiveTables {
    /// count, mean, std, min, 25%, 50%, 75%, max per numeric column.
    pub numeric: DataFrame,
    /// n_unique and top per non-numeric column.
    pub categorical: DataFrame,
}

/// Categorical dimensions with a grouped sales table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupDimension {
    Category,
    SubCategory,
    Region,
    State,
}

impl GroupDimension {
    /// All dimensions in output order.
    pub const ALL: [GroupDimension; 4] = [
        GroupDimension::Category,
        GroupDimension::SubCategory,
        GroupDimension::Region,
        GroupDimension::State,
    ];

    /// Source column grouped on.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Category => columns::CATEGORY,
            Self::SubCategory => columns::SUB_CATEGORY,
            Self::Region => columns::REGION,
            Self::State => columns::STATE,
        }
    }

    /// Table name, e.g. `by_category`.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Category => "by_category",
            Self::SubCategory => "by_subcategory",
            Self::Region => "by_region",
            Self::State => "by_state",
        }
    }

    /// Output file name, e.g. `group_by_category.csv`.
    pub fn file_name(&self) -> String {
        format!("group_{}.csv", self.key())
    }
}

/// Summed Sales/Profit per value of one dimension, sorted by Sales descending.
#[derive(Debug, Clone)]
pub struct GroupTable {
    pub dimension: GroupDimension,
    pub table: DataFrame,
}

/// Everything the aggregator produces.
#[derive(Debug, Clone, Default)]
pub struct Aggregates {
    pub group_tables: Vec<GroupTable>,
    pub monthly_sales: Option<DataFrame>,
    pub top_products: Option<DataFrame>,
}

impl Aggregates {
    /// Look up the table for one dimension.
    pub fn group(&self, dimension: GroupDimension) -> Option<&DataFrame> {
        self.group_tables
            .iter()
            .find(|t| t.dimension == dimension)
            .map(|t| &t.table)
    }
}

/// Row accounting from the cleaning stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningStats {
    pub duplicates_removed: usize,
    pub rows_missing_essentials: usize,
    pub actions: Vec<String>,
}

/// Shape and timing of one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub rows_before: usize,
    pub columns_before: usize,
    pub rows_after: usize,
    pub columns_after: usize,
    pub duplicates_removed: usize,
    pub rows_missing_essentials: usize,
    pub duration_ms: u64,
}

/// Output of a full pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Cleaned table with derived columns appended.
    pub data: DataFrame,
    pub kpis: KpiSummary,
    pub descriptive: DescriptiveTables,
    pub aggregates: Aggregates,
    pub cleaning_actions: Vec<String>,
    pub summary: RunSummary,
    /// Files written, in write order. Empty when nothing was saved.
    pub artifacts: Vec<PathBuf>,
}
