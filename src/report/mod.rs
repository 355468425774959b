//! The monthly sales report: input data, formatting and page composition.
//!
//! The layout layer knows nothing about sales; everything specific to the
//! report (which regions get pages, how figures are formatted, which rows are
//! emphasized) is decided here.

mod chart;
mod data;
mod format;
mod sales;

pub use chart::{ChartProvider, PrerenderedChart};
pub use data::{
    BrandFigures, BrandPerformance, BulkCustomer, CustomerFigures, CustomerReport, Figures,
    MonthlyForecast, RegionFigures, SalesData, CASES_REGION,
};
pub use format::{format_currency, format_number, format_percent};
pub use sales::{SalesReport, REPORT_FILENAME};
