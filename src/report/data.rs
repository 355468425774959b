//! Sales report input data.
//!
//! The JSON shape is the one produced by the upstream sales queries: camelCase
//! keys, figures as numbers or `null`.

use crate::error::Result;
use crate::layout::{Row, RowKind, Status};
use chrono::NaiveDate;
use serde::Deserialize;

/// Region value of the emphasized cases subtotal row.
pub const CASES_REGION: &str = "CASES";

/// The seven period figures shared by regions, customers and brands.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Figures {
    /// Actual for the report month
    pub actual_month: Option<f64>,
    /// Actual year to date
    #[serde(rename = "actualYTD")]
    pub actual_ytd: Option<f64>,
    /// Budget year to date
    #[serde(rename = "budgetYTD")]
    pub budget_ytd: Option<f64>,
    /// Year-to-date variance as a ratio
    #[serde(rename = "varYTD")]
    pub var_ytd: Option<f64>,
    /// Full-year forecast
    pub forecast_year: Option<f64>,
    /// Full-year budget
    pub budget_year: Option<f64>,
    /// Full-year variance as a ratio
    pub var_year: Option<f64>,
}

impl Figures {
    /// Format the figures as seven display cells in column order. `value`
    /// formats amounts, `ratio` formats the two variances.
    pub fn cells(
        &self,
        value: impl Fn(Option<f64>) -> String,
        ratio: impl Fn(Option<f64>) -> String,
    ) -> [(&'static str, String); 7] {
        [
            ("actualMonth", value(self.actual_month)),
            ("actualYTD", value(self.actual_ytd)),
            ("budgetYTD", value(self.budget_ytd)),
            ("varYTD", ratio(self.var_ytd)),
            ("forecastYear", value(self.forecast_year)),
            ("budgetYear", value(self.budget_year)),
            ("varYear", ratio(self.var_year)),
        ]
    }

    /// Build a row: a leading name cell followed by the formatted figures.
    pub fn row(
        &self,
        kind: RowKind,
        name_label: &str,
        name: &str,
        value: impl Fn(Option<f64>) -> String,
        ratio: impl Fn(Option<f64>) -> String,
    ) -> Row {
        let name_cell = (name_label.to_string(), name.to_string());
        let figures = self
            .cells(value, ratio)
            .into_iter()
            .map(|(label, text)| (label.to_string(), text));
        Row::new(kind, std::iter::once(name_cell).chain(figures))
    }
}

/// Figures of one sales region. The `CASES` pseudo-region is the subtotal.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionFigures {
    /// Region name
    pub region: String,
    /// Period figures
    #[serde(flatten)]
    pub figures: Figures,
}

impl RegionFigures {
    /// Row kind of this region: the cases subtotal is emphasized.
    pub fn kind(&self) -> RowKind {
        RowKind::classify(&self.region, CASES_REGION)
    }
}

/// Figures of one customer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerFigures {
    /// Customer name
    pub customer: String,
    /// Period figures
    #[serde(flatten)]
    pub figures: Figures,
}

/// Figures of one brand within a customer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandFigures {
    /// Brand name
    pub brand: String,
    /// Period figures
    #[serde(flatten)]
    pub figures: Figures,
}

/// A customer's section on its region page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerReport {
    /// Customer name
    pub customer: String,
    /// Region the customer belongs to
    pub region: String,
    /// Country label of the status row
    #[serde(default)]
    pub country: String,
    /// Status this month
    #[serde(default)]
    pub this_month: Option<Status>,
    /// Status last month
    #[serde(default)]
    pub last_month: Option<Status>,
    /// Free-text comment
    #[serde(default)]
    pub comments: Option<String>,
    /// Region-wide activity notes
    #[serde(default)]
    pub region_activity: Option<String>,
    /// Per-brand breakdown
    #[serde(default)]
    pub brands: Vec<BrandFigures>,
    /// Customer totals
    #[serde(flatten)]
    pub figures: Figures,
}

/// Year-to-date performance of one brand.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandPerformance {
    /// Brand name
    pub brand: String,
    /// Cases sold
    #[serde(default)]
    pub cases: Option<f64>,
    /// Revenue year to date
    #[serde(rename = "revenueYTD", default)]
    pub revenue_ytd: Option<f64>,
    /// Average price per case
    #[serde(default)]
    pub avg_price: Option<f64>,
}

/// One bulk-wine customer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCustomer {
    /// Customer name
    pub customer_name: String,
    /// Actual year to date
    #[serde(rename = "actualYTD", default)]
    pub actual_ytd: Option<f64>,
    /// Full-year forecast
    #[serde(default)]
    pub forecast_year: Option<f64>,
    /// Free-text comment
    #[serde(default)]
    pub comments: Option<String>,
}

/// One point of the budget versus forecast chart series.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MonthlyForecast {
    /// Month as `MM-YYYY`
    pub month_year: String,
    /// Actual cases
    #[serde(default)]
    pub cases: Option<f64>,
    /// Forecast cases
    #[serde(default)]
    pub forecast: Option<f64>,
}

impl MonthlyForecast {
    /// First day of the month, if `month_year` parses.
    pub fn month(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&format!("01-{}", self.month_year), "%d-%m-%Y").ok()
    }
}

/// Everything the monthly sales report is built from.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SalesData {
    /// Volume by region, page 1
    pub first_page_cases: Vec<RegionFigures>,
    /// Revenue by region, page 1
    pub first_page_revenue: Vec<RegionFigures>,
    /// Highlights panel markup
    pub big_wins: String,
    /// Brand summary, page 2
    pub brands_performance: Vec<BrandPerformance>,
    /// Customers of the focus brand, page 2
    pub wr_sav_performance: Vec<CustomerFigures>,
    /// Chart series
    pub budget_vs_forecast_monthly: Vec<MonthlyForecast>,
    /// Customer sections of the region pages
    pub customers_report: Vec<CustomerReport>,
    /// Bulk wine page
    pub bulk_report: Vec<BulkCustomer>,
}

impl SalesData {
    /// Parse the report JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Regions that get their own page, in data order.
    pub fn page_regions(&self) -> impl Iterator<Item = &str> {
        self.first_page_cases
            .iter()
            .map(|r| r.region.as_str())
            .filter(|region| !["CASES", "BULK", "TOTAL"].contains(region))
    }

    /// Customers listed on a region page. The national "NZ" roll-up is left out.
    pub fn region_customers<'a>(
        &'a self,
        region: &'a str,
    ) -> impl Iterator<Item = &'a CustomerReport> + 'a {
        self.customers_report
            .iter()
            .filter(move |c| c.region == region && c.customer != "NZ")
    }
}
