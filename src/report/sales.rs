//! The monthly sales report.
//!
//! Page order:
//!
//! 1. summary: cases and revenue by region, then the big-wins panel
//! 2. brands performance, the Wairau River customer table and the chart
//! 3. one section per region with customer tables, status rows and an
//!    activity panel
//! 4. bulk sales with wrapping comments

use super::chart::ChartProvider;
use super::data::{BrandPerformance, BulkCustomer, CustomerFigures, CustomerReport, SalesData};
use super::format::{format_currency, format_number, format_percent};
use crate::config::LayoutConfig;
use crate::error::Result;
use crate::layout::blocks::{self, StatusRow};
use crate::layout::{
    render_table, Canvas, ColumnSpec, Row, RowKind, RowOptions, TableRenderer, WrappedTableRenderer,
};
use crate::output::PdfOutput;
use crate::writer::PdfWriterConfig;
use chrono::NaiveDate;
use std::path::Path;

/// Download name of the finished report.
pub const REPORT_FILENAME: &str = "RFE-SALES-MONTHLY-REPORT.pdf";

const TITLE: &str = "RFE MONTHLY SALES REPORT";
const FIGURE_COLUMNS: [f32; 8] = [0.2, 0.12, 0.12, 0.1, 0.12, 0.12, 0.12, 0.1];
const BRAND_COLUMNS: [f32; 4] = [0.3, 0.2, 0.2, 0.3];
const BULK_COLUMNS: [f32; 4] = [0.3, 0.1, 0.1, 0.5];
const FIGURE_LABELS: [&str; 7] = [
    "Actual Month",
    "Actual YTD",
    "Budget YTD",
    "Var %",
    "Forecast Year",
    "Budget Year",
    "Var %",
];
const CUSTOMER_NAME_LIMIT: usize = 20;
const FOCUS_BRAND: &str = "Wairau River Sauvignon Blanc";

/// Renders [`SalesData`] into the monthly sales report PDF.
pub struct SalesReport<'a> {
    config: LayoutConfig,
    period: NaiveDate,
    report_date: Option<NaiveDate>,
    chart: Option<&'a dyn ChartProvider>,
}

impl<'a> SalesReport<'a> {
    /// Report for the month containing `period`.
    pub fn new(config: LayoutConfig, period: NaiveDate) -> Self {
        Self {
            config,
            period,
            report_date: None,
            chart: None,
        }
    }

    /// Print a "Date:" line under the summary title.
    pub fn with_report_date(mut self, date: NaiveDate) -> Self {
        self.report_date = Some(date);
        self
    }

    /// Draw a chart on the brands page.
    pub fn with_chart(mut self, provider: &'a dyn ChartProvider) -> Self {
        self.chart = Some(provider);
        self
    }

    /// Title line of the summary page, e.g. "RFE MONTHLY SALES REPORT - July 2024".
    pub fn title(&self) -> String {
        format!("{} - {}", TITLE, self.period.format("%B %Y"))
    }

    /// Render the whole report.
    ///
    /// Scratch files live in a temporary directory that is removed when this
    /// returns, whether or not rendering succeeded.
    pub fn render(&self, data: &SalesData) -> Result<PdfOutput> {
        let scratch = tempfile::Builder::new().prefix("report_oxide").tempdir()?;
        let document = PdfWriterConfig::default()
            .with_title(self.title())
            .with_subject("Monthly sales report");
        let mut canvas = Canvas::new(self.config.clone())?.with_document_info(document);

        self.summary_page(&mut canvas, data)?;
        self.brands_page(&mut canvas, data, scratch.path())?;
        for region in data.page_regions() {
            self.region_page(&mut canvas, data, region)?;
        }
        self.bulk_page(&mut canvas, &data.bulk_report)?;

        let output = canvas.finish()?;
        log::info!("Rendered '{}': {} pages", self.title(), output.page_count());
        Ok(output)
    }

    fn summary_page(&self, canvas: &mut Canvas, data: &SalesData) -> Result<()> {
        blocks::centered_title(canvas, &self.title())?;
        if let Some(date) = self.report_date {
            blocks::report_date(canvas, date)?;
        }

        blocks::caption(canvas, "Cases 9 litre equivalent")?;
        let cases: Vec<Row> = data
            .first_page_cases
            .iter()
            .map(|r| {
                r.figures
                    .row(r.kind(), "region", &r.region, |v| format_number(v, 1), format_percent)
            })
            .collect();
        figures_table(canvas, "(volume 000's)", &cases, grouped())?;
        blocks::section_break(canvas);

        blocks::caption(canvas, "Revenue in NZD")?;
        let revenue: Vec<Row> = data
            .first_page_revenue
            .iter()
            .map(|r| {
                r.figures
                    .row(r.kind(), "region", &r.region, |v| format_currency(v, 0), format_percent)
            })
            .collect();
        figures_table(canvas, "(Value $NZD)", &revenue, grouped())?;
        blocks::section_break(canvas);

        blocks::panel(canvas, "BIG WINS THIS MONTH", &data.big_wins)
    }

    fn brands_page(&self, canvas: &mut Canvas, data: &SalesData, scratch: &Path) -> Result<()> {
        canvas.advance_line(10.0);
        blocks::centered_title(canvas, &format!("{} - BRANDS PERFORMANCE", TITLE))?;
        let brands: Vec<Row> = data.brands_performance.iter().map(brand_row).collect();
        if brands.is_empty() {
            log::warn!("No brand performance rows, table skipped");
        } else {
            render_table(canvas, &brands, ColumnSpec::new(BRAND_COLUMNS.to_vec())?, RowOptions::new())?;
        }
        blocks::section_break(canvas);

        canvas.advance_line(10.0);
        blocks::section_title(canvas, FOCUS_BRAND)?;
        let customers: Vec<Row> = data.wr_sav_performance.iter().map(focus_customer_row).collect();
        figures_table(canvas, "Customer", &customers, grouped())?;
        blocks::section_break(canvas);

        if let Some(provider) = self.chart {
            let path = provider.render(&data.budget_vs_forecast_monthly, scratch)?;
            blocks::chart(canvas, &path)?;
        }
        canvas.begin_page();
        Ok(())
    }

    fn region_page(&self, canvas: &mut Canvas, data: &SalesData, region: &str) -> Result<()> {
        log::debug!("Region page {}", region);
        canvas.advance_line(10.0);
        blocks::centered_title(canvas, &format!("{} - {}", TITLE, region))?;

        let mut activity = "";
        for customer in data.region_customers(region) {
            let threshold = canvas.config().status_threshold;
            if canvas.will_overflow(threshold) {
                let gap = canvas.config().block_break_gap;
                canvas.begin_page();
                canvas.advance_line(gap);
            }
            customer_section(canvas, customer)?;
            activity = customer.region_activity.as_deref().unwrap_or("");
        }

        blocks::panel(canvas, &format!("{} OTHER ACTIVITY", region), activity)
    }

    fn bulk_page(&self, canvas: &mut Canvas, bulk: &[BulkCustomer]) -> Result<()> {
        canvas.advance_line(15.0);
        blocks::centered_title(canvas, &format!("{} - BULK SALES", TITLE))?;
        let rows: Vec<Row> = bulk.iter().map(bulk_row).collect();
        if rows.is_empty() {
            log::warn!("No bulk rows, table skipped");
        } else {
            let mut table = WrappedTableRenderer::from_rows(
                canvas,
                &rows,
                ColumnSpec::new(BULK_COLUMNS.to_vec())?,
                Some("Comments"),
            )?;
            table.draw_rows(&rows, RowOptions::new())?;
        }
        blocks::section_break(canvas);
        Ok(())
    }
}

fn grouped() -> RowOptions {
    RowOptions::new().vertical_rules(true)
}

fn figures_header(first: &str) -> Vec<String> {
    std::iter::once(first)
        .chain(FIGURE_LABELS)
        .map(str::to_string)
        .collect()
}

/// Eight-column figures table under its own header. Empty tables are skipped.
fn figures_table(canvas: &mut Canvas, first_label: &str, rows: &[Row], options: RowOptions) -> Result<()> {
    if rows.is_empty() {
        log::warn!("No rows for '{}' table, skipped", first_label);
        return Ok(());
    }
    let columns = ColumnSpec::new(FIGURE_COLUMNS.to_vec())?;
    let mut table = TableRenderer::new(canvas, figures_header(first_label), columns)?;
    table.draw_rows(rows, options)
}

fn truncate_name(name: &str) -> String {
    name.chars().take(CUSTOMER_NAME_LIMIT).collect()
}

fn brand_row(brand: &BrandPerformance) -> Row {
    Row::normal([
        ("Brand", brand.brand.clone()),
        ("Actual YTD", format_number(brand.cases, 0)),
        ("Revenue YTD", format_currency(brand.revenue_ytd, 0)),
        ("Avg Price", format_currency(brand.avg_price, 2)),
    ])
}

fn focus_customer_row(customer: &CustomerFigures) -> Row {
    let mut figures = customer.figures.clone();
    figures.actual_month = Some(figures.actual_month.unwrap_or(0.0));
    figures.row(
        RowKind::Normal,
        "customer",
        &truncate_name(&customer.customer),
        |v| format_number(v, 0),
        format_percent,
    )
}

fn bulk_row(customer: &BulkCustomer) -> Row {
    Row::normal([
        ("Customer", customer.customer_name.clone()),
        ("Actual YTD", format_number(customer.actual_ytd, 0)),
        ("Forecast Year", format_number(customer.forecast_year, 0)),
        ("Comments", customer.comments.clone().unwrap_or_default()),
    ])
}

/// Customer totals, its brand rows and its status row.
fn customer_section(canvas: &mut Canvas, customer: &CustomerReport) -> Result<()> {
    let totals = customer.figures.row(
        RowKind::Normal,
        "customer",
        &truncate_name(&customer.customer),
        |v| format_number(v, 0),
        format_percent,
    );
    let brands: Vec<Row> = customer
        .brands
        .iter()
        .map(|b| {
            b.figures
                .row(RowKind::Normal, "customer", &b.brand, |v| format_number(v, 0), format_percent)
        })
        .collect();

    {
        let columns = ColumnSpec::new(FIGURE_COLUMNS.to_vec())?;
        let mut table = TableRenderer::new(canvas, figures_header("Customer / Brand"), columns)?;
        table.draw_rows(std::slice::from_ref(&totals), RowOptions::new())?;
        if !brands.is_empty() {
            table.draw_rows(&brands, RowOptions::new().highlight_last_row(false).vertical_rules(true))?;
        }
    }

    blocks::status_row(
        canvas,
        &StatusRow {
            label: &customer.country,
            this_period: customer.this_month.unwrap_or_default(),
            previous_period: customer.last_month.unwrap_or_default(),
            comment: customer.comments.as_deref().unwrap_or(""),
        },
    )?;
    blocks::section_break(canvas);
    Ok(())
}
