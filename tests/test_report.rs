//! Integration tests for the monthly sales report.
//!
//! Tests data parsing, full composition, scratch-directory cleanup and the
//! HTTP payload.

use chrono::NaiveDate;
use report_oxide::report::{
    format_currency, format_number, format_percent, ChartProvider, MonthlyForecast,
    PrerenderedChart, SalesData, SalesReport, REPORT_FILENAME,
};
use report_oxide::{Error, HttpResponse, LayoutConfig, Result};
use std::cell::RefCell;
use std::path::{Path, PathBuf};

const SAMPLE: &str = r#"{
    "firstPageCases": [
        {"region": "NORTH ISLAND", "actualMonth": 1200.4, "actualYTD": 9000, "budgetYTD": 9500,
         "varYTD": -0.0526, "forecastYear": 15000, "budgetYear": 16000, "varYear": -0.0625},
        {"region": "SOUTH ISLAND", "actualMonth": 800, "actualYTD": 6000, "budgetYTD": 5500,
         "varYTD": 0.0909, "forecastYear": 11000, "budgetYear": 10000, "varYear": 0.1},
        {"region": "CASES", "actualMonth": -120, "actualYTD": 15000},
        {"region": "BULK", "actualMonth": 300, "actualYTD": 2000},
        {"region": "TOTAL", "actualMonth": 1880, "actualYTD": 17000}
    ],
    "firstPageRevenue": [
        {"region": "NORTH ISLAND", "actualMonth": 150000, "varYTD": 0.02},
        {"region": "TOTAL", "actualMonth": 240000, "varYTD": -0.01}
    ],
    "bigWins": "* Ranged in 40 new stores\n* <b>Record</b> export month",
    "brandsPerformance": [
        {"brand": "Wairau River", "cases": 12000, "revenueYTD": 1500000, "avgPrice": 125.0},
        {"brand": "Home Block", "cases": 800, "revenueYTD": 160000, "avgPrice": 200.0}
    ],
    "wrSavPerformance": [
        {"customer": "Liquor Distributors Limited", "actualMonth": null, "actualYTD": 420, "varYTD": 0.12}
    ],
    "budgetVsForecastMonthly": [
        {"month_year": "06-2024", "cases": 900, "forecast": 1000},
        {"month_year": "07-2024", "cases": 1200, "forecast": 1100}
    ],
    "customersReport": [
        {"customer": "Foodstuffs North", "region": "NORTH ISLAND", "country": "New Zealand",
         "thisMonth": "Green", "lastMonth": "Orange", "comments": "Promotion ran in July",
         "regionActivity": "Trade tastings in Auckland and Hamilton",
         "actualMonth": 400, "actualYTD": 3000,
         "brands": [{"brand": "Wairau River SB", "actualMonth": 300},
                    {"brand": "Wairau River PN", "actualMonth": -20}]},
        {"customer": "NZ", "region": "NORTH ISLAND", "actualMonth": 5000},
        {"customer": "Foodstuffs South", "region": "SOUTH ISLAND", "country": "New Zealand",
         "thisMonth": "Red", "lastMonth": "Red", "comments": null, "actualMonth": 100}
    ],
    "bulkReport": [
        {"customerName": "Booster", "actualYTD": 105000, "forecastYear": 200000,
         "comments": "Second container pending confirmation of freight"},
        {"customerName": "TOTAL", "actualYTD": 105000, "forecastYear": 200000}
    ]
}"#;

fn period() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
}

fn write_png(path: &Path) {
    image::RgbImage::from_pixel(300, 150, image::Rgb([200, 200, 200]))
        .save(path)
        .unwrap();
}

/// Writes a PNG into the scratch directory and remembers where.
struct RecordingChart {
    dir: RefCell<Option<PathBuf>>,
    fail: bool,
}

impl RecordingChart {
    fn new(fail: bool) -> Self {
        Self {
            dir: RefCell::new(None),
            fail,
        }
    }
}

impl ChartProvider for RecordingChart {
    fn render(&self, series: &[MonthlyForecast], dir: &Path) -> Result<PathBuf> {
        assert_eq!(series.len(), 2);
        *self.dir.borrow_mut() = Some(dir.to_path_buf());
        let path = dir.join("budget_vs_forecast.png");
        if self.fail {
            std::fs::write(&path, b"broken")?;
        } else {
            write_png(&path);
        }
        Ok(path)
    }
}

// =============================================================================
// FORMATTING TESTS
// =============================================================================

mod format_tests {
    use super::*;

    #[test]
    fn test_report_formats() {
        assert_eq!(format_number(Some(1200.4), 1), "1,200.4");
        assert_eq!(format_currency(Some(1500000.0), 0), "$1,500,000");
        assert_eq!(format_percent(Some(-0.0526)), "-5%");
    }
}

// =============================================================================
// RENDER TESTS
// =============================================================================

mod render_tests {
    use super::*;

    #[test]
    fn test_full_report_renders() {
        let data = SalesData::from_json(SAMPLE).unwrap();
        let chart = RecordingChart::new(false);
        let output = SalesReport::new(LayoutConfig::default(), period())
            .with_chart(&chart)
            .render(&data)
            .unwrap();

        // summary, brands, two region sections, bulk
        assert!(output.page_count() >= 5);
        let bytes = output.as_bytes();
        assert!(bytes.starts_with(b"%PDF-"));
        let text = String::from_utf8_lossy(bytes);
        assert!(text.contains("/Subtype /Image"));
        assert!(text.contains("RFE MONTHLY SALES REPORT - July 2024"));
    }

    #[test]
    fn test_scratch_dir_removed_after_success() {
        let data = SalesData::from_json(SAMPLE).unwrap();
        let chart = RecordingChart::new(false);
        SalesReport::new(LayoutConfig::default(), period())
            .with_chart(&chart)
            .render(&data)
            .unwrap();
        let dir = chart.dir.borrow().clone().unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn test_scratch_dir_removed_after_failure() {
        let data = SalesData::from_json(SAMPLE).unwrap();
        let chart = RecordingChart::new(true);
        let result = SalesReport::new(LayoutConfig::default(), period())
            .with_chart(&chart)
            .render(&data);
        assert!(matches!(result, Err(Error::Image(_))));
        let dir = chart.dir.borrow().clone().unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn test_prerendered_chart() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("chart.png");
        write_png(&source);
        let chart = PrerenderedChart::new(&source);

        let data = SalesData::from_json(SAMPLE).unwrap();
        let output = SalesReport::new(LayoutConfig::default(), period())
            .with_chart(&chart)
            .render(&data)
            .unwrap();
        assert!(String::from_utf8_lossy(output.as_bytes()).contains("/Subtype /Image"));
        assert!(source.exists());
    }

    #[test]
    fn test_minimal_data_renders() {
        let data = SalesData::from_json("{}").unwrap();
        let output = SalesReport::new(LayoutConfig::default(), period())
            .render(&data)
            .unwrap();
        assert!(output.page_count() >= 2);
    }

    #[test]
    fn test_render_is_deterministic() {
        let data = SalesData::from_json(SAMPLE).unwrap();
        let report = SalesReport::new(LayoutConfig::default(), period());
        let first = report.render(&data).unwrap();
        let second = report.render(&data).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(matches!(
            SalesData::from_json("{\"firstPageCases\": 3}"),
            Err(Error::Json(_))
        ));
    }
}

// =============================================================================
// HTTP PAYLOAD TESTS
// =============================================================================

mod http_tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    #[test]
    fn test_attachment_round_trips_pdf() {
        let data = SalesData::from_json(SAMPLE).unwrap();
        let output = SalesReport::new(LayoutConfig::default(), period())
            .render(&data)
            .unwrap();
        let response = HttpResponse::attachment(&output, REPORT_FILENAME);

        assert_eq!(response.status_code, 200);
        assert_eq!(response.is_base64_encoded, Some(true));
        assert_eq!(
            response.headers["Content-Disposition"],
            "attachment; filename=\"RFE-SALES-MONTHLY-REPORT.pdf\""
        );
        assert_eq!(STANDARD.decode(&response.body).unwrap(), output.as_bytes());
    }

    #[test]
    fn test_error_response_from_failed_render() {
        let err = SalesData::from_json("not json").unwrap_err();
        let response = HttpResponse::error(&err);
        assert_eq!(response.status_code, 500);
        let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("An error occurred: JSON error"));
    }
}
