//! Integration tests for composite blocks.
//!
//! Tests panels, status rows, charts and the small title blocks.

use report_oxide::layout::blocks::{self, Status, StatusRow};
use report_oxide::layout::{Canvas, CellItem, FontSpec, Measurer, PageItem};
use report_oxide::writer::Base14Font;
use report_oxide::{Error, LayoutConfig};
use std::path::{Path, PathBuf};

fn canvas() -> Canvas {
    Canvas::new(LayoutConfig::default()).unwrap()
}

fn cell_with_text<'a>(canvas: &'a Canvas, text: &str) -> Option<&'a CellItem> {
    canvas
        .pages()
        .iter()
        .flat_map(|p| p.cells())
        .find(|c| c.text == text)
}

fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([30, 90, 160]));
    img.save(&path).unwrap();
    path
}

// =============================================================================
// PANEL TESTS
// =============================================================================

mod panel_tests {
    use super::*;

    #[test]
    fn test_panel_draws_title_and_body() {
        let mut canvas = canvas();
        blocks::panel(
            &mut canvas,
            "BIG WINS THIS MONTH",
            "* New listing at <b>Foodstuffs</b>\n* Export order shipped",
        )
        .unwrap();

        let page = &canvas.pages()[0];
        let title = cell_with_text(&canvas, "BIG WINS THIS MONTH").unwrap();
        assert!(title.style.font_style.underline);

        let runs: Vec<(&str, bool)> = page
            .items()
            .iter()
            .filter_map(|item| match item {
                PageItem::Text { text, style, .. } => Some((text.as_str(), style.font_style.bold)),
                _ => None,
            })
            .collect();
        assert!(runs.iter().any(|(t, bold)| t.contains("Foodstuffs") && *bold));
        assert!(runs.iter().any(|(t, bold)| t.contains("Export") && !*bold));
    }

    #[test]
    fn test_panel_box_fills_rest_of_page() {
        let mut canvas = canvas();
        blocks::panel(&mut canvas, "Notes", "one line").unwrap();
        let trigger = canvas.config().page_break_trigger();
        let frame = canvas.pages()[0]
            .cells()
            .find(|c| c.border && c.fill && c.text.is_empty())
            .unwrap();
        assert!((frame.y + frame.height - trigger).abs() < 1e-3);
        assert_eq!(frame.width, canvas.config().usable_width());
    }

    #[test]
    fn test_panel_ends_page() {
        let mut canvas = canvas();
        blocks::panel(&mut canvas, "Notes", "body").unwrap();
        assert_eq!(canvas.page_count(), 2);
        assert!(canvas.at_page_top());
    }

    #[test]
    fn test_panel_moves_to_new_page_when_low() {
        let mut canvas = canvas();
        canvas.advance_line(250.0);
        blocks::panel(&mut canvas, "Notes", "body").unwrap();
        assert!(canvas.pages()[0].cells().all(|c| c.text != "Notes"));
        assert!(canvas.pages()[1].cells().any(|c| c.text == "Notes"));
        assert_eq!(canvas.page_count(), 3);
    }

    #[test]
    fn test_panel_too_long_for_any_page() {
        let mut canvas = canvas();
        let body = "line<br>".repeat(100);
        assert!(matches!(
            blocks::panel(&mut canvas, "Notes", &body),
            Err(Error::OverflowNeverResolves { .. })
        ));
    }
}

// =============================================================================
// STATUS ROW TESTS
// =============================================================================

mod status_tests {
    use super::*;

    fn row<'a>(comment: &'a str) -> StatusRow<'a> {
        StatusRow {
            label: "New Zealand",
            this_period: Status::Green,
            previous_period: Status::parse("Purple"),
            comment,
        }
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(Status::parse("Green"), Status::Green);
        assert_eq!(Status::parse("Orange"), Status::Orange);
        assert_eq!(Status::parse("Red"), Status::Red);
        assert_eq!(Status::parse("green"), Status::Red);
        assert_eq!(Status::parse(""), Status::Red);
    }

    #[test]
    fn test_status_row_cells() {
        let mut canvas = canvas();
        let config = canvas.config().clone();
        blocks::status_row(&mut canvas, &row("Volumes steady")).unwrap();

        let labels: Vec<&str> = canvas.pages()[0].cells().map(|c| c.text.as_str()).collect();
        for expected in ["New Zealand", "This Month", "Last Month", "Status", "Comments"] {
            assert!(labels.contains(&expected), "missing {}", expected);
        }

        let swatches: Vec<&CellItem> = canvas.pages()[0]
            .cells()
            .filter(|c| c.fill && c.text.is_empty())
            .collect();
        assert_eq!(swatches.len(), 2);
        assert_eq!(swatches[0].style.fill_color, config.status_success);
        assert_eq!(swatches[1].style.fill_color, config.status_alert);
    }

    #[test]
    fn test_comment_box_grows_with_comment() {
        let mut short = canvas();
        blocks::status_row(&mut short, &row("ok")).unwrap();
        let mut long = canvas();
        let comment = "Depletions ahead of plan after the summer promotion. ".repeat(6);
        blocks::status_row(&mut long, &row(&comment)).unwrap();

        let short_box = cell_with_text(&short, "Comments").unwrap().height;
        let long_box = cell_with_text(&long, "Comments").unwrap().height;
        assert_eq!(short_box, 10.0);
        assert!(long_box > short_box);
        assert!(long.y() > short.y());
    }

    #[test]
    fn test_comment_box_uses_wrapped_height() {
        let mut canvas = canvas();
        let config = canvas.config().clone();
        let comment = "Depletions ahead of plan after the summer promotion. ".repeat(6);
        blocks::status_row(&mut canvas, &row(&comment)).unwrap();

        let width = 0.8 * config.usable_width();
        let font = FontSpec::new(Base14Font::HelveticaOblique, 8.0);
        let expected = Measurer::from_config(&config)
            .wrapped_height_at(width, &comment, font, 5.0)
            .max(10.0);
        let comment_box = canvas.pages()[0]
            .cells()
            .find(|c| c.text.is_empty() && c.border && !c.fill)
            .unwrap();
        assert!((comment_box.height - expected).abs() < 1e-3);
        assert!((cell_with_text(&canvas, "Comments").unwrap().height - expected).abs() < 1e-3);
    }

    #[test]
    fn test_status_row_stays_on_one_page() {
        let mut canvas = canvas();
        let trigger = canvas.config().page_break_trigger();
        let left = canvas.config().margin_left;
        canvas.set_xy(left, trigger - 20.0);
        blocks::status_row(&mut canvas, &row("ok")).unwrap();

        assert_eq!(canvas.page_count(), 2);
        assert!(cell_with_text(&canvas, "New Zealand").unwrap().y < trigger);
        assert!(canvas.pages()[1].cells().any(|c| c.text == "Comments"));
        assert!(canvas.pages()[0].cells().all(|c| c.text != "Comments"));
    }
}

// =============================================================================
// CHART TESTS
// =============================================================================

mod chart_tests {
    use super::*;

    #[test]
    fn test_chart_fits_width_keeping_aspect() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "chart.png", 400, 200);
        let mut canvas = canvas();
        let usable = canvas.config().usable_width();

        let placement = blocks::chart(&mut canvas, &path).unwrap();
        assert!((placement.width - usable).abs() < 1e-3);
        assert!((placement.width / placement.height - 2.0).abs() < 1e-3);
        assert!(canvas.pages()[0]
            .items()
            .iter()
            .any(|item| matches!(item, PageItem::Image { .. })));
    }

    #[test]
    fn test_chart_limited_by_remaining_height() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "tall.png", 100, 400);
        let mut canvas = canvas();
        canvas.advance_line(150.0);
        let remaining = canvas.remaining_height();

        let placement = blocks::chart(&mut canvas, &path).unwrap();
        assert!(placement.height <= remaining + 1e-3);
        assert!((placement.height / placement.width - 4.0).abs() < 1e-2);
    }

    #[test]
    fn test_chart_starts_new_page_when_low() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "chart.png", 400, 200);
        let mut canvas = canvas();
        canvas.advance_line(245.0);

        blocks::chart(&mut canvas, &path).unwrap();
        assert_eq!(canvas.page_count(), 2);
        assert!(canvas.pages()[1]
            .items()
            .iter()
            .any(|item| matches!(item, PageItem::Image { .. })));
    }

    #[test]
    fn test_chart_embeds_into_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "chart.png", 40, 20);
        let mut canvas = canvas();
        blocks::chart(&mut canvas, &path).unwrap();
        let output = canvas.finish().unwrap();
        let text = String::from_utf8_lossy(output.as_bytes());
        assert!(text.contains("/Subtype /Image"));
    }

    #[test]
    fn test_missing_chart_is_error() {
        let mut canvas = canvas();
        assert!(blocks::chart(&mut canvas, "/nonexistent/chart.png").is_err());
    }
}

// =============================================================================
// TITLE BLOCK TESTS
// =============================================================================

mod title_tests {
    use super::*;
    use report_oxide::layout::Align;

    #[test]
    fn test_centered_title() {
        let mut canvas = canvas();
        let start = canvas.y();
        blocks::centered_title(&mut canvas, "RFE MONTHLY SALES REPORT - July 2024").unwrap();
        let cell = cell_with_text(&canvas, "RFE MONTHLY SALES REPORT - July 2024").unwrap();
        assert_eq!(cell.align, Align::Center);
        assert_eq!(cell.style.font_size, 20.0);
        assert!(canvas.y() > start);
    }

    #[test]
    fn test_section_break_draws_rule() {
        let mut canvas = canvas();
        let before = canvas.pages()[0].items().len();
        let start = canvas.y();
        blocks::section_break(&mut canvas);
        assert_eq!(canvas.pages()[0].items().len(), before + 1);
        assert!((canvas.y() - start - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_report_date_line() {
        let mut canvas = canvas();
        let date = chrono::NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        blocks::report_date(&mut canvas, date).unwrap();
        let cell = cell_with_text(&canvas, "Date: 01 Jul, 2024").unwrap();
        assert!(cell.style.font_style.bold);
    }
}
