//! Composite blocks built from canvas primitives: bordered panels, status
//! rows with indicator swatches, fitted charts, titles and section breaks.
//!
//! Each block decides for itself whether it still fits on the current page
//! and starts a new page when it does not.

use super::canvas::{Canvas, CellOptions};
use super::markup::{self, FlowLayout};
use super::measure::FontSpec;
use super::style::{Align, Color, FontStyle, StyleOverrides};
use crate::config::LayoutConfig;
use crate::error::{Error, Result};
use crate::writer::{Base14Font, FontFamily, ImagePlacement};
use std::path::Path;

/// Height of the status header line.
const STATUS_HEADER_HEIGHT: f32 = 8.0;
/// Minimum height of the comment box under a status header.
const COMMENT_MIN_HEIGHT: f32 = 10.0;
/// Line pitch of status comments.
const COMMENT_LINE_HEIGHT: f32 = 5.0;
/// Comment font size, points.
const COMMENT_FONT_SIZE: f32 = 8.0;
/// Space after a status row.
const STATUS_AFTER_GAP: f32 = 5.0;

/// Space before a panel.
const PANEL_GAP: f32 = 5.0;
/// Title offset from the panel's top edge.
const PANEL_TITLE_OFFSET: f32 = 3.0;
/// Title cell height.
const PANEL_TITLE_HEIGHT: f32 = 10.0;
/// Body offset below the title's top edge.
const PANEL_BODY_OFFSET: f32 = 15.0;
/// Body line pitch.
const PANEL_LINE_HEIGHT: f32 = 6.0;

/// Space around a section break rule.
const SECTION_BREAK_GAP: f32 = 3.0;

/// Tri-state indicator value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(from = "String")]
pub enum Status {
    /// On track
    Green,
    /// Needs attention
    Orange,
    /// Off track; also any unrecognised value
    #[default]
    Red,
}

impl Status {
    /// Parse an indicator value. Anything other than `Green` or `Orange` is
    /// red.
    pub fn parse(value: &str) -> Self {
        match value {
            "Green" => Status::Green,
            "Orange" => Status::Orange,
            _ => Status::Red,
        }
    }

    /// Swatch colour.
    pub fn color(self, config: &LayoutConfig) -> Color {
        match self {
            Status::Green => config.status_success,
            Status::Orange => config.status_warning,
            Status::Red => config.status_alert,
        }
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        Status::parse(&value)
    }
}

impl From<&str> for Status {
    fn from(value: &str) -> Self {
        Status::parse(value)
    }
}

/// Content of a status row.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRow<'a> {
    /// Leading label cell, e.g. the customer's country
    pub label: &'a str,
    /// Indicator for the current period
    pub this_period: Status,
    /// Indicator for the previous period
    pub previous_period: Status,
    /// Free-text comment under the indicators
    pub comment: &'a str,
}

fn border_style(config: &LayoutConfig) -> StyleOverrides {
    StyleOverrides::new()
        .stroke_color(config.rule_color)
        .stroke_opacity(config.border_opacity)
        .line_width(config.border_width)
}

/// Draw a status row: label, two labelled indicator swatches and a status
/// cell, then a bordered comment box below.
///
/// The comment is measured first; the row and its comment always land on
/// the same page.
pub fn status_row(canvas: &mut Canvas, row: &StatusRow<'_>) -> Result<()> {
    let config = canvas.config().clone();
    let usable = config.usable_width();
    let label_width = 0.2 * usable;
    let swatch_width = 0.12 * usable;
    let status_width = usable - label_width - 4.0 * swatch_width;
    let comment_width = usable - label_width;

    let measurer = canvas.measurer();
    let comment_font = FontSpec::new(Base14Font::HelveticaOblique, COMMENT_FONT_SIZE);
    let comment_height = measurer
        .wrapped_height_at(comment_width, row.comment, comment_font, COMMENT_LINE_HEIGHT)
        .max(COMMENT_MIN_HEIGHT);
    let block_height = STATUS_HEADER_HEIGHT + comment_height;

    let available = config.fresh_page_height() - config.block_break_gap;
    if block_height > available {
        return Err(Error::OverflowNeverResolves {
            needed: block_height,
            available,
        });
    }
    if canvas.will_overflow(config.status_threshold.max(block_height)) {
        canvas.begin_page();
        canvas.advance_line(config.block_break_gap);
    }

    let style = border_style(&config).font(FontFamily::Helvetica, FontStyle::REGULAR, 10.0);
    canvas.scoped(&style, |canvas| -> Result<()> {
        let right = CellOptions::new().border(true).align(Align::Right);
        let swatch = |status: Status| {
            CellOptions::new().border(true).fill(true).style(
                StyleOverrides::new()
                    .fill_color(status.color(&config))
                    .fill_opacity(1.0),
            )
        };

        canvas.draw_cell(label_width, STATUS_HEADER_HEIGHT, row.label, &right)?;
        canvas.draw_cell(swatch_width, STATUS_HEADER_HEIGHT, "This Month", &right)?;
        canvas.draw_cell(swatch_width, STATUS_HEADER_HEIGHT, "", &swatch(row.this_period))?;
        canvas.draw_cell(swatch_width, STATUS_HEADER_HEIGHT, "Last Month", &right)?;
        canvas.draw_cell(swatch_width, STATUS_HEADER_HEIGHT, "", &swatch(row.previous_period))?;
        canvas.draw_cell(
            status_width,
            STATUS_HEADER_HEIGHT,
            "Status",
            &CellOptions::new().border(true),
        )?;
        canvas.advance_line(STATUS_HEADER_HEIGHT);

        canvas.draw_cell(label_width, comment_height, "Comments", &right)?;
        canvas.draw_multi_cell(
            comment_width,
            comment_height,
            row.comment,
            COMMENT_LINE_HEIGHT,
            &CellOptions::new().border(true).style(StyleOverrides::new().font(
                FontFamily::Helvetica,
                FontStyle::ITALIC,
                COMMENT_FONT_SIZE,
            )),
        )?;
        canvas.advance_line(comment_height);
        canvas.advance_line(STATUS_AFTER_GAP);
        Ok(())
    })
}

/// Draw a bordered panel filling the rest of the page: an underlined title
/// and a markup body. A page break always follows the panel.
///
/// The body is laid out before anything is drawn. When it does not fit the
/// rest of the page the panel moves to a new page.
pub fn panel(canvas: &mut Canvas, title: &str, body: &str) -> Result<()> {
    let config = canvas.config().clone();
    let usable = config.usable_width();
    let measurer = canvas.measurer();
    let margin = measurer.cell_margin();

    let lines = FlowLayout::new(
        &measurer,
        FontFamily::Times,
        FontStyle::ITALIC,
        10.0,
        usable - 2.0 * margin,
    )
    .layout(&markup::parse(body));
    let needed =
        PANEL_TITLE_OFFSET + PANEL_BODY_OFFSET + lines.len() as f32 * PANEL_LINE_HEIGHT;

    let available = config.fresh_page_height() - config.block_break_gap - PANEL_GAP;
    if needed > available {
        return Err(Error::OverflowNeverResolves { needed, available });
    }
    if canvas.will_overflow(config.panel_threshold.max(PANEL_GAP + needed)) {
        canvas.begin_page();
        canvas.advance_line(config.block_break_gap);
    }
    canvas.advance_line(PANEL_GAP);

    let top = canvas.y();
    let height = canvas.remaining_height();
    canvas.draw_cell(
        usable,
        height,
        "",
        &CellOptions::new().border(true).fill(true).style(
            StyleOverrides::new()
                .stroke_color(config.rule_color)
                .stroke_opacity(1.0)
                .fill_color(Color::white())
                .fill_opacity(1.0),
        ),
    )?;

    canvas.set_xy(config.margin_left, top + PANEL_TITLE_OFFSET);
    canvas.draw_cell(
        usable,
        PANEL_TITLE_HEIGHT,
        title,
        &CellOptions::new().style(StyleOverrides::new().font(
            FontFamily::Helvetica,
            FontStyle::UNDERLINE,
            14.0,
        )),
    )?;

    let body_top = top + PANEL_TITLE_OFFSET + PANEL_BODY_OFFSET;
    let shift = 0.3 * config.pt_to_user(10.0);
    for (i, line) in lines.iter().enumerate() {
        let baseline = body_top + (i as f32 + 0.5) * PANEL_LINE_HEIGHT + shift;
        for run in &line.runs {
            canvas.draw_text(
                config.margin_left + margin + run.x,
                baseline,
                &run.text,
                &StyleOverrides::new().font(FontFamily::Times, run.style, 10.0),
            );
        }
    }

    canvas.begin_page();
    Ok(())
}

/// Draw a chart image at the left margin, scaled to the usable width and the
/// remaining height with its aspect ratio kept. The cursor moves below it.
///
/// With less than the configured minimum height left, the chart starts a
/// new page.
pub fn chart(canvas: &mut Canvas, path: impl AsRef<Path>) -> Result<ImagePlacement> {
    let image = canvas.load_image(path)?;
    let (min_height, left, usable) = {
        let config = canvas.config();
        (config.min_chart_height, config.margin_left, config.usable_width())
    };
    if canvas.remaining_height() < min_height {
        canvas.begin_page();
    }

    let placement = canvas.fit_image(&image, left, canvas.y(), usable, canvas.remaining_height())?;
    canvas.draw_image(&image, &placement)?;
    canvas.advance_line(placement.height);
    Ok(placement)
}

/// Large centred page title.
pub fn centered_title(canvas: &mut Canvas, text: &str) -> Result<()> {
    let usable = canvas.config().usable_width();
    let advance = 2.0 * canvas.config().pt_to_user(20.0);
    let style = StyleOverrides::new().font(FontFamily::Helvetica, FontStyle::REGULAR, 20.0);
    canvas.scoped(&style, |canvas| -> Result<()> {
        canvas.draw_cell(usable, 18.0, text, &CellOptions::new().align(Align::Center))?;
        canvas.advance_line(advance);
        Ok(())
    })
}

/// Bold left-aligned section title.
pub fn section_title(canvas: &mut Canvas, text: &str) -> Result<()> {
    let usable = canvas.config().usable_width();
    let size = canvas.config().pt_to_user(12.0);
    let style = StyleOverrides::new().font(FontFamily::Helvetica, FontStyle::BOLD, 12.0);
    canvas.scoped(&style, |canvas| -> Result<()> {
        canvas.draw_cell(usable, size, text, &CellOptions::new())?;
        canvas.advance_line(2.0 * size + 5.0);
        Ok(())
    })
}

/// Plain caption line.
pub fn caption(canvas: &mut Canvas, text: &str) -> Result<()> {
    let usable = canvas.config().usable_width();
    let style = StyleOverrides::new().font(FontFamily::Helvetica, FontStyle::REGULAR, 10.0);
    canvas.scoped(&style, |canvas| -> Result<()> {
        canvas.draw_cell(usable, 10.0, text, &CellOptions::new())?;
        canvas.advance_line(10.0);
        Ok(())
    })
}

/// "Date: 01 Jul, 2024" line in bold.
pub fn report_date(canvas: &mut Canvas, date: chrono::NaiveDate) -> Result<()> {
    let usable = canvas.config().usable_width();
    let line = 2.0 * canvas.config().pt_to_user(10.0);
    let text = format!("Date: {}", date.format("%d %b, %Y"));
    canvas.advance_line(line);
    let style = StyleOverrides::new().font(FontFamily::Helvetica, FontStyle::BOLD, 10.0);
    canvas.scoped(&style, |canvas| -> Result<()> {
        canvas.draw_cell(usable, line, &text, &CellOptions::new())?;
        canvas.advance_line(line);
        Ok(())
    })
}

/// Gap, full-width rule, gap.
pub fn section_break(canvas: &mut Canvas) {
    canvas.advance_line(SECTION_BREAK_GAP);
    let y = canvas.y();
    canvas.draw_rule(y);
    canvas.advance_line(SECTION_BREAK_GAP);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PageItem;

    fn canvas() -> Canvas {
        Canvas::new(LayoutConfig::default()).unwrap()
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(Status::parse("Green"), Status::Green);
        assert_eq!(Status::parse("Orange"), Status::Orange);
        assert_eq!(Status::parse("Red"), Status::Red);
        assert_eq!(Status::parse("green"), Status::Red);
        assert_eq!(Status::parse(""), Status::Red);
        let parsed: Status = serde_json::from_str("\"Orange\"").unwrap();
        assert_eq!(parsed, Status::Orange);
    }

    #[test]
    fn test_status_colors() {
        let config = LayoutConfig::default();
        assert_eq!(Status::Green.color(&config), Color::rgb(74, 222, 128));
        assert_eq!(Status::Orange.color(&config), Color::rgb(251, 146, 60));
        assert_eq!(Status::Red.color(&config), Color::rgb(248, 113, 113));
    }

    #[test]
    fn test_section_break_draws_rule() {
        let mut c = canvas();
        section_break(&mut c);
        assert_eq!(c.y(), 21.0);
        let rules = c.pages()[0]
            .items()
            .iter()
            .filter(|item| matches!(item, PageItem::Line { y1, .. } if *y1 == 18.0))
            .count();
        assert_eq!(rules, 1);
    }

    #[test]
    fn test_titles_do_not_leak_style() {
        let mut c = canvas();
        let before = c.style();
        centered_title(&mut c, "RFE MONTHLY SALES REPORT - July 2024").unwrap();
        section_title(&mut c, "Wairau River Sauvignon Blanc").unwrap();
        caption(&mut c, "Cases 9 litre equivalent").unwrap();
        assert_eq!(c.style(), before);
        let fonts: Vec<f32> = c.pages()[0].cells().map(|cell| cell.style.font_size).collect();
        assert_eq!(fonts, vec![20.0, 12.0, 10.0]);
    }

    #[test]
    fn test_report_date_format() {
        let mut c = canvas();
        report_date(&mut c, chrono::NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()).unwrap();
        let cell = c.pages()[0].cells().next().unwrap();
        assert_eq!(cell.text, "Date: 01 Jul, 2024");
        assert!(cell.style.font_style.bold);
    }

    #[test]
    fn test_chart_missing_file() {
        let mut c = canvas();
        assert!(matches!(chart(&mut c, "/nonexistent/chart.png"), Err(Error::Image(_))));
    }
}
