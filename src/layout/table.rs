//! Paginated table rendering.
//!
//! A table is a header row followed by batches of data rows. Before each row
//! the renderer checks the remaining page height; when the row would cross
//! the bottom margin it starts a new page, advances past the continuation
//! gap and draws the header again, so every page that carries rows of the
//! table also carries its header.
//!
//! Row shading follows [`RowKind`] with this precedence:
//!
//! 1. [`RowKind::Emphasized`] rows use the emphasized fill.
//! 2. [`RowKind::Total`] rows, and the last row of a batch drawn with
//!    `highlight_last_row`, use the total fill.
//! 3. Everything else is a plain bordered row.
//!
//! Independently of shading, a cell whose text contains the negative marker
//! is drawn in the alert colour.

use super::canvas::{Canvas, CellOptions, CellRole};
use super::measure::FontSpec;
use super::row::{validate_rows, ColumnSpec, Row, RowKind};
use super::style::{Align, FontStyle, StyleOverrides};
use crate::config::LayoutConfig;
use crate::error::{Error, Result};
use crate::writer::{FontFamily, FontManager, FontWeight};

/// Per-batch drawing options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowOptions {
    /// Shade the batch's last row as a total
    pub highlight_last_row: bool,
    /// Draw vertical group rules over the batch
    pub vertical_rules: bool,
}

impl Default for RowOptions {
    fn default() -> Self {
        Self {
            highlight_last_row: true,
            vertical_rules: false,
        }
    }
}

impl RowOptions {
    /// Default options: last row highlighted, no vertical rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set last-row highlighting.
    pub fn highlight_last_row(mut self, on: bool) -> Self {
        self.highlight_last_row = on;
        self
    }

    /// Set vertical group rules.
    pub fn vertical_rules(mut self, on: bool) -> Self {
        self.vertical_rules = on;
        self
    }
}

/// Shading applied to a drawn row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStyle {
    /// Emphasized fill, bold
    Emphasized,
    /// Total fill, bold
    Total,
    /// Border only
    Plain,
}

impl RowStyle {
    /// Resolve the shading of a row.
    pub fn resolve(kind: RowKind, is_last: bool, highlight_last_row: bool) -> Self {
        match kind {
            RowKind::Emphasized => RowStyle::Emphasized,
            RowKind::Total => RowStyle::Total,
            RowKind::Normal if is_last && highlight_last_row => RowStyle::Total,
            RowKind::Normal => RowStyle::Plain,
        }
    }

    /// True for shaded rows.
    pub fn is_filled(self) -> bool {
        !matches!(self, RowStyle::Plain)
    }

    /// Face of the row's cells.
    pub fn font_style(self) -> FontStyle {
        if self.is_filled() {
            FontStyle::BOLD
        } else {
            FontStyle::REGULAR
        }
    }

    /// Font of the row's free-text cell.
    pub(crate) fn free_text_font(self, config: &LayoutConfig) -> FontSpec {
        let weight = if self.is_filled() {
            FontWeight::Bold
        } else {
            FontWeight::Normal
        };
        FontSpec::new(
            FontManager::select_font(FontFamily::Helvetica, weight, true),
            config.table_font_size,
        )
    }

    /// Cell style for the row.
    pub fn overrides(self, config: &LayoutConfig) -> StyleOverrides {
        let base = StyleOverrides::new()
            .stroke_color(config.rule_color)
            .stroke_opacity(config.border_opacity)
            .line_width(config.border_width)
            .font(FontFamily::Helvetica, self.font_style(), config.table_font_size);
        match self {
            RowStyle::Emphasized => base
                .fill_color(config.emphasized_fill)
                .fill_opacity(config.emphasized_fill_opacity),
            RowStyle::Total => base
                .fill_color(config.emphasized_fill)
                .fill_opacity(config.total_fill_opacity),
            RowStyle::Plain => base,
        }
    }
}

/// Draws one table onto a canvas.
pub struct TableRenderer<'c> {
    canvas: &'c mut Canvas,
    header: Vec<String>,
    columns: ColumnSpec,
    widths: Vec<f32>,
}

impl<'c> TableRenderer<'c> {
    /// Start a table and draw its header at the cursor.
    ///
    /// When there is no room for the header and one row, the table starts
    /// on a new page.
    pub fn new(canvas: &'c mut Canvas, header: Vec<String>, columns: ColumnSpec) -> Result<Self> {
        let row_height = canvas.config().row_height();
        Self::with_first_row(canvas, header, columns, |_| row_height)
    }

    /// Like [`TableRenderer::new`], but the room kept below the header is the
    /// height of the first row, computed from the column widths.
    pub(crate) fn with_first_row<F>(
        canvas: &'c mut Canvas,
        header: Vec<String>,
        columns: ColumnSpec,
        first_row_height: F,
    ) -> Result<Self>
    where
        F: FnOnce(&Self) -> f32,
    {
        if header.len() != columns.len() {
            return Err(Error::InvalidColumnSpec(format!(
                "{} header labels for {} columns",
                header.len(),
                columns.len()
            )));
        }
        let widths = columns.widths(canvas.config().usable_width());
        let mut renderer = Self {
            canvas,
            header,
            columns,
            widths,
        };

        let row_height = renderer.canvas.config().row_height();
        let first = first_row_height(&renderer).max(row_height);
        if !renderer.canvas.at_page_top() && renderer.canvas.will_overflow(row_height + first) {
            renderer.canvas.begin_page();
        }
        renderer.draw_header()?;
        Ok(renderer)
    }

    /// Start a table whose header is the labels of the first row.
    pub fn from_rows(canvas: &'c mut Canvas, rows: &[Row], columns: ColumnSpec) -> Result<Self> {
        let header = validate_rows(rows, &columns)?;
        Self::new(canvas, header, columns)
    }

    /// Column widths in user units.
    pub fn widths(&self) -> &[f32] {
        &self.widths
    }

    /// The column layout.
    pub fn columns(&self) -> &ColumnSpec {
        &self.columns
    }

    /// The canvas being drawn on.
    pub fn canvas(&self) -> &Canvas {
        self.canvas
    }

    /// Draw a batch of fixed-height rows.
    pub fn draw_rows(&mut self, rows: &[Row], options: RowOptions) -> Result<()> {
        validate_rows(rows, &self.columns)?;
        let heights = vec![self.canvas.config().row_height(); rows.len()];
        self.draw_batch(rows, &heights, options, None)
    }

    /// Draw rows with precomputed heights. `free_text` names the column
    /// whose text wraps.
    pub(crate) fn draw_batch(
        &mut self,
        rows: &[Row],
        heights: &[f32],
        options: RowOptions,
        free_text: Option<usize>,
    ) -> Result<()> {
        let last = rows.len().saturating_sub(1);
        let mut segment_top: Option<f32> = None;

        for (i, (row, &height)) in rows.iter().zip(heights).enumerate() {
            if self.canvas.will_overflow(height) {
                if let Some(top) = segment_top.take() {
                    if options.vertical_rules {
                        let bottom = self.canvas.y();
                        self.draw_vertical_rules(top, bottom);
                    }
                }
                self.continue_on_new_page()?;
                if self.canvas.will_overflow(height) {
                    return Err(Error::OverflowNeverResolves {
                        needed: height,
                        available: self.canvas.remaining_height(),
                    });
                }
            }

            let top = *segment_top.get_or_insert(self.canvas.y());
            log::trace!("Row {} at y {:.2} (segment from {:.2})", i, self.canvas.y(), top);
            let style = RowStyle::resolve(row.kind, i == last, options.highlight_last_row);
            self.draw_row(row, height, style, free_text)?;
            self.canvas.advance_line(height);
        }

        if let Some(top) = segment_top {
            if options.vertical_rules {
                let bottom = self.canvas.y();
                self.draw_vertical_rules(top, bottom);
            }
        }
        Ok(())
    }

    fn continue_on_new_page(&mut self) -> Result<()> {
        self.canvas.begin_page();
        let gap = self.canvas.config().continuation_gap;
        self.canvas.advance_line(gap);
        log::debug!("Table continues on page {}", self.canvas.current_page());
        self.draw_header()
    }

    fn draw_header(&mut self) -> Result<()> {
        let config = self.canvas.config();
        let height = config.row_height();
        let options = CellOptions::new()
            .align(Align::Center)
            .role(CellRole::TableHeader)
            .style(StyleOverrides::new().font(
                FontFamily::Helvetica,
                FontStyle::BOLD,
                config.table_font_size,
            ));

        for (label, &width) in self.header.iter().zip(&self.widths) {
            self.canvas.draw_cell(width, height, label, &options)?;
        }
        self.canvas.advance_line(height);
        let y = self.canvas.y();
        self.canvas.draw_rule(y);
        Ok(())
    }

    fn draw_row(
        &mut self,
        row: &Row,
        height: f32,
        style: RowStyle,
        free_text: Option<usize>,
    ) -> Result<()> {
        let config = self.canvas.config();
        let overrides = style.overrides(config);
        let (marker, alert, normal) = (config.negative_marker, config.alert_color, config.text_color);
        let free_font = style.free_text_font(config);
        let pitch = self.canvas.measurer().line_pitch(free_font);

        for (i, (value, &width)) in row.cells.values().zip(&self.widths).enumerate() {
            let color = if value.contains(marker) { alert } else { normal };
            let cell = CellOptions::new()
                .border(true)
                .fill(style.is_filled())
                .role(CellRole::TableBody);

            if Some(i) == free_text {
                let cell = cell.align(Align::Left).style(
                    overrides
                        .clone()
                        .font_style(FontStyle {
                            italic: true,
                            ..style.font_style()
                        })
                        .text_color(color),
                );
                self.canvas.draw_multi_cell(width, height, value, pitch, &cell)?;
            } else {
                let cell = cell
                    .align(Align::Right)
                    .style(overrides.clone().text_color(color));
                self.canvas.draw_cell(width, height, value, &cell)?;
            }
        }
        Ok(())
    }

    /// Right edge of a column, or `None` when the table has no such column.
    fn right_edge(&self, column: usize) -> Option<f32> {
        if column >= self.widths.len() {
            return None;
        }
        let left = self.canvas.config().margin_left;
        Some(left + self.widths[..=column].iter().sum::<f32>())
    }

    fn draw_vertical_rules(&mut self, top: f32, bottom: f32) {
        let config = self.canvas.config();
        let edges: Vec<f32> = config
            .vertical_rule_columns
            .iter()
            .filter_map(|&column| self.right_edge(column))
            .collect();
        let overrides = StyleOverrides::new()
            .stroke_color(config.rule_color)
            .stroke_opacity(config.vertical_rule_opacity)
            .line_width(config.vertical_rule_width);

        self.canvas.scoped(&overrides, |canvas| {
            for x in edges {
                canvas.draw_line(x, top, x, bottom);
            }
        });
    }
}

/// Draw a one-batch table whose header is the first row's labels.
pub fn render_table(
    canvas: &mut Canvas,
    rows: &[Row],
    columns: ColumnSpec,
    options: RowOptions,
) -> Result<()> {
    let mut table = TableRenderer::from_rows(canvas, rows, columns)?;
    table.draw_rows(rows, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Color;

    #[test]
    fn test_row_style_precedence() {
        use RowKind::*;
        assert_eq!(RowStyle::resolve(Emphasized, true, true), RowStyle::Emphasized);
        assert_eq!(RowStyle::resolve(Emphasized, false, false), RowStyle::Emphasized);
        assert_eq!(RowStyle::resolve(Total, false, false), RowStyle::Total);
        assert_eq!(RowStyle::resolve(Normal, true, true), RowStyle::Total);
        assert_eq!(RowStyle::resolve(Normal, true, false), RowStyle::Plain);
        assert_eq!(RowStyle::resolve(Normal, false, true), RowStyle::Plain);
    }

    #[test]
    fn test_row_style_overrides() {
        let config = LayoutConfig::default();
        let emphasized = RowStyle::Emphasized.overrides(&config);
        assert_eq!(emphasized.fill_opacity, Some(0.7));
        assert_eq!(emphasized.fill_color, Some(Color::rgb(199, 191, 170)));
        assert_eq!(emphasized.font_style, Some(FontStyle::BOLD));

        let total = RowStyle::Total.overrides(&config);
        assert_eq!(total.fill_opacity, Some(1.0));

        let plain = RowStyle::Plain.overrides(&config);
        assert_eq!(plain.fill_color, None);
        assert_eq!(plain.stroke_opacity, Some(0.5));
        assert_eq!(plain.stroke_color, Some(Color::rgb(142, 127, 85)));
    }

    #[test]
    fn test_free_text_font() {
        let config = LayoutConfig::default();
        assert_eq!(
            RowStyle::Plain.free_text_font(&config).font,
            crate::writer::Base14Font::HelveticaOblique
        );
        assert_eq!(
            RowStyle::Total.free_text_font(&config).font,
            crate::writer::Base14Font::HelveticaBoldOblique
        );
    }

    #[test]
    fn test_header_label_count_checked() {
        let mut canvas = Canvas::new(LayoutConfig::default()).unwrap();
        let columns = ColumnSpec::new(vec![0.5, 0.5]).unwrap();
        let result = TableRenderer::new(&mut canvas, vec!["Only".to_string()], columns);
        assert!(matches!(result, Err(Error::InvalidColumnSpec(_))));
    }

    #[test]
    fn test_right_edges() {
        let mut canvas = Canvas::new(LayoutConfig::default()).unwrap();
        let columns = ColumnSpec::new(vec![0.2, 0.3, 0.5]).unwrap();
        let header = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let table = TableRenderer::new(&mut canvas, header, columns).unwrap();
        assert!((table.right_edge(0).unwrap() - 48.0).abs() < 1e-3);
        assert!((table.right_edge(2).unwrap() - 200.0).abs() < 1e-3);
        assert_eq!(table.right_edge(7), None);
    }
}
