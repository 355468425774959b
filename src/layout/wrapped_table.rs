//! Tables with a wrapping free-text column.
//!
//! Rendering is two-phase. Every row of a batch is measured first with
//! [`measure_row`], which never draws; only then is the batch drawn, each row
//! at its measured height. A row that does not fit the rest of the page moves
//! to a new page together with a continuation header. A row taller than a
//! whole page is an error.

use super::canvas::Canvas;
use super::measure::{FontSpec, Measurer};
use super::row::{validate_rows, ColumnSpec, Row};
use super::table::{RowOptions, RowStyle, TableRenderer};
use crate::error::{Error, Result};

/// Height of a row: the default row height, raised to fit the wrapped text
/// of the free-text column.
///
/// Other columns hold single-line values and never raise the height.
pub fn measure_row(
    row: &Row,
    widths: &[f32],
    free_text: Option<usize>,
    free_text_font: FontSpec,
    measurer: &Measurer,
    min_height: f32,
) -> f32 {
    row.cells
        .values()
        .zip(widths)
        .enumerate()
        .filter(|(i, _)| Some(*i) == free_text)
        .map(|(_, (text, &width))| measurer.wrapped_height(width, text, free_text_font))
        .fold(min_height, f32::max)
}

/// Table renderer whose rows grow to fit one free-text column.
pub struct WrappedTableRenderer<'c> {
    inner: TableRenderer<'c>,
    free_text_column: Option<String>,
}

impl<'c> WrappedTableRenderer<'c> {
    /// Start a table and draw its header. `free_text_column` is the row label
    /// of the wrapping column.
    pub fn new(
        canvas: &'c mut Canvas,
        header: Vec<String>,
        columns: ColumnSpec,
        free_text_column: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            inner: TableRenderer::new(canvas, header, columns)?,
            free_text_column: free_text_column.map(str::to_string),
        })
    }

    /// Start a table whose header is the labels of the first row.
    pub fn from_rows(
        canvas: &'c mut Canvas,
        rows: &[Row],
        columns: ColumnSpec,
        free_text_column: Option<&str>,
    ) -> Result<Self> {
        let header = validate_rows(rows, &columns)?;
        let free_text = free_text_index(free_text_column, &header)?;
        let first = &rows[0];
        let style = RowStyle::resolve(first.kind, rows.len() == 1, true);
        let inner = TableRenderer::with_first_row(canvas, header, columns, |table| {
            let canvas = table.canvas();
            measure_row(
                first,
                table.widths(),
                free_text,
                style.free_text_font(canvas.config()),
                &canvas.measurer(),
                canvas.config().row_height(),
            )
        })?;
        Ok(Self {
            inner,
            free_text_column: free_text_column.map(str::to_string),
        })
    }

    /// Column widths in user units.
    pub fn widths(&self) -> &[f32] {
        self.inner.widths()
    }

    /// Measure every row of a batch without drawing anything.
    pub fn measure_rows(&self, rows: &[Row], options: RowOptions) -> Result<Vec<f32>> {
        let labels = validate_rows(rows, self.inner.columns())?;
        let free_text = self.free_text_index(&labels)?;
        let canvas = self.inner.canvas();
        let config = canvas.config();
        let measurer = canvas.measurer();
        let last = rows.len() - 1;

        Ok(rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let style = RowStyle::resolve(row.kind, i == last, options.highlight_last_row);
                measure_row(
                    row,
                    self.inner.widths(),
                    free_text,
                    style.free_text_font(config),
                    &measurer,
                    config.row_height(),
                )
            })
            .collect())
    }

    /// Measure, then draw, a batch of rows.
    pub fn draw_rows(&mut self, rows: &[Row], options: RowOptions) -> Result<()> {
        let heights = self.measure_rows(rows, options)?;
        let labels: Vec<String> = rows[0].cells.keys().cloned().collect();
        let free_text = self.free_text_index(&labels)?;

        let available = self.inner.canvas().config().fresh_page_height();
        if let Some(&tallest) = heights.iter().find(|&&h| h > available) {
            return Err(Error::OverflowNeverResolves {
                needed: tallest,
                available,
            });
        }
        self.inner.draw_batch(rows, &heights, options, free_text)
    }

    fn free_text_index(&self, labels: &[String]) -> Result<Option<usize>> {
        free_text_index(self.free_text_column.as_deref(), labels)
    }
}

fn free_text_index(name: Option<&str>, labels: &[String]) -> Result<Option<usize>> {
    match name {
        None => Ok(None),
        Some(name) => labels
            .iter()
            .position(|label| label == name)
            .map(Some)
            .ok_or_else(|| Error::DataShapeMismatch {
                row: 0,
                reason: format!("no free-text column '{}'", name),
            }),
    }
}
