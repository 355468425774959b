//! Page layout: the canvas, measurement, tables and composite blocks.
//!
//! ```text
//! Row / ColumnSpec ──► TableRenderer ──┐
//!                      WrappedTableRenderer ──► Canvas ──► writer::PdfWriter
//! blocks (panel, status row, chart) ───┘
//! ```
//!
//! All lengths are user units (millimetres by default) measured from the
//! top-left corner of the page.

pub mod blocks;
mod canvas;
pub mod markup;
mod measure;
mod row;
mod style;
mod table;
mod wrapped_table;

pub use blocks::{Status, StatusRow};
pub use canvas::{Canvas, CellItem, CellOptions, CellRole, Page, PageItem, StyleGuard};
pub use measure::{FontSpec, Measurer};
pub use row::{validate_rows, ColumnSpec, Row, RowKind};
pub use style::{Align, Color, FontStyle, Style, StyleOverrides};
pub use table::{render_table, RowOptions, RowStyle, TableRenderer};
pub use wrapped_table::{measure_row, WrappedTableRenderer};
