// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::should_implement_trait)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]
#![cfg_attr(test, allow(unused_variables))]

//! # Report Oxide
//!
//! Paginated PDF layout for tabular business reports.
//!
//! ## Core Features
//!
//! - **Canvas**: cursor-driven page surface with automatic page breaks,
//!   repeating header/footer and scoped style changes
//! - **Tables**: fixed-height tables with continuation headers, row-kind
//!   shading, negative-value highlighting and vertical group rules
//! - **Wrapped tables**: rows measured before drawing so a free-text column
//!   can grow without splitting across pages
//! - **Blocks**: full-width panels with inline markup, status rows with
//!   traffic-light indicators, aspect-fitted charts
//! - **Output**: Base-14 fonts, opacity through ExtGStates, PNG/JPEG images,
//!   compressed content streams; bytes, base64 and HTTP attachment payloads
//!
//! ## Architecture
//!
//! ```text
//! report (data + composition)
//!     ↓
//! layout (Canvas, TableRenderer, WrappedTableRenderer, blocks)
//!     ↓
//! writer (ContentStreamBuilder → PdfWriter → ObjectSerializer)
//!     ↓
//! PdfOutput
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use report_oxide::layout::{render_table, Canvas, ColumnSpec, Row, RowKind, RowOptions};
//! use report_oxide::LayoutConfig;
//!
//! # fn main() -> report_oxide::Result<()> {
//! let mut canvas = Canvas::new(LayoutConfig::default())?;
//! let rows = vec![
//!     Row::normal([("Region", "NORTH"), ("Actual", "1,200.0")]),
//!     Row::new(RowKind::Emphasized, [("Region", "CASES"), ("Actual", "-120.0")]),
//!     Row::normal([("Region", "TOTAL"), ("Actual", "1,080.0")]),
//! ];
//! render_table(&mut canvas, &rows, ColumnSpec::new(vec![0.5, 0.5])?, RowOptions::new())?;
//!
//! let output = canvas.finish()?;
//! assert_eq!(output.page_count(), 1);
//! assert!(output.as_bytes().starts_with(b"%PDF-"));
//! # Ok(())
//! # }
//! ```
//!
//! ## License
//!
//! Licensed under either of:
//!
//! * Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]

// Error handling
pub mod error;

// PDF object model
pub mod object;

// Configuration
pub mod config;

// PDF writing
pub mod writer;

// Page layout
pub mod layout;

// Finished documents
pub mod output;

// Monthly sales report
pub mod report;

// Re-exports
pub use config::LayoutConfig;
pub use error::{Error, Result};
pub use layout::{Canvas, ColumnSpec, Row, RowKind, RowOptions, TableRenderer, WrappedTableRenderer};
pub use output::{HttpResponse, PdfOutput};

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
