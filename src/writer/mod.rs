//! PDF writing module.
//!
//! The layout engine records what goes on each page; this module turns those
//! records into PDF bytes.
//!
//! ## Architecture
//!
//! ```text
//! layout::Canvas (display list per page)
//!     ↓
//! [ContentStreamBuilder] (page items → content stream operators)
//!     ↓
//! [PdfWriter] (pages + shared fonts/ExtGStates/images → PDF structure)
//!     ↓
//! [ObjectSerializer] (serializes PDF objects)
//!     ↓
//! PDF bytes
//! ```
//!
//! ## Low-Level API (PdfWriter)
//!
//! ```
//! use report_oxide::writer::{Base14Font, ContentStreamBuilder, PdfWriter};
//!
//! let mut content = ContentStreamBuilder::new();
//! content
//!     .set_font(&Base14Font::Helvetica.resource_name(), 12.0)
//!     .text(b"Hello, World!", 72.0, 720.0)
//!     .end_text();
//!
//! let mut writer = PdfWriter::new();
//! writer.add_font(Base14Font::Helvetica);
//! writer.add_page(595.28, 841.89, content);
//! let bytes = writer.finish()?;
//! assert!(bytes.starts_with(b"%PDF-1.7"));
//! # Ok::<(), report_oxide::error::Error>(())
//! ```

mod content_stream;
mod font_manager;
pub mod graphics_state;
mod image_handler;
mod object_serializer;
mod pdf_writer;

pub use content_stream::{ContentStreamBuilder, ContentStreamOp};
pub use font_manager::{encode_win_ansi, Base14Font, FontFamily, FontManager, FontWeight};
pub use graphics_state::{ExtGStateBuilder, ExtGStateRegistry, OpacityKey};
pub use image_handler::{
    ColorSpace, ImageData, ImageError, ImageFormat, ImageManager, ImagePlacement,
};
pub use object_serializer::ObjectSerializer;
pub use pdf_writer::{PdfWriter, PdfWriterConfig};
