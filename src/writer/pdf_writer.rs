//! PDF document writer.
//!
//! Assembles complete PDF documents with proper structure:
//! header, body, xref table, and trailer. All pages share one resource
//! dictionary holding the fonts, opacity states and images the document uses.

use super::content_stream::ContentStreamBuilder;
use super::font_manager::Base14Font;
use super::image_handler::ImageData;
use super::object_serializer::ObjectSerializer;
use crate::error::Result;
use crate::object::{Object, ObjectRef};
use std::collections::HashMap;
use std::io::Write;

/// Configuration for PDF generation.
#[derive(Debug, Clone)]
pub struct PdfWriterConfig {
    /// PDF version (e.g., "1.7")
    pub version: String,
    /// Document title
    pub title: Option<String>,
    /// Document author
    pub author: Option<String>,
    /// Document subject
    pub subject: Option<String>,
    /// Creator application
    pub creator: Option<String>,
    /// Creation date written to the Info dictionary
    pub creation_date: Option<chrono::NaiveDateTime>,
    /// Whether to compress content streams
    pub compress: bool,
}

impl Default for PdfWriterConfig {
    fn default() -> Self {
        Self {
            version: "1.7".to_string(),
            title: None,
            author: None,
            subject: None,
            creator: Some("report_oxide".to_string()),
            creation_date: None,
            compress: true,
        }
    }
}

impl PdfWriterConfig {
    /// Set document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set document author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set document subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the creation date.
    ///
    /// Left unset, output for identical input is byte-identical across runs.
    pub fn with_creation_date(mut self, date: chrono::NaiveDateTime) -> Self {
        self.creation_date = Some(date);
        self
    }

    /// Enable or disable content stream compression (FlateDecode).
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

/// Compress data using Flate/Deflate compression.
fn compress_data(data: &[u8]) -> std::io::Result<Vec<u8>> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Internal page data.
struct PageData {
    width: f32,
    height: f32,
    content: ContentStreamBuilder,
}

/// PDF document writer.
pub struct PdfWriter {
    config: PdfWriterConfig,
    pages: Vec<PageData>,
    fonts: Vec<Base14Font>,
    ext_gstates: Vec<(String, Object)>,
    images: Vec<(String, ImageData)>,
    /// Object ID counter
    next_obj_id: u32,
}

impl PdfWriter {
    /// Create a new PDF writer with default config.
    pub fn new() -> Self {
        Self::with_config(PdfWriterConfig::default())
    }

    /// Create a PDF writer with custom config.
    pub fn with_config(config: PdfWriterConfig) -> Self {
        Self {
            config,
            pages: Vec::new(),
            fonts: Vec::new(),
            ext_gstates: Vec::new(),
            images: Vec::new(),
            next_obj_id: 1,
        }
    }

    /// Allocate a new object ID.
    fn alloc_obj_id(&mut self) -> u32 {
        let id = self.next_obj_id;
        self.next_obj_id += 1;
        id
    }

    /// Append a page (size in points) with its finished content stream.
    pub fn add_page(&mut self, width: f32, height: f32, content: ContentStreamBuilder) {
        self.pages.push(PageData {
            width,
            height,
            content,
        });
    }

    /// Add a Base-14 font to the shared resources.
    pub fn add_font(&mut self, font: Base14Font) {
        if !self.fonts.contains(&font) {
            self.fonts.push(font);
        }
    }

    /// Add a named ExtGState dictionary to the shared resources.
    pub fn add_ext_gstate(&mut self, name: impl Into<String>, dict: Object) {
        self.ext_gstates.push((name.into(), dict));
    }

    /// Add a named image XObject to the shared resources.
    pub fn add_image(&mut self, resource_id: impl Into<String>, image: ImageData) {
        self.images.push((resource_id.into(), image));
    }

    /// Number of pages added so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Build the complete PDF document.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let serializer = ObjectSerializer::compact();
        let mut body: Vec<(u32, Object)> = Vec::new();

        let catalog_id = self.alloc_obj_id();
        let pages_id = self.alloc_obj_id();
        let resources_id = self.alloc_obj_id();

        // Fonts
        let mut font_resources = HashMap::new();
        for font in self.fonts.clone() {
            let font_id = self.alloc_obj_id();
            body.push((
                font_id,
                ObjectSerializer::dict(vec![
                    ("Type", ObjectSerializer::name("Font")),
                    ("Subtype", ObjectSerializer::name("Type1")),
                    ("BaseFont", ObjectSerializer::name(font.base_name())),
                    ("Encoding", ObjectSerializer::name("WinAnsiEncoding")),
                ]),
            ));
            font_resources.insert(font.resource_name(), ObjectSerializer::reference(font_id, 0));
        }

        // Images, each with an optional soft mask
        let mut xobject_resources = HashMap::new();
        for (resource_id, image) in std::mem::take(&mut self.images) {
            let image_id = self.alloc_obj_id();
            let mut dict = image.build_xobject_dict();

            if let (Some(mask_dict), Some(mask_data)) =
                (image.build_soft_mask_dict(), image.soft_mask.clone())
            {
                let mask_id = self.alloc_obj_id();
                dict.insert("SMask".to_string(), ObjectSerializer::reference(mask_id, 0));
                body.push((
                    mask_id,
                    Object::Stream {
                        dict: mask_dict,
                        data: bytes::Bytes::from(mask_data),
                    },
                ));
            }

            body.push((
                image_id,
                Object::Stream {
                    dict,
                    data: bytes::Bytes::from(image.data),
                },
            ));
            xobject_resources.insert(resource_id, ObjectSerializer::reference(image_id, 0));
        }

        let mut resource_entries = vec![(
            "ProcSet",
            Object::Array(vec![
                ObjectSerializer::name("PDF"),
                ObjectSerializer::name("Text"),
                ObjectSerializer::name("ImageC"),
                ObjectSerializer::name("ImageB"),
            ]),
        )];
        if !font_resources.is_empty() {
            resource_entries.push(("Font", Object::Dictionary(font_resources)));
        }
        if !self.ext_gstates.is_empty() {
            let states = std::mem::take(&mut self.ext_gstates).into_iter().collect();
            resource_entries.push(("ExtGState", Object::Dictionary(states)));
        }
        if !xobject_resources.is_empty() {
            resource_entries.push(("XObject", Object::Dictionary(xobject_resources)));
        }
        body.push((resources_id, ObjectSerializer::dict(resource_entries)));

        // Pages and their content streams
        let mut page_refs = Vec::with_capacity(self.pages.len());
        for page_data in std::mem::take(&mut self.pages) {
            let page_id = self.alloc_obj_id();
            let content_id = self.alloc_obj_id();

            let raw_content = page_data.content.build()?;
            let mut content_dict = HashMap::new();
            let content_bytes = if self.config.compress {
                content_dict.insert("Filter".to_string(), ObjectSerializer::name("FlateDecode"));
                compress_data(&raw_content)?
            } else {
                raw_content
            };

            body.push((
                page_id,
                ObjectSerializer::dict(vec![
                    ("Type", ObjectSerializer::name("Page")),
                    ("Parent", ObjectSerializer::reference(pages_id, 0)),
                    (
                        "MediaBox",
                        ObjectSerializer::rect(
                            0.0,
                            0.0,
                            page_data.width as f64,
                            page_data.height as f64,
                        ),
                    ),
                    ("Contents", ObjectSerializer::reference(content_id, 0)),
                    ("Resources", ObjectSerializer::reference(resources_id, 0)),
                ]),
            ));
            body.push((
                content_id,
                Object::Stream {
                    dict: content_dict,
                    data: bytes::Bytes::from(content_bytes),
                },
            ));
            page_refs.push(Object::Reference(ObjectRef::new(page_id, 0)));
        }

        let page_count = page_refs.len();
        body.push((
            pages_id,
            ObjectSerializer::dict(vec![
                ("Type", ObjectSerializer::name("Pages")),
                ("Kids", Object::Array(page_refs)),
                ("Count", ObjectSerializer::integer(page_count as i64)),
            ]),
        ));
        body.push((
            catalog_id,
            ObjectSerializer::dict(vec![
                ("Type", ObjectSerializer::name("Catalog")),
                ("Pages", ObjectSerializer::reference(pages_id, 0)),
            ]),
        ));

        let info_id = self.alloc_obj_id();
        let mut info_entries = Vec::new();
        if let Some(title) = &self.config.title {
            info_entries.push(("Title", ObjectSerializer::string(title)));
        }
        if let Some(author) = &self.config.author {
            info_entries.push(("Author", ObjectSerializer::string(author)));
        }
        if let Some(subject) = &self.config.subject {
            info_entries.push(("Subject", ObjectSerializer::string(subject)));
        }
        if let Some(creator) = &self.config.creator {
            info_entries.push(("Creator", ObjectSerializer::string(creator)));
        }
        if let Some(date) = &self.config.creation_date {
            let stamp = format!("D:{}", date.format("%Y%m%d%H%M%S"));
            info_entries.push(("CreationDate", ObjectSerializer::string(&stamp)));
        }
        body.push((info_id, ObjectSerializer::dict(info_entries)));

        body.sort_by_key(|(id, _)| *id);

        let mut output = Vec::new();
        writeln!(output, "%PDF-{}", self.config.version)?;
        // Binary marker (recommended for binary content)
        output.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");

        let mut xref_offsets = Vec::with_capacity(body.len());
        for (obj_id, obj) in &body {
            xref_offsets.push(output.len());
            serializer.write_indirect(&mut output, *obj_id, 0, obj)?;
        }

        let xref_start = output.len();
        writeln!(output, "xref")?;
        writeln!(output, "0 {}", self.next_obj_id)?;
        // Object 0 is always free
        writeln!(output, "0000000000 65535 f ")?;
        for offset in &xref_offsets {
            writeln!(output, "{:010} 00000 n ", offset)?;
        }

        let trailer = ObjectSerializer::dict(vec![
            ("Size", ObjectSerializer::integer(self.next_obj_id as i64)),
            ("Root", ObjectSerializer::reference(catalog_id, 0)),
            ("Info", ObjectSerializer::reference(info_id, 0)),
        ]);
        writeln!(output, "trailer")?;
        serializer.write(&mut output, &trailer)?;
        writeln!(output)?;
        writeln!(output, "startxref")?;
        writeln!(output, "{}", xref_start)?;
        write!(output, "%%EOF")?;

        log::debug!(
            "Wrote PDF: {} pages, {} objects, {} bytes",
            page_count,
            body.len(),
            output.len()
        );
        Ok(output)
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uncompressed() -> PdfWriter {
        PdfWriter::with_config(PdfWriterConfig::default().with_compress(false))
    }

    #[test]
    fn test_create_empty_pdf() {
        let mut writer = uncompressed();
        writer.add_page(595.28, 841.89, ContentStreamBuilder::new());
        let bytes = writer.finish().unwrap();

        let content = String::from_utf8_lossy(&bytes);
        assert!(content.starts_with("%PDF-1.7"));
        assert!(content.contains("/Type /Catalog"));
        assert!(content.contains("/Type /Pages"));
        assert!(content.contains("/Count 1"));
        assert!(content.ends_with("%%EOF"));
    }

    #[test]
    fn test_pdf_with_text() {
        let mut content = ContentStreamBuilder::new();
        content
            .set_font(&Base14Font::Helvetica.resource_name(), 12.0)
            .text(b"Page 1", 72.0, 720.0)
            .end_text();

        let mut writer = uncompressed();
        writer.add_font(Base14Font::Helvetica);
        writer.add_page(595.28, 841.89, content);
        let bytes = writer.finish().unwrap();
        let pdf = String::from_utf8_lossy(&bytes);

        assert!(pdf.contains("/BaseFont /Helvetica"));
        assert!(pdf.contains("/Encoding /WinAnsiEncoding"));
        assert!(pdf.contains("/Font <</Helvetica 4 0 R>>"));
        assert!(pdf.contains("(Page 1) Tj"));
    }

    #[test]
    fn test_pages_share_resources() {
        let mut writer = uncompressed();
        writer.add_ext_gstate(
            "GS1",
            super::super::graphics_state::ExtGStateBuilder::new()
                .fill_alpha(0.7)
                .build(),
        );
        writer.add_page(100.0, 100.0, ContentStreamBuilder::new());
        writer.add_page(100.0, 100.0, ContentStreamBuilder::new());
        let bytes = writer.finish().unwrap();
        let pdf = String::from_utf8_lossy(&bytes);

        assert_eq!(pdf.matches("/Resources 3 0 R").count(), 2);
        assert!(pdf.contains("/ExtGState <</GS1 <</Type /ExtGState/ca 0.7>>>>"));
    }

    #[test]
    fn test_pdf_with_metadata() {
        let config = PdfWriterConfig::default()
            .with_title("RFE Monthly Sales Report")
            .with_author("Sales")
            .with_creation_date(
                chrono::NaiveDate::from_ymd_opt(2024, 7, 1)
                    .unwrap()
                    .and_hms_opt(9, 30, 0)
                    .unwrap(),
            );

        let mut writer = PdfWriter::with_config(config);
        writer.add_page(100.0, 100.0, ContentStreamBuilder::new());
        let bytes = writer.finish().unwrap();
        let content = String::from_utf8_lossy(&bytes);

        assert!(content.contains("/Title (RFE Monthly Sales Report)"));
        assert!(content.contains("/Author (Sales)"));
        assert!(content.contains("/CreationDate (D:20240701093000)"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let mut writer = uncompressed();
        writer.add_font(Base14Font::TimesItalic);
        writer.add_page(100.0, 100.0, ContentStreamBuilder::new());
        let bytes = writer.finish().unwrap();

        // Offsets are byte positions, so search the raw bytes
        let xref = bytes.windows(6).position(|w| w == b"\nxref\n").unwrap() + 1;
        let table = String::from_utf8(bytes[xref..].to_vec()).unwrap();
        let entries: Vec<usize> = table
            .lines()
            .skip(3)
            .take_while(|l| l.ends_with(" n "))
            .map(|l| l[..10].parse().unwrap())
            .collect();
        assert!(!entries.is_empty());
        for (i, offset) in entries.iter().enumerate() {
            assert!(bytes[*offset..].starts_with(format!("{} 0 obj", i + 1).as_bytes()));
        }
    }

    #[test]
    fn test_compressed_stream_has_filter() {
        let mut writer = PdfWriter::new();
        writer.add_page(100.0, 100.0, ContentStreamBuilder::new());
        let bytes = writer.finish().unwrap();
        let pdf = String::from_utf8_lossy(&bytes);
        assert!(pdf.contains("/Filter /FlateDecode"));
    }
}
