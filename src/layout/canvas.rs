//! The page canvas.
//!
//! A [`Canvas`] owns the pages of one report, a cursor in user units with a
//! top-left origin, and a stack of drawing styles. Drawing primitives append
//! items to the current page's display list; [`Canvas::finish`] converts the
//! display lists into PDF content streams.
//!
//! Every page gets the same decoration: an optional logo and a rule in the
//! header, and a right-aligned "Page N" footer.

use super::measure::{FontSpec, Measurer};
use super::style::{Align, Color, FontStyle, Style, StyleOverrides};
use crate::config::LayoutConfig;
use crate::error::{Error, Result};
use crate::output::PdfOutput;
use crate::writer::{
    encode_win_ansi, ContentStreamBuilder, ExtGStateRegistry, FontFamily, FontManager,
    ImageManager, ImagePlacement, OpacityKey, PdfWriter, PdfWriterConfig,
};
use std::ops::{Deref, DerefMut};
use std::path::Path;

/// Slack used when comparing positions against the page-break trigger.
const EPSILON: f32 = 1e-3;

/// Text baseline offset below a cell's vertical centre, in font sizes.
const BASELINE_SHIFT: f32 = 0.3;

/// What a cell belongs to. Carried through to the display list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellRole {
    /// Free-standing cell
    #[default]
    Plain,
    /// Column header of a table
    TableHeader,
    /// Data cell of a table
    TableBody,
    /// Page number footer
    Footer,
}

/// How a cell is drawn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellOptions {
    /// Text alignment
    pub align: Align,
    /// Stroke the cell outline
    pub border: bool,
    /// Paint the cell background
    pub fill: bool,
    /// Display-list tag
    pub role: CellRole,
    /// Style applied to this cell only
    pub style: StyleOverrides,
}

impl CellOptions {
    /// Left-aligned, no border, no fill.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the alignment.
    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Enable or disable the outline.
    pub fn border(mut self, border: bool) -> Self {
        self.border = border;
        self
    }

    /// Enable or disable the background.
    pub fn fill(mut self, fill: bool) -> Self {
        self.fill = fill;
        self
    }

    /// Tag the cell.
    pub fn role(mut self, role: CellRole) -> Self {
        self.role = role;
        self
    }

    /// Per-cell style overrides.
    pub fn style(mut self, style: StyleOverrides) -> Self {
        self.style = style;
        self
    }
}

/// A rectangular cell as recorded in the display list.
#[derive(Debug, Clone, PartialEq)]
pub struct CellItem {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
    /// Single-line text; empty for boxes whose text is recorded separately
    pub text: String,
    /// Text alignment
    pub align: Align,
    /// Outline stroked
    pub border: bool,
    /// Background painted
    pub fill: bool,
    /// Display-list tag
    pub role: CellRole,
    /// Resolved style
    pub style: Style,
}

/// One drawing instruction on a page, in user units with a top-left origin.
#[derive(Debug, Clone, PartialEq)]
pub enum PageItem {
    /// Cell box with optional text
    Cell(CellItem),
    /// Text run positioned by its baseline
    Text {
        /// Left edge of the run
        x: f32,
        /// Baseline
        baseline: f32,
        /// Text
        text: String,
        /// Resolved style
        style: Style,
    },
    /// Straight stroked line
    Line {
        /// Start x
        x1: f32,
        /// Start y
        y1: f32,
        /// End x
        x2: f32,
        /// End y
        y2: f32,
        /// Resolved style
        style: Style,
    },
    /// Image XObject
    Image {
        /// Resource name
        resource_id: String,
        /// Left edge
        x: f32,
        /// Top edge
        y: f32,
        /// Width
        width: f32,
        /// Height
        height: f32,
    },
}

/// A page and its display list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    number: usize,
    items: Vec<PageItem>,
}

impl Page {
    /// One-based page number.
    pub fn number(&self) -> usize {
        self.number
    }

    /// All items in drawing order.
    pub fn items(&self) -> &[PageItem] {
        &self.items
    }

    /// Cell items in drawing order.
    pub fn cells(&self) -> impl Iterator<Item = &CellItem> {
        self.items.iter().filter_map(|item| match item {
            PageItem::Cell(cell) => Some(cell),
            _ => None,
        })
    }

    /// Text runs in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            PageItem::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Drawing surface for one report.
#[derive(Debug)]
pub struct Canvas {
    config: LayoutConfig,
    measurer: Measurer,
    pages: Vec<Page>,
    x: f32,
    y: f32,
    styles: Vec<Style>,
    images: ImageManager,
    logo: Option<String>,
    document: PdfWriterConfig,
}

impl Canvas {
    /// Create a canvas and start its first page.
    ///
    /// A configured logo is loaded once here and reused on every page.
    pub fn new(config: LayoutConfig) -> Result<Self> {
        let mut images = ImageManager::new();
        let logo = match &config.logo {
            Some(path) => Some(images.register_from_file(path)?),
            None => None,
        };

        let mut canvas = Self {
            measurer: Measurer::from_config(&config),
            x: config.margin_left,
            y: config.margin_top,
            config,
            pages: Vec::new(),
            styles: vec![Style::default()],
            images,
            logo,
            document: PdfWriterConfig::default(),
        };
        canvas.begin_page();
        Ok(canvas)
    }

    /// Set the document information written on finish.
    pub fn with_document_info(mut self, document: PdfWriterConfig) -> Self {
        self.document = document;
        self
    }

    /// Layout configuration.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Measurement helper for this canvas's unit system.
    pub fn measurer(&self) -> Measurer {
        self.measurer
    }

    // --- pages ------------------------------------------------------------

    /// Close the current page and start a new one.
    ///
    /// The new page gets its header decoration and the body font is reset to
    /// Helvetica 10. The cursor moves to the top of the content area.
    pub fn begin_page(&mut self) {
        self.close_page();

        let number = self.pages.len() + 1;
        self.pages.push(Page {
            number,
            items: Vec::new(),
        });
        self.draw_page_header();

        if let Some(base) = self.styles.first_mut() {
            base.font_family = FontFamily::Helvetica;
            base.font_style = FontStyle::REGULAR;
            base.font_size = 10.0;
        }
        self.x = self.config.margin_left;
        self.y = self.config.content_top();
        log::debug!("Started page {}", number);
    }

    fn draw_page_header(&mut self) {
        if let Some(logo) = self.logo.clone() {
            let size = self.config.logo_size;
            self.push_item(PageItem::Image {
                resource_id: logo,
                x: (self.config.page_width - size) / 2.0,
                y: self.config.logo_y,
                width: size,
                height: size,
            });
        }
        let y = self.config.header_rule_y;
        self.draw_rule(y);
    }

    /// Append the footer to the current page, if any.
    fn close_page(&mut self) {
        let Some(number) = self.pages.last().map(Page::number) else {
            return;
        };
        let style = Style::default().with_overrides(
            &StyleOverrides::new()
                .font(FontFamily::Helvetica, FontStyle::ITALIC, self.config.footer_font_size)
                .text_color(Color::gray(self.config.footer_gray)),
        );
        self.push_item(PageItem::Cell(CellItem {
            x: self.config.margin_left,
            y: self.config.page_height - self.config.footer_offset,
            width: self.config.usable_width(),
            height: 10.0,
            text: format!("Page {}", number),
            align: Align::Right,
            border: false,
            fill: false,
            role: CellRole::Footer,
            style,
        }));
    }

    /// Pages so far. The footer of the current page is added when the page
    /// is closed.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Number of pages so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// One-based number of the page being drawn.
    pub fn current_page(&self) -> usize {
        self.pages.len()
    }

    fn push_item(&mut self, item: PageItem) {
        if let Some(page) = self.pages.last_mut() {
            page.items.push(item);
        }
    }

    // --- cursor -----------------------------------------------------------

    /// Cursor x.
    pub fn x(&self) -> f32 {
        self.x
    }

    /// Cursor y.
    pub fn y(&self) -> f32 {
        self.y
    }

    /// Move the cursor.
    pub fn set_xy(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    /// Move the cursor horizontally.
    pub fn set_x(&mut self, x: f32) {
        self.x = x;
    }

    /// Return to the left margin and move down by `height`.
    ///
    /// The cursor never moves past the page-break trigger; any later draw
    /// that needs room then starts a new page.
    pub fn advance_line(&mut self, height: f32) {
        self.x = self.config.margin_left;
        self.y = (self.y + height).min(self.config.page_break_trigger());
    }

    /// True when content of `height` at the cursor would cross the bottom
    /// margin.
    pub fn will_overflow(&self, height: f32) -> bool {
        self.y + height > self.config.page_break_trigger() + EPSILON
    }

    /// Vertical space left above the bottom margin.
    pub fn remaining_height(&self) -> f32 {
        (self.config.page_break_trigger() - self.y).max(0.0)
    }

    /// Horizontal space left before the right margin.
    pub fn remaining_width(&self) -> f32 {
        (self.config.page_width - self.config.margin_right - self.x).max(0.0)
    }

    /// True when nothing has been placed below the header yet.
    pub fn at_page_top(&self) -> bool {
        self.y <= self.config.content_top() + EPSILON
    }

    /// Make room for `height` at the cursor, starting a new page if needed.
    ///
    /// Returns whether a page break happened.
    pub fn ensure_room(&mut self, height: f32) -> Result<bool> {
        if !self.will_overflow(height) {
            return Ok(false);
        }
        if !self.at_page_top() {
            self.begin_page();
            if !self.will_overflow(height) {
                return Ok(true);
            }
        }
        Err(Error::OverflowNeverResolves {
            needed: height,
            available: self.remaining_height(),
        })
    }

    // --- style ------------------------------------------------------------

    /// The style in effect.
    pub fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    /// Change the style in effect for the rest of the enclosing scope.
    pub fn set_style(&mut self, overrides: &StyleOverrides) {
        if let Some(top) = self.styles.last_mut() {
            *top = top.with_overrides(overrides);
        }
    }

    /// Enter a style scope. The previous style is restored when the guard
    /// drops, on every exit path.
    pub fn push_style(&mut self, overrides: &StyleOverrides) -> StyleGuard<'_> {
        let depth = self.styles.len();
        let style = self.style().with_overrides(overrides);
        self.styles.push(style);
        StyleGuard {
            canvas: self,
            depth,
        }
    }

    /// Run `body` inside a style scope.
    pub fn scoped<R>(&mut self, overrides: &StyleOverrides, body: impl FnOnce(&mut Canvas) -> R) -> R {
        let mut guard = self.push_style(overrides);
        body(&mut guard)
    }

    /// Font of the style in effect.
    pub fn font_spec(&self) -> FontSpec {
        let style = self.style();
        FontSpec::new(style.font(), style.font_size)
    }

    /// Width of `text` in the font in effect.
    pub fn text_width(&self, text: &str) -> f32 {
        self.measurer.text_width(text, self.font_spec())
    }

    // --- primitives -------------------------------------------------------

    /// Draw a single-line cell at the cursor and move the cursor right by
    /// `width`.
    pub fn draw_cell(&mut self, width: f32, height: f32, text: &str, options: &CellOptions) -> Result<()> {
        check_geometry("cell", width, height)?;
        self.ensure_room(height)?;

        let style = self.style().with_overrides(&options.style);
        self.push_item(PageItem::Cell(CellItem {
            x: self.x,
            y: self.y,
            width,
            height,
            text: text.to_string(),
            align: options.align,
            border: options.border,
            fill: options.fill,
            role: options.role,
            style,
        }));
        self.x += width;
        Ok(())
    }

    /// Draw a cell whose text wraps onto lines `line_height` apart.
    ///
    /// The box spans the full `height`. The cursor moves right by `width`
    /// and stays on the cell's top edge. Returns the number of lines.
    pub fn draw_multi_cell(
        &mut self,
        width: f32,
        height: f32,
        text: &str,
        line_height: f32,
        options: &CellOptions,
    ) -> Result<usize> {
        check_geometry("multi-cell", width, height)?;
        self.ensure_room(height)?;

        let style = self.style().with_overrides(&options.style);
        let font = FontSpec::new(style.font(), style.font_size);
        let margin = self.measurer.cell_margin();
        let lines = self.measurer.wrap_lines(text, font, width - 2.0 * margin);

        let (x, y) = (self.x, self.y);
        self.push_item(PageItem::Cell(CellItem {
            x,
            y,
            width,
            height,
            text: String::new(),
            align: options.align,
            border: options.border,
            fill: options.fill,
            role: options.role,
            style,
        }));

        let font_size = self.measurer.font_size(font);
        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let line_width = self.measurer.text_width(line, font);
            let baseline =
                y + i as f32 * line_height + line_height / 2.0 + BASELINE_SHIFT * font_size;
            self.push_item(PageItem::Text {
                x: aligned_x(x, width, line_width, margin, options.align),
                baseline,
                text: line.clone(),
                style,
            });
        }

        self.x += width;
        Ok(lines.len())
    }

    /// Draw a text run with its baseline at `baseline`. The cursor is not
    /// moved.
    pub fn draw_text(&mut self, x: f32, baseline: f32, text: &str, overrides: &StyleOverrides) {
        let style = self.style().with_overrides(overrides);
        self.push_item(PageItem::Text {
            x,
            baseline,
            text: text.to_string(),
            style,
        });
    }

    /// Draw a line in the style in effect.
    pub fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let style = self.style();
        self.push_item(PageItem::Line {
            x1,
            y1,
            x2,
            y2,
            style,
        });
    }

    /// Draw the decorative full-width rule at `y`.
    pub fn draw_rule(&mut self, y: f32) {
        let overrides = StyleOverrides::new()
            .stroke_color(self.config.rule_color)
            .stroke_opacity(self.config.rule_opacity)
            .line_width(self.config.rule_width);
        let (left, right) = (
            self.config.margin_left,
            self.config.page_width - self.config.margin_right,
        );
        self.scoped(&overrides, |canvas| canvas.draw_line(left, y, right, y));
    }

    /// Load an image file and return its resource name. Repeated loads of
    /// the same path share one embedded image.
    pub fn load_image(&mut self, path: impl AsRef<Path>) -> Result<String> {
        Ok(self.images.register_from_file(path)?)
    }

    /// Fit a loaded image inside a box, keeping its aspect ratio.
    pub fn fit_image(
        &self,
        resource_id: &str,
        x: f32,
        y: f32,
        max_width: f32,
        max_height: f32,
    ) -> Result<ImagePlacement> {
        check_geometry("image box", max_width, max_height)?;
        let image = self
            .images
            .get(resource_id)
            .ok_or_else(|| Error::Image(format!("unknown image resource {}", resource_id)))?;
        Ok(ImagePlacement::fitted(image, x, y, max_width, max_height))
    }

    /// Draw a loaded image at a placement. `placement.y` is the top edge.
    pub fn draw_image(&mut self, resource_id: &str, placement: &ImagePlacement) -> Result<()> {
        check_geometry("image", placement.width, placement.height)?;
        self.push_item(PageItem::Image {
            resource_id: resource_id.to_string(),
            x: placement.x,
            y: placement.y,
            width: placement.width,
            height: placement.height,
        });
        Ok(())
    }

    // --- output -----------------------------------------------------------

    /// Close the last page and serialize the document.
    pub fn finish(mut self) -> Result<PdfOutput> {
        self.close_page();

        let mut emitter = Emitter {
            scale: self.config.scale,
            page_height: self.config.page_height,
            measurer: self.measurer,
            fonts: FontManager::new(),
            states: ExtGStateRegistry::new(),
        };

        let mut writer = PdfWriter::with_config(self.document.clone());
        for page in &self.pages {
            let mut content = ContentStreamBuilder::new();
            for item in &page.items {
                emitter.emit(&mut content, item);
            }
            writer.add_page(
                self.config.page_width * self.config.scale,
                self.config.page_height * self.config.scale,
                content,
            );
        }

        for font in emitter.fonts.used_fonts() {
            writer.add_font(*font);
        }
        for (name, dict) in emitter.states.states() {
            writer.add_ext_gstate(name, dict);
        }
        for (resource_id, image) in self.images.images_with_ids() {
            writer.add_image(resource_id, image.clone());
        }

        let page_count = self.pages.len();
        let bytes = writer.finish()?;
        log::info!("Rendered report: {} pages, {} bytes", page_count, bytes.len());
        Ok(PdfOutput::new(bytes, page_count))
    }
}

/// Scope guard returned by [`Canvas::push_style`].
///
/// Dereferences to the canvas, so drawing continues through the guard.
pub struct StyleGuard<'a> {
    canvas: &'a mut Canvas,
    depth: usize,
}

impl Deref for StyleGuard<'_> {
    type Target = Canvas;

    fn deref(&self) -> &Canvas {
        self.canvas
    }
}

impl DerefMut for StyleGuard<'_> {
    fn deref_mut(&mut self) -> &mut Canvas {
        self.canvas
    }
}

impl Drop for StyleGuard<'_> {
    fn drop(&mut self) {
        self.canvas.styles.truncate(self.depth);
    }
}

fn check_geometry(what: &'static str, width: f32, height: f32) -> Result<()> {
    let valid = width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0;
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidGeometry {
            what,
            width,
            height,
        })
    }
}

fn aligned_x(x: f32, width: f32, text_width: f32, margin: f32, align: Align) -> f32 {
    match align {
        Align::Left => x + margin,
        Align::Center => x + (width - text_width) / 2.0,
        Align::Right => x + width - margin - text_width,
    }
}

/// Converts display-list items into content stream operators.
struct Emitter {
    scale: f32,
    page_height: f32,
    measurer: Measurer,
    fonts: FontManager,
    states: ExtGStateRegistry,
}

impl Emitter {
    fn px(&self, x: f32) -> f32 {
        x * self.scale
    }

    fn py(&self, y: f32) -> f32 {
        (self.page_height - y) * self.scale
    }

    fn emit(&mut self, content: &mut ContentStreamBuilder, item: &PageItem) {
        match item {
            PageItem::Cell(cell) => self.emit_cell(content, cell),
            PageItem::Text {
                x,
                baseline,
                text,
                style,
            } => {
                content.save_state();
                self.apply_opacity(content, style);
                self.show_text(content, *x, *baseline, text, style);
                content.restore_state();
            },
            PageItem::Line {
                x1,
                y1,
                x2,
                y2,
                style,
            } => {
                content.save_state();
                self.apply_opacity(content, style);
                content
                    .stroke_color(style.stroke_color)
                    .set_line_width(style.line_width * self.scale)
                    .move_to(self.px(*x1), self.py(*y1))
                    .line_to(self.px(*x2), self.py(*y2))
                    .stroke();
                content.restore_state();
            },
            PageItem::Image {
                resource_id,
                x,
                y,
                width,
                height,
            } => {
                let placement = ImagePlacement::new(
                    self.px(*x),
                    self.py(*y + *height),
                    width * self.scale,
                    height * self.scale,
                );
                content.draw_image_at(resource_id, &placement);
            },
        }
    }

    fn emit_cell(&mut self, content: &mut ContentStreamBuilder, cell: &CellItem) {
        let style = &cell.style;
        content.save_state();
        self.apply_opacity(content, style);

        if cell.fill || cell.border {
            content
                .set_line_width(style.line_width * self.scale)
                .stroke_color(style.stroke_color)
                .fill_color(style.fill_color)
                .rect(
                    self.px(cell.x),
                    self.py(cell.y + cell.height),
                    cell.width * self.scale,
                    cell.height * self.scale,
                );
            match (cell.fill, cell.border) {
                (true, true) => content.fill_stroke(),
                (true, false) => content.fill(),
                _ => content.stroke(),
            };
        }

        if !cell.text.is_empty() {
            let font = FontSpec::new(style.font(), style.font_size);
            let text_width = self.measurer.text_width(&cell.text, font);
            let x = aligned_x(
                cell.x,
                cell.width,
                text_width,
                self.measurer.cell_margin(),
                cell.align,
            );
            let baseline =
                cell.y + cell.height / 2.0 + BASELINE_SHIFT * self.measurer.font_size(font);
            self.show_text(content, x, baseline, &cell.text, style);
        }

        content.restore_state();
    }

    fn apply_opacity(&mut self, content: &mut ContentStreamBuilder, style: &Style) {
        let key = OpacityKey::new(style.fill_opacity, style.stroke_opacity);
        if !key.is_opaque() {
            let name = self.states.name_for(key);
            content.set_ext_gstate(&name);
        }
    }

    fn show_text(
        &mut self,
        content: &mut ContentStreamBuilder,
        x: f32,
        baseline: f32,
        text: &str,
        style: &Style,
    ) {
        let font = style.font();
        let name = self.fonts.use_font(font);
        let (bytes, missing) = encode_win_ansi(text);
        if !missing.is_empty() {
            log::warn!("No WinAnsi code for {:?} in {:?}, substituted '?'", missing, text);
        }

        content
            .fill_color(style.text_color)
            .set_font(&name, style.font_size)
            .text(&bytes, self.px(x), self.py(baseline))
            .end_text();

        if style.font_style.underline {
            let spec = FontSpec::new(font, style.font_size);
            let size = self.measurer.font_size(spec);
            let width = self.measurer.text_width(text, spec);
            let y = baseline + 0.1 * size;
            content
                .stroke_color(style.text_color)
                .set_line_width(0.05 * size * self.scale)
                .move_to(self.px(x), self.py(y))
                .line_to(self.px(x + width), self.py(y))
                .stroke();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> Canvas {
        Canvas::new(LayoutConfig::default()).unwrap()
    }

    fn uncompressed(canvas: Canvas) -> String {
        let canvas = canvas.with_document_info(PdfWriterConfig::default().with_compress(false));
        let output = canvas.finish().unwrap();
        String::from_utf8_lossy(output.as_bytes()).into_owned()
    }

    #[test]
    fn test_new_canvas_starts_at_content_top() {
        let c = canvas();
        assert_eq!(c.page_count(), 1);
        assert_eq!(c.x(), 10.0);
        assert_eq!(c.y(), 15.0);
        assert!(c.at_page_top());
    }

    #[test]
    fn test_header_rule_on_every_page() {
        let mut c = canvas();
        c.begin_page();
        for page in c.pages() {
            let rule = page.items().iter().find_map(|item| match item {
                PageItem::Line { y1, y2, style, .. } => Some((*y1, *y2, style.stroke_opacity)),
                _ => None,
            });
            assert_eq!(rule, Some((22.0, 22.0, 0.5)));
        }
    }

    #[test]
    fn test_footer_added_when_page_closes() {
        let mut c = canvas();
        assert_eq!(c.pages()[0].cells().count(), 0);
        c.begin_page();
        let footer = c.pages()[0].cells().next().unwrap();
        assert_eq!(footer.role, CellRole::Footer);
        assert_eq!(footer.text, "Page 1");
        assert_eq!(footer.align, Align::Right);
        assert_eq!(footer.y, 282.0);
        assert_eq!(footer.style.font(), crate::writer::Base14Font::HelveticaOblique);
    }

    #[test]
    fn test_will_overflow_boundary() {
        let mut c = canvas();
        c.set_xy(10.0, 270.0);
        assert!(!c.will_overflow(7.0));
        assert!(c.will_overflow(7.5));
        assert!((c.remaining_height() - 7.0).abs() < 1e-4);
    }

    #[test]
    fn test_draw_cell_advances_x() {
        let mut c = canvas();
        c.draw_cell(38.0, 5.0, "NORTH", &CellOptions::new()).unwrap();
        assert_eq!(c.x(), 48.0);
        assert_eq!(c.y(), 15.0);
        c.advance_line(5.0);
        assert_eq!((c.x(), c.y()), (10.0, 20.0));
    }

    #[test]
    fn test_invalid_geometry() {
        let mut c = canvas();
        assert!(matches!(
            c.draw_cell(0.0, 5.0, "x", &CellOptions::new()),
            Err(Error::InvalidGeometry { what: "cell", .. })
        ));
        assert!(matches!(
            c.draw_cell(10.0, -1.0, "x", &CellOptions::new()),
            Err(Error::InvalidGeometry { .. })
        ));
        assert!(matches!(
            c.draw_multi_cell(10.0, f32::NAN, "x", 5.0, &CellOptions::new()),
            Err(Error::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn test_cell_breaks_page_before_crossing_margin() {
        let mut c = canvas();
        c.set_xy(10.0, 275.0);
        c.draw_cell(20.0, 5.0, "late", &CellOptions::new()).unwrap();
        assert_eq!(c.page_count(), 2);
        let cell = c.pages()[1].cells().next().unwrap();
        assert_eq!(cell.y, 15.0);
    }

    #[test]
    fn test_cell_taller_than_page_never_fits() {
        let mut c = canvas();
        c.advance_line(50.0);
        let err = c.draw_cell(20.0, 300.0, "tall", &CellOptions::new()).unwrap_err();
        assert!(matches!(err, Error::OverflowNeverResolves { .. }));
    }

    #[test]
    fn test_advance_line_clamps_to_trigger() {
        let mut c = canvas();
        c.set_xy(10.0, 270.0);
        c.advance_line(20.0);
        assert_eq!(c.y(), 277.0);
        assert!(c.will_overflow(0.5));
    }

    #[test]
    fn test_style_scope_restores() {
        let mut c = canvas();
        let before = c.style();
        {
            let mut guard = c.push_style(&StyleOverrides::new().fill_opacity(0.7));
            assert_eq!(guard.style().fill_opacity, 0.7);
            guard.set_style(&StyleOverrides::new().font_size(8.0));
            {
                let inner = guard.push_style(&StyleOverrides::new().stroke_opacity(0.5));
                assert_eq!(inner.style().font_size, 8.0);
            }
            assert_eq!(guard.style().stroke_opacity, 1.0);
        }
        assert_eq!(c.style(), before);
    }

    #[test]
    fn test_scoped_restores_on_error() {
        let mut c = canvas();
        let result = c.scoped(&StyleOverrides::new().font_size(20.0), |c| {
            c.draw_cell(-1.0, 1.0, "bad", &CellOptions::new())
        });
        assert!(result.is_err());
        assert_eq!(c.style().font_size, 10.0);
    }

    #[test]
    fn test_multi_cell_keeps_cursor_on_top_edge() {
        let mut c = canvas();
        let lines = c
            .draw_multi_cell(
                30.0,
                20.0,
                "Potential for more volume next quarter",
                5.0,
                &CellOptions::new().border(true),
            )
            .unwrap();
        assert!(lines > 1);
        assert_eq!((c.x(), c.y()), (40.0, 15.0));
        let boxed = c.pages()[0].cells().next().unwrap();
        assert_eq!(boxed.height, 20.0);
        assert!(boxed.text.is_empty());
        assert_eq!(c.pages()[0].texts().count(), lines);
    }

    #[test]
    fn test_finish_writes_opacity_states() {
        let mut c = canvas();
        let shaded = CellOptions::new().border(true).fill(true).style(
            StyleOverrides::new()
                .fill_color(Color::rgb(199, 191, 170))
                .fill_opacity(0.7)
                .stroke_opacity(0.5),
        );
        c.draw_cell(50.0, 5.644, "CASES", &shaded).unwrap();
        let pdf = uncompressed(c);
        assert!(pdf.contains("/GS1 gs"));
        assert!(pdf.contains("/ca 0.7"));
        assert!(pdf.contains("(CASES) Tj"));
        assert!(pdf.contains("(Page 1) Tj"));
        assert!(pdf.contains("/HelveticaOblique"));
    }

    #[test]
    fn test_finish_is_deterministic() {
        let draw = || {
            let mut c = canvas();
            c.draw_cell(50.0, 5.0, "NORTH", &CellOptions::new().border(true))
                .unwrap();
            c.begin_page();
            c.finish().unwrap().into_bytes()
        };
        assert_eq!(draw(), draw());
    }

    #[test]
    fn test_missing_logo_is_an_error() {
        let config = LayoutConfig::default().with_logo("/nonexistent/logo.png");
        assert!(matches!(Canvas::new(config), Err(Error::Image(_))));
    }
}
