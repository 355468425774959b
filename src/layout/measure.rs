//! Text measurement: widths, the wrapped-height estimate, and word wrapping.
//!
//! Everything here is pure. Nothing touches a canvas, so row heights can be
//! computed (and tested) before a single cell is drawn.

use crate::config::LayoutConfig;
use crate::writer::Base14Font;

/// A concrete face at a size in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    /// Face
    pub font: Base14Font,
    /// Size in points
    pub size: f32,
}

impl FontSpec {
    /// Create a font spec.
    pub fn new(font: Base14Font, size: f32) -> Self {
        Self { font, size }
    }
}

/// Measurement helper bound to one unit system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurer {
    scale: f32,
    estimate_factor: f32,
    cell_margin: f32,
}

impl Measurer {
    /// Create a measurer.
    ///
    /// `scale` is points per user unit; `estimate_factor` is the line-height
    /// multiple of the wrapped-height estimate.
    pub fn new(scale: f32, estimate_factor: f32, cell_margin: f32) -> Self {
        Self {
            scale,
            estimate_factor,
            cell_margin,
        }
    }

    /// Measurer for a layout configuration.
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(config.scale, config.estimate_factor, config.cell_margin)
    }

    /// Horizontal padding applied inside cells.
    pub fn cell_margin(&self) -> f32 {
        self.cell_margin
    }

    /// Font size in user units.
    pub fn font_size(&self, font: FontSpec) -> f32 {
        font.size / self.scale
    }

    /// Width of a single line of text in user units.
    pub fn text_width(&self, text: &str, font: FontSpec) -> f32 {
        font.font.text_width(text, self.font_size(font))
    }

    /// Distance between wrapped lines.
    pub fn line_pitch(&self, font: FontSpec) -> f32 {
        self.font_size(font) * self.estimate_factor
    }

    /// Cheap linear estimate of the height `text` needs when wrapped to
    /// `column_width`: the single-line width divided by the column width,
    /// times one line pitch.
    ///
    /// Monotonic: a wider column never increases the result and longer text
    /// never decreases it. A non-positive width yields infinity.
    pub fn estimate_wrapped_height(&self, column_width: f32, text: &str, font: FontSpec) -> f32 {
        if column_width <= 0.0 {
            return f32::INFINITY;
        }
        self.text_width(text, font) / column_width * self.line_pitch(font)
    }

    /// Height a free-text cell needs: the linear estimate, raised to the
    /// height of the actual word-wrapped lines when wrapping wastes space.
    pub fn wrapped_height(&self, column_width: f32, text: &str, font: FontSpec) -> f32 {
        self.wrapped_height_at(column_width, text, font, self.line_pitch(font))
    }

    /// [`Measurer::wrapped_height`] with lines spaced `pitch` apart.
    pub fn wrapped_height_at(
        &self,
        column_width: f32,
        text: &str,
        font: FontSpec,
        pitch: f32,
    ) -> f32 {
        if column_width <= 0.0 {
            return f32::INFINITY;
        }
        let estimate = self.text_width(text, font) / column_width * pitch;
        let inner = column_width - 2.0 * self.cell_margin;
        let lines = self.wrap_lines(text, font, inner).len() as f32;
        estimate.max(lines * pitch)
    }

    /// Greedy word wrap.
    ///
    /// Explicit newlines always break. A word wider than `max_width` is split
    /// between characters. Empty input yields one empty line.
    pub fn wrap_lines(&self, text: &str, font: FontSpec, max_width: f32) -> Vec<String> {
        let size = self.font_size(font);
        let space = font.font.text_width(" ", size);
        let mut lines = Vec::new();

        for paragraph in text.split('\n') {
            let mut current = String::new();
            let mut current_width = 0.0;

            for word in paragraph.split_whitespace() {
                let word_width = font.font.text_width(word, size);

                if current.is_empty() {
                    if word_width <= max_width {
                        current = word.to_string();
                        current_width = word_width;
                    } else {
                        let (mut pieces, last) = split_word(word, font.font, size, max_width);
                        lines.append(&mut pieces);
                        current_width = font.font.text_width(&last, size);
                        current = last;
                    }
                } else if current_width + space + word_width <= max_width {
                    current.push(' ');
                    current.push_str(word);
                    current_width += space + word_width;
                } else {
                    lines.push(std::mem::take(&mut current));
                    if word_width <= max_width {
                        current = word.to_string();
                        current_width = word_width;
                    } else {
                        let (mut pieces, last) = split_word(word, font.font, size, max_width);
                        lines.append(&mut pieces);
                        current_width = font.font.text_width(&last, size);
                        current = last;
                    }
                }
            }
            lines.push(current);
        }

        lines
    }
}

/// Split an over-long word into full-width pieces plus a remainder.
fn split_word(word: &str, font: Base14Font, size: f32, max_width: f32) -> (Vec<String>, String) {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut width = 0.0;
    for ch in word.chars() {
        let w = font.char_width(ch) * size / 1000.0;
        if !current.is_empty() && width + w > max_width {
            pieces.push(std::mem::take(&mut current));
            width = 0.0;
        }
        current.push(ch);
        width += w;
    }
    (pieces, current)
}
