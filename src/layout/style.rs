//! Drawing style: colours, fonts, opacity, and scoped overrides.

use crate::writer::{Base14Font, FontFamily, FontManager, FontWeight};

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(from = "[u8; 3]")]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// Create a colour from 8-bit channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a grey level.
    pub const fn gray(level: u8) -> Self {
        Self::rgb(level, level, level)
    }

    /// Black.
    pub const fn black() -> Self {
        Self::gray(0)
    }

    /// White.
    pub const fn white() -> Self {
        Self::gray(255)
    }

    /// Channels scaled to 0.0..=1.0 for PDF colour operators.
    pub fn to_unit_rgb(&self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::rgb(r, g, b)
    }
}

/// Horizontal text alignment inside a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// Flush left
    #[default]
    Left,
    /// Centred
    Center,
    /// Flush right
    Right,
}

/// Font face flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontStyle {
    /// Bold weight
    pub bold: bool,
    /// Italic or oblique
    pub italic: bool,
    /// Underlined
    pub underline: bool,
}

impl FontStyle {
    /// Regular face.
    pub const REGULAR: FontStyle = FontStyle {
        bold: false,
        italic: false,
        underline: false,
    };
    /// Bold face.
    pub const BOLD: FontStyle = FontStyle {
        bold: true,
        italic: false,
        underline: false,
    };
    /// Italic face.
    pub const ITALIC: FontStyle = FontStyle {
        bold: false,
        italic: true,
        underline: false,
    };
    /// Bold italic face.
    pub const BOLD_ITALIC: FontStyle = FontStyle {
        bold: true,
        italic: true,
        underline: false,
    };
    /// Underlined regular face.
    pub const UNDERLINE: FontStyle = FontStyle {
        bold: false,
        italic: false,
        underline: true,
    };
}

/// Fully resolved drawing state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    /// Border and rule colour
    pub stroke_color: Color,
    /// Cell background colour
    pub fill_color: Color,
    /// Text colour
    pub text_color: Color,
    /// Fill and text opacity
    pub fill_opacity: f32,
    /// Stroke opacity
    pub stroke_opacity: f32,
    /// Stroke line width
    pub line_width: f32,
    /// Font family
    pub font_family: FontFamily,
    /// Font face flags
    pub font_style: FontStyle,
    /// Font size in points
    pub font_size: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke_color: Color::black(),
            fill_color: Color::white(),
            text_color: Color::black(),
            fill_opacity: 1.0,
            stroke_opacity: 1.0,
            line_width: 0.2,
            font_family: FontFamily::Helvetica,
            font_style: FontStyle::REGULAR,
            font_size: 10.0,
        }
    }
}

impl Style {
    /// Apply overrides on top of this style.
    pub fn with_overrides(&self, overrides: &StyleOverrides) -> Style {
        Style {
            stroke_color: overrides.stroke_color.unwrap_or(self.stroke_color),
            fill_color: overrides.fill_color.unwrap_or(self.fill_color),
            text_color: overrides.text_color.unwrap_or(self.text_color),
            fill_opacity: overrides.fill_opacity.unwrap_or(self.fill_opacity),
            stroke_opacity: overrides.stroke_opacity.unwrap_or(self.stroke_opacity),
            line_width: overrides.line_width.unwrap_or(self.line_width),
            font_family: overrides.font_family.unwrap_or(self.font_family),
            font_style: overrides.font_style.unwrap_or(self.font_style),
            font_size: overrides.font_size.unwrap_or(self.font_size),
        }
    }

    /// The concrete Base-14 face for this style.
    pub fn font(&self) -> Base14Font {
        let weight = if self.font_style.bold {
            FontWeight::Bold
        } else {
            FontWeight::Normal
        };
        FontManager::select_font(self.font_family, weight, self.font_style.italic)
    }
}

/// Partial style; `None` fields inherit from the enclosing scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleOverrides {
    /// Border and rule colour
    pub stroke_color: Option<Color>,
    /// Cell background colour
    pub fill_color: Option<Color>,
    /// Text colour
    pub text_color: Option<Color>,
    /// Fill and text opacity
    pub fill_opacity: Option<f32>,
    /// Stroke opacity
    pub stroke_opacity: Option<f32>,
    /// Stroke line width
    pub line_width: Option<f32>,
    /// Font family
    pub font_family: Option<FontFamily>,
    /// Font face flags
    pub font_style: Option<FontStyle>,
    /// Font size in points
    pub font_size: Option<f32>,
}

impl StyleOverrides {
    /// No overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the stroke colour.
    pub fn stroke_color(mut self, color: Color) -> Self {
        self.stroke_color = Some(color);
        self
    }

    /// Override the fill colour.
    pub fn fill_color(mut self, color: Color) -> Self {
        self.fill_color = Some(color);
        self
    }

    /// Override the text colour.
    pub fn text_color(mut self, color: Color) -> Self {
        self.text_color = Some(color);
        self
    }

    /// Override the fill opacity.
    pub fn fill_opacity(mut self, opacity: f32) -> Self {
        self.fill_opacity = Some(opacity);
        self
    }

    /// Override the stroke opacity.
    pub fn stroke_opacity(mut self, opacity: f32) -> Self {
        self.stroke_opacity = Some(opacity);
        self
    }

    /// Override the line width.
    pub fn line_width(mut self, width: f32) -> Self {
        self.line_width = Some(width);
        self
    }

    /// Override family, face and size together.
    pub fn font(mut self, family: FontFamily, style: FontStyle, size: f32) -> Self {
        self.font_family = Some(family);
        self.font_style = Some(style);
        self.font_size = Some(size);
        self
    }

    /// Override the font face flags only.
    pub fn font_style(mut self, style: FontStyle) -> Self {
        self.font_style = Some(style);
        self
    }

    /// Override the font size only.
    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = Some(size);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_rgb() {
        let (r, g, b) = Color::rgb(255, 0, 51).to_unit_rgb();
        assert_eq!((r, g, b), (1.0, 0.0, 0.2));
    }

    #[test]
    fn test_overrides_only_touch_set_fields() {
        let base = Style::default();
        let overrides = StyleOverrides::new()
            .fill_color(Color::rgb(199, 191, 170))
            .fill_opacity(0.7);
        let styled = base.with_overrides(&overrides);
        assert_eq!(styled.fill_color, Color::rgb(199, 191, 170));
        assert_eq!(styled.fill_opacity, 0.7);
        assert_eq!(styled.text_color, base.text_color);
        assert_eq!(styled.font_size, base.font_size);
    }

    #[test]
    fn test_style_font_resolution() {
        let style = Style::default().with_overrides(&StyleOverrides::new().font(
            FontFamily::Helvetica,
            FontStyle::BOLD_ITALIC,
            8.0,
        ));
        assert_eq!(style.font(), Base14Font::HelveticaBoldOblique);

        let underlined = Style::default().with_overrides(
            &StyleOverrides::new().font(FontFamily::Times, FontStyle::UNDERLINE, 14.0),
        );
        assert_eq!(underlined.font(), Base14Font::TimesRoman);
    }

    #[test]
    fn test_color_from_array() {
        let color: Color = serde_json::from_str("[142, 127, 85]").unwrap();
        assert_eq!(color, Color::rgb(142, 127, 85));
    }
}
