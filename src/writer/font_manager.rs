//! Font management for PDF generation.
//!
//! Reports use a fixed set of PDF Base-14 fonts (Helvetica, Times and
//! Courier, each in four faces). Nothing is embedded; this module supplies
//! the AFM advance widths needed for layout and the WinAnsi encoding used for
//! every text string.

/// Font family classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Deserialize)]
pub enum FontFamily {
    /// Helvetica (sans-serif)
    #[default]
    Helvetica,
    /// Times (serif)
    Times,
    /// Courier (monospace)
    Courier,
}

/// Font weight classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontWeight {
    /// Normal weight
    #[default]
    Normal,
    /// Bold weight
    Bold,
}

/// One face of the fixed Base-14 font set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Base14Font {
    /// Helvetica
    Helvetica,
    /// Helvetica-Bold
    HelveticaBold,
    /// Helvetica-Oblique
    HelveticaOblique,
    /// Helvetica-BoldOblique
    HelveticaBoldOblique,
    /// Times-Roman
    TimesRoman,
    /// Times-Bold
    TimesBold,
    /// Times-Italic
    TimesItalic,
    /// Times-BoldItalic
    TimesBoldItalic,
    /// Courier
    Courier,
    /// Courier-Bold
    CourierBold,
    /// Courier-Oblique
    CourierOblique,
    /// Courier-BoldOblique
    CourierBoldOblique,
}

impl Base14Font {
    /// PostScript name used as `/BaseFont`.
    pub fn base_name(&self) -> &'static str {
        match self {
            Base14Font::Helvetica => "Helvetica",
            Base14Font::HelveticaBold => "Helvetica-Bold",
            Base14Font::HelveticaOblique => "Helvetica-Oblique",
            Base14Font::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Base14Font::TimesRoman => "Times-Roman",
            Base14Font::TimesBold => "Times-Bold",
            Base14Font::TimesItalic => "Times-Italic",
            Base14Font::TimesBoldItalic => "Times-BoldItalic",
            Base14Font::Courier => "Courier",
            Base14Font::CourierBold => "Courier-Bold",
            Base14Font::CourierOblique => "Courier-Oblique",
            Base14Font::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    /// Name of the font in a page's `/Font` resource dictionary.
    pub fn resource_name(&self) -> String {
        self.base_name().replace('-', "")
    }

    /// Width of one character in 1/1000 em.
    ///
    /// Characters outside printable ASCII use a per-family average.
    pub fn char_width(&self, ch: char) -> f32 {
        let table = match self {
            Base14Font::Helvetica | Base14Font::HelveticaOblique => &HELVETICA,
            Base14Font::HelveticaBold | Base14Font::HelveticaBoldOblique => &HELVETICA_BOLD,
            Base14Font::TimesRoman => &TIMES_ROMAN,
            Base14Font::TimesBold => &TIMES_BOLD,
            Base14Font::TimesItalic => &TIMES_ITALIC,
            Base14Font::TimesBoldItalic => &TIMES_BOLD_ITALIC,
            _ => return 600.0,
        };
        match ch {
            ' '..='~' => table[ch as usize - 32] as f32,
            '\u{2018}' | '\u{2019}' => table[b'\'' as usize - 32] as f32,
            '\u{201C}' | '\u{201D}' => table[b'"' as usize - 32] as f32,
            '\u{2013}' => table[b'0' as usize - 32] as f32,
            '\u{2014}' => 1000.0,
            _ => table[b'n' as usize - 32] as f32,
        }
    }

    /// Width of a string at the given size, in the same unit as `font_size`.
    pub fn text_width(&self, text: &str, font_size: f32) -> f32 {
        let units: f32 = text.chars().map(|c| self.char_width(c)).sum();
        units * font_size / 1000.0
    }
}

/// Font manager for PDF generation.
///
/// Resolves family/weight/style to a concrete face and records which faces a
/// document used, so only those are written into the resource dictionary.
#[derive(Debug, Clone, Default)]
pub struct FontManager {
    used: Vec<Base14Font>,
}

impl FontManager {
    /// Create an empty font manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the face for the given criteria.
    pub fn select_font(family: FontFamily, weight: FontWeight, italic: bool) -> Base14Font {
        match (family, weight, italic) {
            (FontFamily::Helvetica, FontWeight::Normal, false) => Base14Font::Helvetica,
            (FontFamily::Helvetica, FontWeight::Bold, false) => Base14Font::HelveticaBold,
            (FontFamily::Helvetica, FontWeight::Normal, true) => Base14Font::HelveticaOblique,
            (FontFamily::Helvetica, FontWeight::Bold, true) => Base14Font::HelveticaBoldOblique,
            (FontFamily::Times, FontWeight::Normal, false) => Base14Font::TimesRoman,
            (FontFamily::Times, FontWeight::Bold, false) => Base14Font::TimesBold,
            (FontFamily::Times, FontWeight::Normal, true) => Base14Font::TimesItalic,
            (FontFamily::Times, FontWeight::Bold, true) => Base14Font::TimesBoldItalic,
            (FontFamily::Courier, FontWeight::Normal, false) => Base14Font::Courier,
            (FontFamily::Courier, FontWeight::Bold, false) => Base14Font::CourierBold,
            (FontFamily::Courier, FontWeight::Normal, true) => Base14Font::CourierOblique,
            (FontFamily::Courier, FontWeight::Bold, true) => Base14Font::CourierBoldOblique,
        }
    }

    /// Mark a face as used and return its resource name.
    pub fn use_font(&mut self, font: Base14Font) -> String {
        if !self.used.contains(&font) {
            self.used.push(font);
        }
        font.resource_name()
    }

    /// Faces used so far, in first-use order.
    pub fn used_fonts(&self) -> &[Base14Font] {
        &self.used
    }
}

/// Encode text as WinAnsi (PDF `/WinAnsiEncoding`) bytes.
///
/// Returns the bytes and the characters that had no WinAnsi code point; those
/// are written as `?`.
pub fn encode_win_ansi(text: &str) -> (Vec<u8>, Vec<char>) {
    let mut bytes = Vec::with_capacity(text.len());
    let mut missing = Vec::new();
    for ch in text.chars() {
        match win_ansi_byte(ch) {
            Some(b) => bytes.push(b),
            None => {
                missing.push(ch);
                bytes.push(b'?');
            },
        }
    }
    (bytes, missing)
}

fn win_ansi_byte(ch: char) -> Option<u8> {
    let code = ch as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        0x09 => Some(b' '),
        _ => match ch {
            '\u{20AC}' => Some(0x80),
            '\u{201A}' => Some(0x82),
            '\u{0192}' => Some(0x83),
            '\u{201E}' => Some(0x84),
            '\u{2026}' => Some(0x85),
            '\u{2020}' => Some(0x86),
            '\u{2021}' => Some(0x87),
            '\u{02C6}' => Some(0x88),
            '\u{2030}' => Some(0x89),
            '\u{0160}' => Some(0x8A),
            '\u{2039}' => Some(0x8B),
            '\u{0152}' => Some(0x8C),
            '\u{017D}' => Some(0x8E),
            '\u{2018}' => Some(0x91),
            '\u{2019}' => Some(0x92),
            '\u{201C}' => Some(0x93),
            '\u{201D}' => Some(0x94),
            '\u{2022}' => Some(0x95),
            '\u{2013}' => Some(0x96),
            '\u{2014}' => Some(0x97),
            '\u{02DC}' => Some(0x98),
            '\u{2122}' => Some(0x99),
            '\u{0161}' => Some(0x9A),
            '\u{203A}' => Some(0x9B),
            '\u{0153}' => Some(0x9C),
            '\u{017E}' => Some(0x9E),
            '\u{0178}' => Some(0x9F),
            _ => None,
        },
    }
}

// AFM advance widths for printable ASCII (0x20..=0x7E), 1/1000 em.

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    278, 278, 564, 564, 564, 444, 921,
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889,
    722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611,
    333, 278, 333, 469, 500, 333,
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778,
    500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444,
    480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    333, 333, 570, 570, 570, 500, 930,
    722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944,
    722, 778, 611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667,
    333, 278, 333, 581, 500, 333,
    500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833,
    556, 500, 556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444,
    394, 220, 394, 520,
];

#[rustfmt::skip]
const TIMES_ITALIC: [u16; 95] = [
    250, 333, 420, 500, 500, 833, 778, 214, 333, 333, 500, 675, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    333, 333, 675, 675, 675, 500, 920,
    611, 611, 667, 722, 611, 611, 722, 722, 333, 444, 667, 556, 833,
    667, 722, 611, 722, 611, 500, 556, 722, 611, 833, 611, 556, 556,
    389, 278, 389, 422, 500, 333,
    500, 500, 444, 500, 444, 278, 500, 500, 278, 278, 444, 278, 722,
    500, 500, 500, 500, 389, 389, 278, 500, 444, 667, 444, 444, 389,
    400, 275, 400, 541,
];

#[rustfmt::skip]
const TIMES_BOLD_ITALIC: [u16; 95] = [
    250, 389, 555, 500, 500, 833, 778, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    333, 333, 570, 570, 570, 500, 832,
    667, 667, 667, 722, 667, 667, 722, 778, 389, 500, 667, 611, 889,
    722, 722, 611, 722, 667, 556, 611, 722, 667, 889, 667, 611, 611,
    333, 278, 333, 570, 500, 333,
    500, 500, 444, 500, 444, 333, 500, 556, 278, 278, 500, 278, 778,
    556, 500, 500, 500, 389, 389, 278, 556, 444, 667, 500, 444, 389,
    348, 220, 348, 570,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width_calculation() {
        // "Hello" in Helvetica: 722 + 556 + 222 + 222 + 556 = 2278 units
        let width = Base14Font::Helvetica.text_width("Hello", 10.0);
        assert!((width - 22.78).abs() < 0.001);
    }

    #[test]
    fn test_monospace_consistency() {
        let w1 = Base14Font::Courier.char_width('i');
        let w2 = Base14Font::CourierBold.char_width('W');
        assert_eq!(w1, w2);
    }

    #[test]
    fn test_proportional_variance() {
        let font = Base14Font::Helvetica;
        assert!(font.char_width('i') < font.char_width('W'));
        assert!(Base14Font::HelveticaBold.text_width("Region", 8.0)
            > Base14Font::Helvetica.text_width("Region", 8.0));
    }

    #[test]
    fn test_font_selection() {
        assert_eq!(
            FontManager::select_font(FontFamily::Helvetica, FontWeight::Bold, true),
            Base14Font::HelveticaBoldOblique
        );
        assert_eq!(
            FontManager::select_font(FontFamily::Times, FontWeight::Normal, true),
            Base14Font::TimesItalic
        );
        assert_eq!(Base14Font::TimesItalic.base_name(), "Times-Italic");
        assert_eq!(Base14Font::HelveticaBoldOblique.resource_name(), "HelveticaBoldOblique");
    }

    #[test]
    fn test_used_fonts_recorded_once() {
        let mut manager = FontManager::new();
        manager.use_font(Base14Font::Helvetica);
        manager.use_font(Base14Font::TimesItalic);
        manager.use_font(Base14Font::Helvetica);
        assert_eq!(manager.used_fonts(), &[Base14Font::Helvetica, Base14Font::TimesItalic]);
    }

    #[test]
    fn test_win_ansi_encoding() {
        let (bytes, missing) = encode_win_ansi("Caf\u{e9} \u{2019}24 \u{2013} \u{20AC}5");
        assert_eq!(bytes, b"Caf\xE9 \x9224 \x96 \x805".to_vec());
        assert!(missing.is_empty());

        let (bytes, missing) = encode_win_ansi("\u{4E2D}x");
        assert_eq!(bytes, b"?x".to_vec());
        assert_eq!(missing, vec!['\u{4E2D}']);
    }

    #[test]
    fn test_empty_text_has_zero_width() {
        assert_eq!(Base14Font::TimesRoman.text_width("", 12.0), 0.0);
    }
}
