//! Minimal inline markup for panel bodies.
//!
//! Understands `<b>`/`<strong>`, `<i>`/`<em>`, `<u>`, `<br>`, `<p>` and
//! literal newlines, plus the five common character entities. Unknown tags
//! are dropped and their text kept.
//!
//! ```
//! use report_oxide::layout::markup::{parse, Inline};
//! use report_oxide::layout::FontStyle;
//!
//! let inlines = parse("Won <b>Booster</b>");
//! assert_eq!(inlines[1], Inline::Text { text: "Booster".into(), style: FontStyle::BOLD });
//! ```

use super::measure::{FontSpec, Measurer};
use super::style::FontStyle;
use crate::writer::{FontFamily, FontManager, FontWeight};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Opening, closing or self-closing tag
    static ref RE_TAG: Regex = Regex::new(r"<\s*(/?)\s*([A-Za-z][A-Za-z0-9]*)[^>]*>").unwrap();

    /// Runs of horizontal whitespace
    static ref RE_SPACES: Regex = Regex::new(r"[ \t\r]+").unwrap();
}

/// A parsed piece of markup.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    /// Text in a face
    Text {
        /// Text, whitespace collapsed
        text: String,
        /// Face flags
        style: FontStyle,
    },
    /// Forced line break
    LineBreak,
}

#[derive(Default)]
struct Nesting {
    bold: u32,
    italic: u32,
    underline: u32,
}

impl Nesting {
    fn style(&self) -> FontStyle {
        FontStyle {
            bold: self.bold > 0,
            italic: self.italic > 0,
            underline: self.underline > 0,
        }
    }
}

/// Parse markup into styled text and line breaks.
pub fn parse(markup: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut nesting = Nesting::default();
    let mut last = 0;

    for caps in RE_TAG.captures_iter(markup) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_text(&mut out, &markup[last..whole.start()], nesting.style());
        last = whole.end();

        let closing = !caps[1].is_empty();
        let name = caps[2].to_ascii_lowercase();
        let counter = match name.as_str() {
            "b" | "strong" => Some(&mut nesting.bold),
            "i" | "em" => Some(&mut nesting.italic),
            "u" => Some(&mut nesting.underline),
            _ => None,
        };
        match (counter, name.as_str()) {
            (Some(count), _) if closing => *count = count.saturating_sub(1),
            (Some(count), _) => *count += 1,
            (None, "br") => out.push(Inline::LineBreak),
            (None, "p") if closing => out.push(Inline::LineBreak),
            (None, "p") => {
                if out.last().is_some_and(|i| *i != Inline::LineBreak) {
                    out.push(Inline::LineBreak);
                }
            },
            _ => {},
        }
    }
    push_text(&mut out, &markup[last..], nesting.style());
    out
}

fn push_text(out: &mut Vec<Inline>, raw: &str, style: FontStyle) {
    for (i, piece) in raw.split('\n').enumerate() {
        if i > 0 {
            out.push(Inline::LineBreak);
        }
        let text = RE_SPACES.replace_all(&decode_entities(piece), " ").into_owned();
        if !text.is_empty() {
            out.push(Inline::Text { text, style });
        }
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// A styled piece of a laid-out line.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    /// Offset from the line's left edge
    pub x: f32,
    /// Text
    pub text: String,
    /// Face flags, combined with the base style
    pub style: FontStyle,
}

/// One laid-out line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowLine {
    /// Runs left to right
    pub runs: Vec<Run>,
}

impl FlowLine {
    /// Plain text of the line.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Word-wrap parsed markup to `max_width`.
pub struct FlowLayout<'a> {
    measurer: &'a Measurer,
    family: FontFamily,
    base: FontStyle,
    size: f32,
    max_width: f32,
}

impl<'a> FlowLayout<'a> {
    /// Create a layout for a base font.
    pub fn new(
        measurer: &'a Measurer,
        family: FontFamily,
        base: FontStyle,
        size: f32,
        max_width: f32,
    ) -> Self {
        Self {
            measurer,
            family,
            base,
            size,
            max_width,
        }
    }

    fn combined(&self, style: FontStyle) -> FontStyle {
        FontStyle {
            bold: self.base.bold || style.bold,
            italic: self.base.italic || style.italic,
            underline: self.base.underline || style.underline,
        }
    }

    fn font(&self, style: FontStyle) -> FontSpec {
        let weight = if style.bold {
            FontWeight::Bold
        } else {
            FontWeight::Normal
        };
        FontSpec::new(
            FontManager::select_font(self.family, weight, style.italic),
            self.size,
        )
    }

    /// Lay out inlines into lines. Trailing empty lines are dropped.
    pub fn layout(&self, inlines: &[Inline]) -> Vec<FlowLine> {
        let mut builder = LineBuilder::default();

        for inline in inlines {
            match inline {
                Inline::LineBreak => builder.break_line(),
                Inline::Text { text, style } => {
                    let style = self.combined(*style);
                    let font = self.font(style);
                    let space = self.measurer.text_width(" ", font);

                    if text.starts_with(' ') {
                        builder.pending_space = true;
                    }
                    let mut words = text.split(' ').filter(|w| !w.is_empty()).peekable();
                    while let Some(word) = words.next() {
                        self.place_word(&mut builder, word, style, font, space);
                        if words.peek().is_some() {
                            builder.pending_space = true;
                        }
                    }
                    if text.ends_with(' ') {
                        builder.pending_space = true;
                    }
                },
            }
        }

        builder.lines.push(builder.current);
        while builder.lines.len() > 1 && builder.lines.last().is_some_and(|l| l.runs.is_empty()) {
            builder.lines.pop();
        }
        builder.lines
    }

    fn place_word(
        &self,
        builder: &mut LineBuilder,
        word: &str,
        style: FontStyle,
        font: FontSpec,
        space: f32,
    ) {
        let width = self.measurer.text_width(word, font);
        let gap = if builder.pending_space && !builder.current.runs.is_empty() {
            space
        } else {
            0.0
        };
        builder.pending_space = false;

        if builder.x + gap + width <= self.max_width {
            if gap > 0.0 {
                builder.append(" ", style, builder.x, space);
            }
            builder.append(word, style, builder.x, width);
            return;
        }

        if !builder.current.runs.is_empty() {
            builder.break_line();
        }
        if width <= self.max_width {
            builder.append(word, style, 0.0, width);
            return;
        }

        // Wider than a whole line: split between characters
        let mut piece = String::new();
        let mut piece_width = 0.0;
        for ch in word.chars() {
            let ch_width = self.measurer.text_width(ch.encode_utf8(&mut [0; 4]), font);
            if !piece.is_empty() && piece_width + ch_width > self.max_width {
                builder.append(&piece, style, 0.0, piece_width);
                builder.break_line();
                piece.clear();
                piece_width = 0.0;
            }
            piece.push(ch);
            piece_width += ch_width;
        }
        builder.append(&piece, style, builder.x, piece_width);
    }
}

#[derive(Default)]
struct LineBuilder {
    lines: Vec<FlowLine>,
    current: FlowLine,
    x: f32,
    pending_space: bool,
}

impl LineBuilder {
    fn append(&mut self, text: &str, style: FontStyle, x: f32, width: f32) {
        match self.current.runs.last_mut() {
            Some(run) if run.style == style => run.text.push_str(text),
            _ => self.current.runs.push(Run {
                x,
                text: text.to_string(),
                style,
            }),
        }
        self.x = x + width;
    }

    fn break_line(&mut self) {
        self.lines.push(std::mem::take(&mut self.current));
        self.x = 0.0;
        self.pending_space = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;

    fn text(s: &str, style: FontStyle) -> Inline {
        Inline::Text {
            text: s.to_string(),
            style,
        }
    }

    #[test]
    fn test_parse_nested_styles() {
        let inlines = parse("a <b>bold <i>both</i></b> plain");
        assert_eq!(
            inlines,
            vec![
                text("a ", FontStyle::REGULAR),
                text("bold ", FontStyle::BOLD),
                text("both", FontStyle::BOLD_ITALIC),
                text(" plain", FontStyle::REGULAR),
            ]
        );
    }

    #[test]
    fn test_parse_breaks() {
        let inlines = parse("<p>one</p><p>two<br/>three</p>\nfour");
        let breaks = inlines.iter().filter(|i| **i == Inline::LineBreak).count();
        assert_eq!(breaks, 4);
        assert_eq!(inlines[0], text("one", FontStyle::REGULAR));
    }

    #[test]
    fn test_parse_entities_and_unknown_tags() {
        let inlines = parse("<span>R&amp;D &lt;NZ&gt;</span>");
        assert_eq!(inlines, vec![text("R&D <NZ>", FontStyle::REGULAR)]);
    }

    #[test]
    fn test_unbalanced_close_is_ignored() {
        let inlines = parse("</b>x");
        assert_eq!(inlines, vec![text("x", FontStyle::REGULAR)]);
    }

    #[test]
    fn test_layout_wraps_within_width() {
        let measurer = Measurer::from_config(&LayoutConfig::default());
        let flow = FlowLayout::new(&measurer, FontFamily::Times, FontStyle::ITALIC, 10.0, 40.0);
        let lines = flow.layout(&parse(
            "* 105k SB24 bulk sold to Booster\n* 1 container to <b>Pacific Wine</b> partners",
        ));
        assert!(lines.len() >= 3);
        assert!(lines[0].text().starts_with("* 105k"));
        for line in &lines {
            let last = line.runs.last().unwrap();
            let font = flow.font(last.style);
            assert!(last.x + measurer.text_width(&last.text, font) <= 40.0 + 1e-3);
        }
        let bold = lines
            .iter()
            .flat_map(|l| l.runs.iter())
            .find(|r| r.text.contains("Pacific"))
            .unwrap();
        assert_eq!(bold.style, FontStyle::BOLD_ITALIC);
    }

    #[test]
    fn test_layout_keeps_space_between_styles() {
        let measurer = Measurer::from_config(&LayoutConfig::default());
        let flow = FlowLayout::new(&measurer, FontFamily::Helvetica, FontStyle::REGULAR, 10.0, 500.0);
        let lines = flow.layout(&parse("Won <b>Booster</b> again"));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), "Won Booster again");
        assert_eq!(lines[0].runs.len(), 3);
    }

    #[test]
    fn test_layout_drops_trailing_breaks() {
        let measurer = Measurer::from_config(&LayoutConfig::default());
        let flow = FlowLayout::new(&measurer, FontFamily::Helvetica, FontStyle::REGULAR, 10.0, 100.0);
        assert_eq!(flow.layout(&parse("x\n\n")).len(), 1);
        assert_eq!(flow.layout(&[]).len(), 1);
    }
}
