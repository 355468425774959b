//! Configuration for report layout.
//!
//! All lengths are in user units (millimetres by default); `scale` converts
//! them to PDF points. Font sizes are in points.

use crate::layout::Color;
use std::path::PathBuf;

/// Page geometry, palette, fonts and thresholds for one render.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Page width.
    pub page_width: f32,
    /// Page height.
    pub page_height: f32,
    /// Left margin.
    pub margin_left: f32,
    /// Top margin.
    pub margin_top: f32,
    /// Right margin.
    pub margin_right: f32,
    /// Bottom margin; content crossing it triggers a page break.
    pub margin_bottom: f32,
    /// PDF points per user unit.
    pub scale: f32,

    /// Optional logo drawn in every page header.
    pub logo: Option<PathBuf>,
    /// Side of the square logo box.
    pub logo_size: f32,
    /// Top edge of the logo box.
    pub logo_y: f32,
    /// Vertical position of the header rule.
    pub header_rule_y: f32,
    /// Advance below the top margin before body content starts.
    pub header_gap: f32,
    /// Extra advance before a continuation header on a new page.
    pub continuation_gap: f32,

    /// Decorative rule colour.
    pub rule_color: Color,
    /// Decorative rule stroke opacity.
    pub rule_opacity: f32,
    /// Decorative rule line width.
    pub rule_width: f32,
    /// Vertical group rule line width.
    pub vertical_rule_width: f32,
    /// Vertical group rule stroke opacity.
    pub vertical_rule_opacity: f32,
    /// Column indices whose right edges carry vertical group rules.
    pub vertical_rule_columns: Vec<usize>,

    /// Default text colour.
    pub text_color: Color,
    /// Text colour for cells containing the negative marker.
    pub alert_color: Color,
    /// Shading of emphasized and total rows.
    pub emphasized_fill: Color,
    /// Fill opacity of emphasized rows.
    pub emphasized_fill_opacity: f32,
    /// Fill opacity of total rows.
    pub total_fill_opacity: f32,
    /// Stroke opacity of table cell borders.
    pub border_opacity: f32,
    /// Line width of cell borders.
    pub border_width: f32,
    /// Horizontal padding inside cells.
    pub cell_margin: f32,
    /// Character marking a negative value.
    pub negative_marker: char,

    /// Indicator fill for "Green".
    pub status_success: Color,
    /// Indicator fill for "Orange".
    pub status_warning: Color,
    /// Indicator fill for any other status value.
    pub status_alert: Color,

    /// Table body font size.
    pub table_font_size: f32,
    /// Row height as a multiple of the table font size.
    pub row_height_factor: f32,
    /// Line-height factor of the wrapped-height estimate.
    pub estimate_factor: f32,

    /// Remaining height below which a panel starts on a new page.
    pub panel_threshold: f32,
    /// Remaining height below which a status row starts on a new page.
    pub status_threshold: f32,
    /// Advance after a page break triggered by a panel or status row.
    pub block_break_gap: f32,
    /// Remaining height below which a chart starts on a new page.
    pub min_chart_height: f32,

    /// Distance of the footer line from the bottom edge.
    pub footer_offset: f32,
    /// Footer font size.
    pub footer_font_size: f32,
    /// Footer grey level.
    pub footer_gray: u8,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin_left: 10.0,
            margin_top: 10.0,
            margin_right: 10.0,
            margin_bottom: 20.0,
            scale: 72.0 / 25.4,

            logo: None,
            logo_size: 15.0,
            logo_y: 5.0,
            header_rule_y: 22.0,
            header_gap: 5.0,
            continuation_gap: 10.0,

            rule_color: Color::rgb(142, 127, 85),
            rule_opacity: 0.5,
            rule_width: 0.5,
            vertical_rule_width: 0.7,
            vertical_rule_opacity: 1.0,
            vertical_rule_columns: vec![0, 4, 7],

            text_color: Color::black(),
            alert_color: Color::rgb(185, 28, 28),
            emphasized_fill: Color::rgb(199, 191, 170),
            emphasized_fill_opacity: 0.7,
            total_fill_opacity: 1.0,
            border_opacity: 0.5,
            border_width: 0.2,
            cell_margin: 1.0,
            negative_marker: '-',

            status_success: Color::rgb(74, 222, 128),
            status_warning: Color::rgb(251, 146, 60),
            status_alert: Color::rgb(248, 113, 113),

            table_font_size: 8.0,
            row_height_factor: 2.0,
            estimate_factor: 1.5,

            panel_threshold: 40.0,
            status_threshold: 30.0,
            block_break_gap: 20.0,
            min_chart_height: 40.0,

            footer_offset: 15.0,
            footer_font_size: 8.0,
            footer_gray: 128,
        }
    }
}

impl LayoutConfig {
    /// Create the default A4 millimetre configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load overrides from a JSON document; omitted fields keep defaults.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the page size.
    pub fn with_page_size(mut self, width: f32, height: f32) -> Self {
        self.page_width = width;
        self.page_height = height;
        self
    }

    /// Set the four margins.
    pub fn with_margins(mut self, left: f32, top: f32, right: f32, bottom: f32) -> Self {
        self.margin_left = left;
        self.margin_top = top;
        self.margin_right = right;
        self.margin_bottom = bottom;
        self
    }

    /// Draw this logo in every page header.
    pub fn with_logo(mut self, path: impl Into<PathBuf>) -> Self {
        self.logo = Some(path.into());
        self
    }

    /// Set the table body font size.
    pub fn with_table_font_size(mut self, size: f32) -> Self {
        self.table_font_size = size;
        self
    }

    /// Set the columns carrying vertical group rules.
    pub fn with_vertical_rule_columns(mut self, columns: Vec<usize>) -> Self {
        self.vertical_rule_columns = columns;
        self
    }

    /// Set the negative-value marker character.
    pub fn with_negative_marker(mut self, marker: char) -> Self {
        self.negative_marker = marker;
        self
    }

    /// Page width minus left and right margins.
    pub fn usable_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }

    /// y where body content starts on a fresh page.
    pub fn content_top(&self) -> f32 {
        self.margin_top + self.header_gap
    }

    /// y beyond which content must not extend.
    pub fn page_break_trigger(&self) -> f32 {
        self.page_height - self.margin_bottom
    }

    /// Height available to body content on a fresh page.
    pub fn fresh_page_height(&self) -> f32 {
        self.page_break_trigger() - self.content_top()
    }

    /// Convert a point size to user units.
    pub fn pt_to_user(&self, points: f32) -> f32 {
        points / self.scale
    }

    /// Fixed row height of table rows, in user units.
    pub fn row_height(&self) -> f32 {
        self.pt_to_user(self.table_font_size) * self.row_height_factor
    }
}
