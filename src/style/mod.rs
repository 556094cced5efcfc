//! # Component Properties
//!
//! The semantic properties each component carries: font, text placement,
//! line strokes, picture placement and cell decoration. None of these know
//! where they end up on the page; the engine pairs them with a `Cell`.
//!
//! All properties serialize, which is how they show up in the structure
//! tree's `details` map.

use serde::{Deserialize, Serialize};

/// RGB color, each channel 0.0 - 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };
    pub const RED: Color = Color {
        r: 1.0,
        g: 0.0,
        b: 0.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Build a color from 0-255 channel values.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// The standard font families every PDF reader ships with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    Helvetica,
    Times,
    Courier,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Font selection used for height queries against the provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontProps {
    pub family: FontFamily,
    pub style: FontStyle,
    /// Size in points.
    pub size: f64,
    pub color: Color,
}

impl Default for FontProps {
    fn default() -> Self {
        Self {
            family: FontFamily::Helvetica,
            style: FontStyle::Normal,
            size: 10.0,
            color: Color::BLACK,
        }
    }
}

/// Text placement inside a cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    /// Offset from the top of the cell.
    pub top: f64,
    /// Inset from the left of the cell.
    pub left: f64,
    /// Inset from the right of the cell.
    pub right: f64,
    pub family: FontFamily,
    pub style: FontStyle,
    /// Size in points.
    pub size: f64,
    pub align: Align,
    pub color: Color,
    /// Extra space between wrapped lines.
    pub vertical_padding: f64,
}

impl Default for TextProps {
    fn default() -> Self {
        let font = FontProps::default();
        Self {
            top: 0.0,
            left: 0.0,
            right: 0.0,
            family: font.family,
            style: font.style,
            size: font.size,
            align: Align::Left,
            color: font.color,
            vertical_padding: 0.0,
        }
    }
}

impl TextProps {
    pub fn font(&self) -> FontProps {
        FontProps {
            family: self.family,
            style: self.style,
            size: self.size,
            color: self.color,
        }
    }

    /// Style used when a component degrades to an inline error message.
    pub fn error() -> Self {
        Self {
            style: FontStyle::Bold,
            color: Color::RED,
            ..Default::default()
        }
    }

    /// Apply a document-wide default font to text that kept the defaults.
    pub(crate) fn with_default_font(mut self, font: &FontProps) -> Self {
        let defaults = FontProps::default();
        if self.family == defaults.family {
            self.family = font.family;
        }
        if self.style == defaults.style {
            self.style = font.style;
        }
        if self.size == defaults.size {
            self.size = font.size;
        }
        if self.color == defaults.color {
            self.color = font.color;
        }
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineOrientation {
    #[default]
    Horizontal,
    Vertical,
}

/// Stroke drawn across a cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineProps {
    pub color: Color,
    pub style: LineStyle,
    pub thickness: f64,
    pub orientation: LineOrientation,
    /// Position across the cell, 0-100.
    pub offset_percent: f64,
    /// Length relative to the cell, 0-100.
    pub size_percent: f64,
}

impl Default for LineProps {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            style: LineStyle::Solid,
            thickness: 0.2,
            orientation: LineOrientation::Horizontal,
            offset_percent: 50.0,
            size_percent: 90.0,
        }
    }
}

/// Placement of a picture (image or QR code) inside a cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectProps {
    pub left: f64,
    pub top: f64,
    /// Share of the cell the picture may occupy, 0-100.
    pub percent: f64,
    /// Center the picture in the cell, ignoring `left`/`top`.
    pub center: bool,
}

impl Default for RectProps {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            percent: 100.0,
            center: false,
        }
    }
}

impl RectProps {
    pub fn centered(percent: f64) -> Self {
        Self {
            percent,
            center: true,
            ..Default::default()
        }
    }

    /// Clamp `percent` into 0-100.
    pub fn percent_fraction(&self) -> f64 {
        self.percent.clamp(0.0, 100.0) / 100.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BorderType {
    #[default]
    None,
    Full,
    Left,
    Top,
    Right,
    Bottom,
}

/// Background and border drawn behind a column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellProps {
    pub background_color: Option<Color>,
    pub border_type: BorderType,
    pub border_color: Option<Color>,
    pub border_thickness: f64,
}

impl CellProps {
    pub fn is_visible(&self) -> bool {
        self.background_color.is_some() || self.border_type != BorderType::None
    }
}

/// Label and stroke of a signature block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureProps {
    pub font: FontProps,
    pub line: LineProps,
    /// Space kept between the line and the label.
    pub safe_padding: f64,
}

impl Default for SignatureProps {
    fn default() -> Self {
        Self {
            font: FontProps {
                size: 8.0,
                ..Default::default()
            },
            line: LineProps {
                size_percent: 80.0,
                ..Default::default()
            },
            safe_padding: 1.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb8_conversion() {
        let c = Color::from_rgb8(255, 0, 51);
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert!((c.b - 0.2).abs() < 1e-9);
    }

    #[test]
    fn default_font_fills_untouched_text() {
        let font = FontProps {
            family: FontFamily::Courier,
            size: 12.0,
            ..Default::default()
        };
        let explicit = TextProps {
            size: 14.0,
            ..Default::default()
        }
        .with_default_font(&font);
        assert_eq!(explicit.family, FontFamily::Courier);
        assert_eq!(explicit.size, 14.0);
    }

    #[test]
    fn rect_percent_is_clamped() {
        let props = RectProps {
            percent: 140.0,
            ..Default::default()
        };
        assert_eq!(props.percent_fraction(), 1.0);
    }
}
