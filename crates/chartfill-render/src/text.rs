//! Text measurement without fonts.

use unicode_width::UnicodeWidthStr;

/// Style inputs that affect measured extents.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_size: f64,
    pub bold: bool,
}

impl TextStyle {
    pub fn sized(font_size: f64) -> Self {
        Self {
            font_size,
            bold: false,
        }
    }

    pub fn bold(font_size: f64) -> Self {
        Self {
            font_size,
            bold: true,
        }
    }
}

/// Measured extents of a single line of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
}

/// Estimates text extents for layout; rendering never queries real fonts.
pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;
}

/// Column-based estimate: display columns times a per-column width.
///
/// Wide (CJK) glyphs count as two columns, so legends and titles reserve
/// enough room without any font access. Output is identical on every
/// machine.
#[derive(Debug, Clone)]
pub struct DeterministicTextMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl Default for DeterministicTextMeasurer {
    fn default() -> Self {
        Self {
            char_width_factor: 0.6,
            line_height_factor: 1.2,
        }
    }
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let columns = UnicodeWidthStr::width(text) as f64;
        let weight = if style.bold { 1.08 } else { 1.0 };
        TextMetrics {
            width: columns * style.font_size * self.char_width_factor * weight,
            height: style.font_size * self.line_height_factor,
        }
    }
}
