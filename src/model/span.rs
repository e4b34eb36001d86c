//! Span-level types: the smallest extracted text unit.

use serde::{Deserialize, Serialize};

/// Font flag bits as reported by PyMuPDF's text dictionary.
pub mod font_flags {
    /// Superscript glyphs
    pub const SUPERSCRIPT: u32 = 1;
    /// Italic font
    pub const ITALIC: u32 = 2;
    /// Serif font
    pub const SERIF: u32 = 4;
    /// Monospaced font
    pub const MONOSPACE: u32 = 8;
    /// Bold font
    pub const BOLD: u32 = 16;
}

/// An axis-aligned bounding box with a top-left origin (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BBox {
    /// Create a new bounding box.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    /// Vertical center.
    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    /// Horizontal center.
    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }
}

impl From<[f32; 4]> for BBox {
    fn from(b: [f32; 4]) -> Self {
        Self::new(b[0], b[1], b[2], b[3])
    }
}

/// A run of glyphs sharing one font, with its position on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// The text content
    pub text: String,
    /// 0-based page index
    #[serde(default)]
    pub page: u32,
    /// Font size in points
    pub font_size: f32,
    /// Whether the font is bold
    #[serde(default)]
    pub is_bold: bool,
    /// Whether the font is italic
    #[serde(default)]
    pub is_italic: bool,
    /// Whether the font is monospaced
    #[serde(default)]
    pub is_monospace: bool,
    /// Whether the glyphs are raised (superscript)
    #[serde(default)]
    pub is_superscript: bool,
    /// Position on the page
    pub bbox: BBox,
}

impl Span {
    /// Create a regular-weight span.
    pub fn new(text: impl Into<String>, page: u32, font_size: f32, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            page,
            font_size,
            is_bold: false,
            is_italic: false,
            is_monospace: false,
            is_superscript: false,
            bbox,
        }
    }

    /// Apply a PyMuPDF font flag word.
    pub fn with_flags(mut self, flags: u32) -> Self {
        self.is_superscript = flags & font_flags::SUPERSCRIPT != 0;
        self.is_italic = flags & font_flags::ITALIC != 0;
        self.is_monospace = flags & font_flags::MONOSPACE != 0;
        self.is_bold = flags & font_flags::BOLD != 0;
        self
    }

    /// Mark the span bold.
    pub fn bold(mut self) -> Self {
        self.is_bold = true;
        self
    }

    /// Mark the span monospaced.
    pub fn monospace(mut self) -> Self {
        self.is_monospace = true;
        self
    }

    /// Number of characters in the span.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether the span carries no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_decoding() {
        let span = Span::new("x", 0, 10.0, BBox::default())
            .with_flags(font_flags::BOLD | font_flags::ITALIC);
        assert!(span.is_bold);
        assert!(span.is_italic);
        assert!(!span.is_monospace);
        assert!(!span.is_superscript);

        let span = Span::new("2", 0, 6.0, BBox::default())
            .with_flags(font_flags::SUPERSCRIPT | font_flags::MONOSPACE | font_flags::SERIF);
        assert!(span.is_superscript);
        assert!(span.is_monospace);
        assert!(!span.is_bold);
    }

    #[test]
    fn test_bbox_geometry() {
        let bbox = BBox::from([10.0, 20.0, 50.0, 32.0]);
        assert_eq!(bbox.width(), 40.0);
        assert_eq!(bbox.height(), 12.0);
        assert_eq!(bbox.center_y(), 26.0);
        assert_eq!(bbox.center_x(), 30.0);
    }
}
