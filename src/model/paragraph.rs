//! Paragraph: a grouped unit of text moving through the pipeline.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{BlockKind, TextFormat};

/// Font size assumed when no statistics are available.
pub const DEFAULT_FONT_SIZE: f32 = 10.0;

/// A paragraph of contiguous lines.
///
/// Paragraphs are created by the layout grouper and then mutated in place by
/// each later stage: classification sets `kind`, caption consolidation
/// appends followers, normalization rewrites `text` and `format`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Text of each source line, in order
    pub lines: Vec<String>,
    /// Working text (lines joined with spaces until normalized)
    pub text: String,
    /// Inferred type (`None` until classified)
    pub kind: Option<BlockKind>,
    /// Heading level (1-3), only for headings
    pub level: Option<u8>,
    /// Rendering format
    pub format: TextFormat,
    /// 0-based page indices the contributing spans came from
    pub pages: BTreeSet<u32>,
    /// Dominant font size of the paragraph
    pub font_size: f32,
    /// Dominant body font size of the paragraph's page
    pub body_font_size: f32,
    /// Whether most characters are bold
    pub is_bold: bool,
    /// Share of characters set in a monospaced font (0.0-1.0)
    pub monospace_ratio: f32,
    /// Characters that came from superscript spans
    pub superscript_chars: usize,
    /// Left edge of the paragraph
    pub left: f32,
    /// Left text margin of the paragraph's column
    pub margin_left: f32,
    /// Top edge of the paragraph
    pub top: f32,
    /// Whether the classifier saw a heading signal (font size or section pattern)
    pub heading_signal: bool,
    /// Whether the paragraph sits inside a references section
    pub in_references: bool,
    /// Whether the classifier took the paragraph for running page furniture
    pub boilerplate: bool,
}

impl Paragraph {
    /// Create a paragraph from line texts on one page.
    pub fn from_lines(lines: Vec<String>, page: u32) -> Self {
        let text = join_lines(&lines);
        Self {
            lines,
            text,
            kind: None,
            level: None,
            format: TextFormat::Plain,
            pages: BTreeSet::from([page]),
            font_size: DEFAULT_FONT_SIZE,
            body_font_size: DEFAULT_FONT_SIZE,
            is_bold: false,
            monospace_ratio: 0.0,
            superscript_chars: 0,
            left: 0.0,
            margin_left: 0.0,
            top: 0.0,
            heading_signal: false,
            in_references: false,
            boilerplate: false,
        }
    }

    /// Create a single-line paragraph on page 0 in body font.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::from_lines(vec![text.into()], 0)
    }

    /// Set the page index.
    pub fn on_page(mut self, page: u32) -> Self {
        self.pages = BTreeSet::from([page]);
        self
    }

    /// Set font size and weight.
    pub fn with_font(mut self, font_size: f32, is_bold: bool) -> Self {
        self.font_size = font_size;
        self.is_bold = is_bold;
        self
    }

    /// Set the page's body font size.
    pub fn with_body_font(mut self, body_font_size: f32) -> Self {
        self.body_font_size = body_font_size;
        self
    }

    /// The kind, or `Paragraph` when unclassified.
    pub fn kind_or_default(&self) -> BlockKind {
        self.kind.unwrap_or(BlockKind::Paragraph)
    }

    /// First page the paragraph appears on.
    pub fn first_page(&self) -> u32 {
        self.pages.iter().next().copied().unwrap_or(0)
    }

    /// Last page the paragraph appears on.
    pub fn last_page(&self) -> u32 {
        self.pages.iter().next_back().copied().unwrap_or(0)
    }

    /// Whitespace-separated word count.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Number of characters.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether the paragraph has no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Font size relative to the page's body size.
    pub fn font_ratio(&self) -> f32 {
        if self.body_font_size > 0.0 {
            self.font_size / self.body_font_size
        } else {
            1.0
        }
    }

    /// Indentation relative to the column margin.
    pub fn indent(&self) -> f32 {
        (self.left - self.margin_left).max(0.0)
    }

    /// Append another paragraph's text and pages (used for caption merging).
    pub fn absorb(&mut self, other: Paragraph) {
        let text = other.text.trim();
        if !text.is_empty() {
            if !self.text.is_empty() {
                self.text.push(' ');
            }
            self.text.push_str(text);
        }
        self.lines.extend(other.lines);
        self.pages.extend(other.pages);
    }
}

/// Join line texts into paragraph text, repairing words hyphenated across
/// a line break ("algo-" + "rithm" → "algorithm").
pub fn join_lines(lines: &[String]) -> String {
    let mut text = String::new();
    for line in lines.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
        if text.is_empty() {
            text.push_str(line);
            continue;
        }
        let continues_lower = line.chars().next().is_some_and(|c| c.is_lowercase());
        let hyphenated = text.ends_with('-')
            && text
                .chars()
                .rev()
                .nth(1)
                .is_some_and(|c| c.is_alphabetic());
        if hyphenated && continues_lower {
            text.pop();
        } else {
            text.push(' ');
        }
        text.push_str(line);
    }
    text
}
