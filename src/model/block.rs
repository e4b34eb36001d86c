//! Content blocks: the typed, size-bounded units handed to the destination.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic type of a paragraph or block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Section heading
    Heading,
    /// Body text
    Paragraph,
    /// Figure or table caption
    Caption,
    /// Display equation
    Equation,
    /// Bibliography entry
    Citation,
    /// Source listing
    Code,
    /// Horizontal rule or structural note
    Divider,
}

impl BlockKind {
    /// All kinds, in classification precedence order.
    pub const ALL: [BlockKind; 7] = [
        BlockKind::Heading,
        BlockKind::Citation,
        BlockKind::Equation,
        BlockKind::Code,
        BlockKind::Caption,
        BlockKind::Divider,
        BlockKind::Paragraph,
    ];

    /// Lowercase name used in logs and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Heading => "heading",
            BlockKind::Paragraph => "paragraph",
            BlockKind::Caption => "caption",
            BlockKind::Equation => "equation",
            BlockKind::Citation => "citation",
            BlockKind::Code => "code",
            BlockKind::Divider => "divider",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the renderer should treat whitespace in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextFormat {
    /// Regular flowing text
    #[default]
    Plain,
    /// Monospace, whitespace-preserving text
    Preformatted,
}

/// A final block of content, immutable once emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Semantic type
    pub kind: BlockKind,
    /// Text content (at most the configured block size in characters)
    pub text: String,
    /// Dense 0-based position in reading order
    pub order: usize,
    /// 0-based page indices the text came from
    pub source_pages: BTreeSet<u32>,
    /// Heading level (1-3) for headings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    /// Rendering format
    #[serde(default)]
    pub format: TextFormat,
    /// Whether this block was produced by hard-cutting an unsplittable token
    #[serde(default, skip_serializing_if = "is_false")]
    pub lossy: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl ContentBlock {
    /// Create a plain block. `order` is assigned by the assembler.
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            order: 0,
            source_pages: BTreeSet::new(),
            level: None,
            format: TextFormat::Plain,
            lossy: false,
        }
    }

    /// Create an empty divider block.
    pub fn divider() -> Self {
        Self::new(BlockKind::Divider, "")
    }

    /// Create a heading block.
    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        let mut block = Self::new(BlockKind::Heading, text);
        block.level = Some(level.clamp(1, 3));
        block
    }

    /// Set the source pages.
    pub fn with_pages(mut self, pages: BTreeSet<u32>) -> Self {
        self.source_pages = pages;
        self
    }

    /// Number of characters in the text.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether this is an empty rule (a divider without a note).
    pub fn is_bare_divider(&self) -> bool {
        self.kind == BlockKind::Divider && self.text.trim().is_empty()
    }

    /// Whether the renderer should preserve whitespace.
    pub fn is_preformatted(&self) -> bool {
        self.format == TextFormat::Preformatted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&BlockKind::Citation).unwrap();
        assert_eq!(json, "\"citation\"");
        assert_eq!(BlockKind::Equation.to_string(), "equation");
    }

    #[test]
    fn test_heading_level_clamped() {
        let block = ContentBlock::heading("Intro", 6);
        assert_eq!(block.level, Some(3));
        assert_eq!(block.kind, BlockKind::Heading);
    }

    #[test]
    fn test_block_json_omits_defaults() {
        let block = ContentBlock::new(BlockKind::Paragraph, "text");
        let json = serde_json::to_string(&block).unwrap();
        assert!(!json.contains("lossy"));
        assert!(!json.contains("level"));
        assert!(json.contains("\"format\":\"plain\""));
    }

    #[test]
    fn test_bare_divider() {
        assert!(ContentBlock::divider().is_bare_divider());
        assert!(!ContentBlock::new(BlockKind::Divider, "note").is_bare_divider());
    }
}
