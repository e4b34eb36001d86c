//! Document-level types.

use serde::{Deserialize, Serialize};

use super::{BlockKind, ContentBlock};

/// The structured content of one source PDF.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Blocks in reading order
    pub blocks: Vec<ContentBlock>,

    /// Number of pages that were structured
    pub pages_processed: u32,

    /// Number of pages that were available
    pub total_pages: u32,

    /// Whether the page cap cut extraction short
    pub truncated: bool,

    /// Summary statistics over the emitted blocks
    pub stats: ExtractionStats,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate over blocks of one kind.
    pub fn blocks_of(&self, kind: BlockKind) -> impl Iterator<Item = &ContentBlock> {
        self.blocks.iter().filter(move |b| b.kind == kind)
    }

    /// Blocks whose text came from the given page.
    pub fn blocks_on_page(&self, page: u32) -> impl Iterator<Item = &ContentBlock> {
        self.blocks
            .iter()
            .filter(move |b| b.source_pages.contains(&page))
    }

    /// Plain text of the document, one block per paragraph.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .filter(|b| !b.text.is_empty())
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Statistics collected while assembling a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Number of heading blocks
    pub heading_count: u32,

    /// Number of body paragraph blocks
    pub paragraph_count: u32,

    /// Number of caption blocks
    pub caption_count: u32,

    /// Number of equation blocks
    pub equation_count: u32,

    /// Number of citation blocks
    pub citation_count: u32,

    /// Number of code blocks
    pub code_count: u32,

    /// Number of divider blocks
    pub divider_count: u32,

    /// Number of tokens that had to be hard-cut at the block limit
    pub hard_cuts: u32,

    /// Approximate word count (whitespace-separated tokens)
    pub word_count: u32,

    /// Character count (excluding whitespace)
    pub char_count: u32,
}

impl ExtractionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one block.
    pub fn add_block(&mut self, block: &ContentBlock) {
        match block.kind {
            BlockKind::Heading => self.heading_count += 1,
            BlockKind::Paragraph => self.paragraph_count += 1,
            BlockKind::Caption => self.caption_count += 1,
            BlockKind::Equation => self.equation_count += 1,
            BlockKind::Citation => self.citation_count += 1,
            BlockKind::Code => self.code_count += 1,
            BlockKind::Divider => self.divider_count += 1,
        }
        if block.lossy {
            self.hard_cuts += 1;
        }
        self.count_text(&block.text);
    }

    /// Add word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        self.word_count += text.split_whitespace().count() as u32;
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
    }

    /// Total number of blocks counted.
    pub fn block_count(&self) -> u32 {
        self.heading_count
            + self.paragraph_count
            + self.caption_count
            + self.equation_count
            + self.citation_count
            + self.code_count
            + self.divider_count
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.heading_count += other.heading_count;
        self.paragraph_count += other.paragraph_count;
        self.caption_count += other.caption_count;
        self.equation_count += other.equation_count;
        self.citation_count += other.citation_count;
        self.code_count += other.code_count;
        self.divider_count += other.divider_count;
        self.hard_cuts += other.hard_cuts;
        self.word_count += other.word_count;
        self.char_count += other.char_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_stats_count_text() {
        let mut stats = ExtractionStats::new();
        stats.count_text("Hello, world! This is a test.");

        assert_eq!(stats.word_count, 6);
        assert_eq!(stats.char_count, 24);
    }

    #[test]
    fn test_extraction_stats_add_block() {
        let mut stats = ExtractionStats::new();
        stats.add_block(&ContentBlock::heading("Intro", 1));
        stats.add_block(&ContentBlock::divider());
        let mut cut = ContentBlock::new(BlockKind::Paragraph, "x");
        cut.lossy = true;
        stats.add_block(&cut);

        assert_eq!(stats.heading_count, 1);
        assert_eq!(stats.divider_count, 1);
        assert_eq!(stats.paragraph_count, 1);
        assert_eq!(stats.hard_cuts, 1);
        assert_eq!(stats.block_count(), 3);
    }

    #[test]
    fn test_extraction_stats_merge() {
        let mut stats1 = ExtractionStats {
            paragraph_count: 5,
            citation_count: 2,
            ..Default::default()
        };
        let stats2 = ExtractionStats {
            paragraph_count: 3,
            citation_count: 1,
            hard_cuts: 4,
            ..Default::default()
        };

        stats1.merge(&stats2);

        assert_eq!(stats1.paragraph_count, 8);
        assert_eq!(stats1.citation_count, 3);
        assert_eq!(stats1.hard_cuts, 4);
    }

    #[test]
    fn test_document_page_filter() {
        let mut doc = Document::new();
        doc.blocks.push(
            ContentBlock::new(BlockKind::Paragraph, "a").with_pages([0].into_iter().collect()),
        );
        doc.blocks.push(
            ContentBlock::new(BlockKind::Paragraph, "b").with_pages([1].into_iter().collect()),
        );
        assert_eq!(doc.blocks_on_page(1).count(), 1);
        assert_eq!(doc.plain_text(), "a\n\nb");
    }
}
