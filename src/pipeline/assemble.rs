//! Document assembly: chunking, ordering and page markers.

use crate::model::{BlockKind, ContentBlock, Document, ExtractionStats, Paragraph};

use super::chunk::BlockChunker;

/// Builds the final [`Document`] from normalized paragraphs.
#[derive(Debug, Clone)]
pub struct DocumentAssembler {
    chunker: BlockChunker,
    include_page_numbers: bool,
}

impl DocumentAssembler {
    /// Create an assembler that splits blocks above `max_block_chars` and
    /// optionally marks the start of each page.
    pub fn new(max_block_chars: usize, include_page_numbers: bool) -> Self {
        Self {
            chunker: BlockChunker::new(max_block_chars),
            include_page_numbers,
        }
    }

    /// Assemble blocks in reading order.
    ///
    /// `pages_processed` and `total_pages` describe the page cap; when fewer
    /// pages were processed than available a truncation note closes the
    /// document.
    pub fn assemble(
        &self,
        paragraphs: &[Paragraph],
        pages_processed: u32,
        total_pages: u32,
    ) -> Document {
        let mut blocks: Vec<ContentBlock> = Vec::new();
        let mut marked_page: Option<u32> = None;

        for para in paragraphs {
            if self.include_page_numbers {
                let page = para.first_page();
                if marked_page.map_or(true, |marked| page > marked) {
                    if !blocks.is_empty() {
                        push_block(&mut blocks, ContentBlock::divider());
                    }
                    let marker = ContentBlock::heading(format!("Page {}", page + 1), 2)
                        .with_pages([page].into());
                    for block in self.chunker.chunk_block(marker) {
                        push_block(&mut blocks, block);
                    }
                    marked_page = Some(page);
                }
            }

            for block in self.chunker.chunk_paragraph(para) {
                push_block(&mut blocks, block);
            }
        }

        let truncated = total_pages > pages_processed;
        if truncated {
            while blocks.last().is_some_and(ContentBlock::is_bare_divider) {
                blocks.pop();
            }
            let note = ContentBlock::new(
                BlockKind::Divider,
                format!(
                    "Extraction truncated: processed {} of {} pages",
                    pages_processed, total_pages
                ),
            );
            blocks.extend(self.chunker.chunk_block(note));
        }

        let mut stats = ExtractionStats::new();
        for (order, block) in blocks.iter_mut().enumerate() {
            block.order = order;
            stats.add_block(block);
        }

        if stats.hard_cuts > 0 {
            log::warn!(
                "{} block(s) were hard-cut at {} chars",
                stats.hard_cuts,
                self.chunker.max_chars()
            );
        }
        log::info!(
            "Assembled {} blocks from {} paragraphs ({} of {} pages{})",
            blocks.len(),
            paragraphs.len(),
            pages_processed,
            total_pages,
            if truncated { ", truncated" } else { "" }
        );

        Document {
            blocks,
            pages_processed,
            total_pages,
            truncated,
            stats,
        }
    }
}

/// Push a block, collapsing a run of bare dividers into one.
fn push_block(blocks: &mut Vec<ContentBlock>, block: ContentBlock) {
    if block.is_bare_divider() && blocks.last().is_some_and(ContentBlock::is_bare_divider) {
        return;
    }
    blocks.push(block);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para(text: &str, kind: BlockKind, page: u32) -> Paragraph {
        let mut p = Paragraph::with_text(text).on_page(page);
        p.kind = Some(kind);
        if kind == BlockKind::Divider {
            p.text.clear();
        }
        p
    }

    #[test]
    fn test_dense_order() {
        let paras = vec![
            para("Intro", BlockKind::Heading, 0),
            para("one two three four five", BlockKind::Paragraph, 0),
            para("six", BlockKind::Paragraph, 1),
        ];
        let doc = DocumentAssembler::new(10, false).assemble(&paras, 2, 2);
        let orders: Vec<usize> = doc.blocks.iter().map(|b| b.order).collect();
        assert_eq!(orders, (0..doc.len()).collect::<Vec<_>>());
        assert!(doc.blocks.iter().all(|b| b.char_count() <= 10));
        assert!(!doc.truncated);
        assert_eq!(doc.stats.block_count() as usize, doc.len());
    }

    #[test]
    fn test_bare_dividers_collapse() {
        let paras = vec![
            para("A", BlockKind::Paragraph, 0),
            para("", BlockKind::Divider, 0),
            para("", BlockKind::Divider, 0),
            para("", BlockKind::Divider, 1),
            para("B", BlockKind::Paragraph, 1),
        ];
        let doc = DocumentAssembler::new(2000, false).assemble(&paras, 2, 2);
        let kinds: Vec<BlockKind> = doc.blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![BlockKind::Paragraph, BlockKind::Divider, BlockKind::Paragraph]
        );
    }

    #[test]
    fn test_page_markers() {
        let paras = vec![
            para("First", BlockKind::Paragraph, 0),
            para("More", BlockKind::Paragraph, 0),
            para("Second", BlockKind::Paragraph, 2),
        ];
        let doc = DocumentAssembler::new(2000, true).assemble(&paras, 3, 3);
        let texts: Vec<&str> = doc.blocks.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["Page 1", "First", "More", "", "Page 3", "Second"]);
        assert_eq!(doc.blocks[0].level, Some(2));
        assert_eq!(doc.blocks[3].kind, BlockKind::Divider);
    }

    #[test]
    fn test_truncation_note() {
        let paras = vec![
            para("Body", BlockKind::Paragraph, 0),
            para("", BlockKind::Divider, 0),
        ];
        let doc = DocumentAssembler::new(2000, false).assemble(&paras, 25, 30);
        assert!(doc.truncated);
        assert_eq!(doc.pages_processed, 25);
        assert_eq!(doc.total_pages, 30);
        assert_eq!(doc.len(), 2);
        let note = &doc.blocks[1];
        assert_eq!(note.kind, BlockKind::Divider);
        assert_eq!(note.text, "Extraction truncated: processed 25 of 30 pages");
        assert_eq!(note.order, 1);
    }

    #[test]
    fn test_markers_and_note_respect_block_size() {
        let paras = vec![
            para("First", BlockKind::Paragraph, 0),
            para("Second", BlockKind::Paragraph, 1),
        ];
        let doc = DocumentAssembler::new(10, true).assemble(&paras, 2, 3);
        assert!(doc.truncated);
        assert!(doc.blocks.iter().all(|b| b.char_count() <= 10));
        assert_eq!(doc.stats.hard_cuts, 0);

        let note: Vec<&str> = doc
            .blocks
            .iter()
            .skip_while(|b| b.text != "Second")
            .skip(1)
            .map(|b| b.text.as_str())
            .collect();
        assert_eq!(note, vec!["Extraction", "truncated:", "processed", "2 of 3", "pages"]);
        assert!(doc.blocks.iter().rev().take(5).all(|b| b.kind == BlockKind::Divider));
    }

    #[test]
    fn test_hard_cut_counted() {
        let paras = vec![para(&"x".repeat(25), BlockKind::Paragraph, 0)];
        let doc = DocumentAssembler::new(10, false).assemble(&paras, 1, 1);
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.stats.hard_cuts, 2);
        assert!(doc.blocks[0].lossy);
        assert!(!doc.blocks[2].lossy);
    }

    #[test]
    fn test_empty_input() {
        let doc = DocumentAssembler::new(2000, true).assemble(&[], 0, 0);
        assert!(doc.is_empty());
        assert!(!doc.truncated);
    }
}
