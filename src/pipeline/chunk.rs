//! Size-bounded block splitting.
//!
//! Limits count Unicode scalar values, the unit the destination API uses for
//! its rich-text limit, so a chunk never has more than `max_chars` chars.

use crate::model::{ContentBlock, Paragraph};

/// One piece of a split text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Chunk text
    pub text: String,
    /// Whether the chunk ends at a forced cut inside a token
    pub lossy: bool,
}

/// Splits oversized paragraph text into chunks at whitespace boundaries.
#[derive(Debug, Clone, Copy)]
pub struct BlockChunker {
    max_chars: usize,
}

impl BlockChunker {
    /// Create a chunker. A zero limit is treated as 1.
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars: max_chars.max(1),
        }
    }

    /// The per-chunk character limit.
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Split text greedily.
    ///
    /// Each chunk is the longest prefix of the remainder, at most `max_chars`
    /// long, that ends right before a whitespace character; that single
    /// whitespace character is consumed. A remainder with no such boundary
    /// within the limit is cut at exactly `max_chars` and flagged lossy.
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        let chars: Vec<char> = text.chars().collect();
        if chars.len() <= self.max_chars {
            return vec![Chunk {
                text: text.to_string(),
                lossy: false,
            }];
        }

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let remaining = chars.len() - start;
            if remaining <= self.max_chars {
                chunks.push(Chunk {
                    text: chars[start..].iter().collect(),
                    lossy: false,
                });
                break;
            }

            let limit = start + self.max_chars;
            let boundary = (start + 1..=limit).rev().find(|&i| chars[i].is_whitespace());

            match boundary {
                Some(end) => {
                    chunks.push(Chunk {
                        text: chars[start..end].iter().collect(),
                        lossy: false,
                    });
                    start = end + 1;
                }
                None => {
                    log::warn!(
                        "Hard cut: no whitespace within {} chars, splitting token at char {}",
                        self.max_chars,
                        limit
                    );
                    chunks.push(Chunk {
                        text: chars[start..limit].iter().collect(),
                        lossy: true,
                    });
                    start = limit;
                }
            }
        }

        chunks
    }

    /// Turn a normalized paragraph into one or more blocks. Every block keeps
    /// the paragraph's kind, level, format and pages; `order` is left for the
    /// assembler.
    pub fn chunk_paragraph(&self, para: &Paragraph) -> Vec<ContentBlock> {
        let mut block = ContentBlock::new(para.kind_or_default(), para.text.clone())
            .with_pages(para.pages.clone());
        block.level = para.level;
        block.format = para.format;
        self.chunk_block(block)
    }

    /// Split a block built outside the pipeline stages. Chunks copy every
    /// field except text and `lossy`.
    pub fn chunk_block(&self, block: ContentBlock) -> Vec<ContentBlock> {
        if block.char_count() <= self.max_chars {
            return vec![block];
        }
        self.split(&block.text)
            .into_iter()
            .map(|chunk| ContentBlock {
                text: chunk.text,
                lossy: chunk.lossy,
                ..block.clone()
            })
            .collect()
    }
}
