//! The content structuring pipeline.
//!
//! Stages run in a single forward pass per document:
//!
//! 1. [`LayoutGrouper`]: spans into lines, lines into paragraphs
//! 2. [`Classifier`]: one [`BlockKind`](crate::model::BlockKind) per paragraph;
//!    page furniture is dropped here when `skip_boilerplate` is set
//! 3. [`CaptionConsolidator`]: caption continuation merge
//! 4. [`Normalizer`]: canonical equation, citation and code text
//! 5. [`DocumentAssembler`]: chunking via [`BlockChunker`], ordering, page markers

mod assemble;
mod caption;
mod chunk;
mod classify;
mod cleanup;
mod layout;
mod normalize;
mod options;

pub use assemble::DocumentAssembler;
pub use caption::CaptionConsolidator;
pub use chunk::{BlockChunker, Chunk};
pub use classify::Classifier;
pub use cleanup::{collapse_whitespace, CleanupOptions, TextCleaner};
pub use layout::{Column, FontStatistics, LayoutGrouper, Line};
pub use normalize::Normalizer;
pub use options::{
    parse_flag, PipelineOptions, Thresholds, DEFAULT_MAX_BLOCK_CHARS, DEFAULT_MAX_PAGES,
    ENV_INCLUDE_PAGE_NUMBERS, ENV_MAX_BLOCK_CHARS, ENV_MAX_PAGES,
};

use crate::ingest::PageRecord;
use crate::model::{Document, Paragraph};

/// A configured pipeline. Immutable, so one instance can serve many
/// documents from several threads.
#[derive(Debug, Clone)]
pub struct Pipeline {
    options: PipelineOptions,
    grouper: LayoutGrouper,
    classifier: Classifier,
    consolidator: CaptionConsolidator,
    normalizer: Normalizer,
    assembler: DocumentAssembler,
}

impl Pipeline {
    /// Create a pipeline with the given options.
    pub fn new(options: PipelineOptions) -> Self {
        let thresholds = &options.thresholds;
        Self {
            grouper: LayoutGrouper::new(thresholds.clone()),
            classifier: Classifier::new(thresholds.clone()),
            consolidator: CaptionConsolidator::new(thresholds),
            normalizer: Normalizer::new(),
            assembler: DocumentAssembler::new(
                options.max_block_chars,
                options.include_page_numbers,
            ),
            options,
        }
    }

    /// Get the options.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Structure a document from its ordered page records.
    ///
    /// Only the first `max_pages` records are processed; the document
    /// records how many were available.
    pub fn run(&self, pages: &[PageRecord]) -> Document {
        let total_pages = u32::try_from(pages.len()).unwrap_or(u32::MAX);
        let pages_processed = total_pages.min(self.options.max_pages.max(1));

        let mut paragraphs: Vec<Paragraph> = Vec::new();
        for record in pages.iter().take(pages_processed as usize) {
            let page_paragraphs = self.grouper.group_page(record.page, &record.spans);
            if page_paragraphs.is_empty() {
                log::debug!("Page {} has no text", record.page + 1);
            }
            paragraphs.extend(page_paragraphs);
        }

        self.classifier.classify(&mut paragraphs);
        if self.options.skip_boilerplate {
            let before = paragraphs.len();
            paragraphs.retain(|p| !p.boilerplate);
            if paragraphs.len() < before {
                log::debug!("Dropped {} boilerplate paragraph(s)", before - paragraphs.len());
            }
        }
        let mut paragraphs = self.consolidator.consolidate(paragraphs);
        self.normalizer.normalize(&mut paragraphs);

        self.assembler
            .assemble(&paragraphs, pages_processed, total_pages)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineOptions::default())
    }
}
