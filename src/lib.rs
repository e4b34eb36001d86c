//! # paperblocks
//!
//! Turns text spans extracted from a paper's PDF into an ordered sequence of
//! typed, size-bounded content blocks for a block-structured document store
//! such as Notion.
//!
//! ## Quick Start
//!
//! ```no_run
//! use paperblocks::{structure_file, render};
//!
//! fn main() -> paperblocks::Result<()> {
//!     // Page records as produced by PyMuPDF's page.get_text("dict")
//!     let doc = structure_file("paper.pages.json")?;
//!
//!     // Preview as Markdown
//!     let markdown = render::to_markdown(&doc, &render::RenderOptions::default())?;
//!     println!("{}", markdown);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - **Span ingestion**: flat span records or PyMuPDF text dictionaries
//! - **Layout grouping**: lines and paragraphs, two-column reading order
//! - **Classification**: heading, paragraph, caption, equation, citation, code, divider
//! - **Caption consolidation** and **normalization** of equations and citations
//! - **Chunking** to the destination's per-block character limit
//! - **Assembly** with dense ordering, page markers and truncation notes

pub mod error;
pub mod ingest;
pub mod model;
pub mod pipeline;
pub mod render;

// Re-export commonly used types
pub use error::{Error, Result};
pub use ingest::{load_pages_file, parse_pages, PageRecord, TextDict};
pub use model::{BBox, BlockKind, ContentBlock, Document, ExtractionStats, Span, TextFormat};
pub use pipeline::{Pipeline, PipelineOptions, Thresholds};
pub use render::{JsonFormat, RenderOptions};

use std::path::Path;

use rayon::prelude::*;

/// Structure ordered page records with default options.
///
/// # Example
///
/// ```
/// use paperblocks::{structure_pages, BBox, PageRecord, Span};
///
/// let spans = vec![Span::new("Hello world", 0, 10.0, BBox::new(72.0, 72.0, 140.0, 82.0))];
/// let doc = structure_pages(&[PageRecord::new(0, spans)]);
/// assert_eq!(doc.blocks[0].text, "Hello world");
/// ```
pub fn structure_pages(pages: &[PageRecord]) -> Document {
    Pipeline::default().run(pages)
}

/// Structure page records with custom options.
///
/// # Example
///
/// ```no_run
/// use paperblocks::{load_pages_file, structure_pages_with_options, PipelineOptions};
///
/// let options = PipelineOptions::new()
///     .with_max_pages(10)
///     .with_page_numbers(true);
/// let pages = load_pages_file("paper.pages.json")?;
/// let doc = structure_pages_with_options(&pages, options)?;
/// # Ok::<(), paperblocks::Error>(())
/// ```
pub fn structure_pages_with_options(
    pages: &[PageRecord],
    options: PipelineOptions,
) -> Result<Document> {
    options.validate()?;
    Ok(Pipeline::new(options).run(pages))
}

/// Load page records from a file and structure them with options read from
/// the environment (`PDF_MAX_PAGES`, `PDF_INCLUDE_PAGE_NUMBERS`,
/// `MAX_BLOCK_CHARS`).
pub fn structure_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let options = PipelineOptions::from_env()?;
    structure_file_with_options(path, options)
}

/// Load page records from a file and structure them.
pub fn structure_file_with_options<P: AsRef<Path>>(
    path: P,
    options: PipelineOptions,
) -> Result<Document> {
    let pages = load_pages_file(path)?;
    structure_pages_with_options(&pages, options)
}

/// Structure several independent documents in parallel.
///
/// Results keep the input order.
pub fn structure_batch(
    documents: &[Vec<PageRecord>],
    options: PipelineOptions,
) -> Result<Vec<Document>> {
    options.validate()?;
    let pipeline = Pipeline::new(options);
    Ok(documents
        .par_iter()
        .map(|pages| pipeline.run(pages))
        .collect())
}
