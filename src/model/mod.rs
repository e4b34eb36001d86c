//! Data model for the structuring pipeline.
//!
//! Spans come in from the PDF reader, paragraphs flow through the pipeline
//! stages, and content blocks come out inside a [`Document`].

mod block;
mod document;
mod paragraph;
mod span;

pub use block::{BlockKind, ContentBlock, TextFormat};
pub use document::{Document, ExtractionStats};
pub use paragraph::{join_lines, Paragraph, DEFAULT_FONT_SIZE};
pub use span::{font_flags, BBox, Span};
