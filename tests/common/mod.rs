//! Synthetic page fixtures shared by the integration tests.

#![allow(dead_code)]

use paperblocks::{BBox, PageRecord, Span};

/// Left margin of generated pages.
pub const MARGIN: f32 = 72.0;

/// Lays out one span per line, top to bottom, the way a single-column
/// paper page is extracted.
pub struct PageBuilder {
    page: u32,
    y: f32,
    spans: Vec<Span>,
}

impl PageBuilder {
    pub fn new(page: u32) -> Self {
        Self {
            page,
            y: 72.0,
            spans: Vec::new(),
        }
    }

    /// A body line in the given font size.
    pub fn line(self, text: &str, size: f32) -> Self {
        let page = self.page;
        self.push(Span::new(text, page, size, BBox::default()), MARGIN)
    }

    /// Several body lines in 10pt.
    pub fn lines(mut self, texts: &[&str]) -> Self {
        for text in texts {
            self = self.line(text, 10.0);
        }
        self
    }

    pub fn bold_line(self, text: &str, size: f32) -> Self {
        let page = self.page;
        self.push(Span::new(text, page, size, BBox::default()).bold(), MARGIN)
    }

    pub fn mono_line(self, text: &str) -> Self {
        let page = self.page;
        self.push(Span::new(text, page, 10.0, BBox::default()).monospace(), MARGIN)
    }

    /// Extra vertical space that separates paragraphs.
    pub fn gap(mut self) -> Self {
        self.y += 18.0;
        self
    }

    fn push(mut self, mut span: Span, x: f32) -> Self {
        let size = span.font_size;
        let width = span.text.chars().count() as f32 * size * 0.5;
        span.bbox = BBox::new(x, self.y, x + width, self.y + size);
        self.spans.push(span);
        self.y += size * 1.2;
        self
    }

    pub fn build(self) -> PageRecord {
        PageRecord::new(self.page, self.spans)
    }
}

/// A body paragraph of several full-width lines.
pub const BODY: [&str; 6] = [
    "Reference managers keep bibliographic records but",
    "rarely keep the text of the papers themselves, so",
    "readers copy passages into their notes by hand and",
    "lose the structure of headings, figures and the",
    "equations that made the original paper readable in",
    "the first place when they come back to it later on.",
];

/// A closing paragraph, too long to pass for a caption continuation.
pub const CLOSING: [&str; 4] = [
    "The pipeline keeps that structure intact for every",
    "page it processes and reports what it could not fit",
    "into the destination within the configured limits,",
    "without asking the reader to repair anything later.",
];

/// One page mixing a heading, body text, a split caption and an equation.
pub fn paper_page(page: u32) -> PageRecord {
    PageBuilder::new(page)
        .line("1. Introduction", 14.0)
        .gap()
        .lines(&BODY)
        .gap()
        .line("Figure 1: Overview of", 10.0)
        .gap()
        .line("the system.", 10.0)
        .gap()
        .lines(&CLOSING)
        .gap()
        .line("E = mc^2 (1)", 10.0)
        .build()
}

/// A page with a single sentence.
pub fn sentence_page(page: u32) -> PageRecord {
    PageBuilder::new(page)
        .line(&format!("This is the only sentence printed on page {}.", page + 1), 10.0)
        .build()
}
