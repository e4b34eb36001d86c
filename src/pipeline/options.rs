//! Pipeline options and classification thresholds.

use crate::error::{Error, Result};

/// Environment variable for the page cap.
pub const ENV_MAX_PAGES: &str = "PDF_MAX_PAGES";
/// Environment variable for page-number markers.
pub const ENV_INCLUDE_PAGE_NUMBERS: &str = "PDF_INCLUDE_PAGE_NUMBERS";
/// Environment variable for the per-block character limit.
pub const ENV_MAX_BLOCK_CHARS: &str = "MAX_BLOCK_CHARS";

/// Default page cap.
pub const DEFAULT_MAX_PAGES: u32 = 25;
/// Default per-block character limit (Notion's rich-text limit).
pub const DEFAULT_MAX_BLOCK_CHARS: usize = 2000;

/// Options for a structuring run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// Maximum number of pages to structure (at least 1)
    pub max_pages: u32,

    /// Insert a "Page N" heading before each page's content
    pub include_page_numbers: bool,

    /// Maximum characters per emitted block (at least 1)
    pub max_block_chars: usize,

    /// Drop running page furniture (page numbers, permission notices,
    /// DOI lines, venue headers)
    pub skip_boilerplate: bool,

    /// Layout and classification thresholds
    pub thresholds: Thresholds,
}

impl PipelineOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read options from `PDF_MAX_PAGES`, `PDF_INCLUDE_PAGE_NUMBERS` and
    /// `MAX_BLOCK_CHARS`. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build options from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();

        if let Some(value) = lookup(ENV_MAX_PAGES) {
            options.max_pages = parse_positive(ENV_MAX_PAGES, &value)?;
        }
        if let Some(value) = lookup(ENV_INCLUDE_PAGE_NUMBERS) {
            options.include_page_numbers = parse_flag(ENV_INCLUDE_PAGE_NUMBERS, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_BLOCK_CHARS) {
            options.max_block_chars = parse_positive(ENV_MAX_BLOCK_CHARS, &value)?;
        }

        Ok(options)
    }

    /// Set the page cap.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Enable or disable page-number markers.
    pub fn with_page_numbers(mut self, include: bool) -> Self {
        self.include_page_numbers = include;
        self
    }

    /// Set the per-block character limit.
    pub fn with_max_block_chars(mut self, max_block_chars: usize) -> Self {
        self.max_block_chars = max_block_chars;
        self
    }

    /// Enable or disable dropping of page numbers and similar boilerplate.
    pub fn with_boilerplate_filter(mut self, skip: bool) -> Self {
        self.skip_boilerplate = skip;
        self
    }

    /// Replace the thresholds.
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Check that limits are usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_pages == 0 {
            return Err(Error::config(ENV_MAX_PAGES, "0", "must be at least 1"));
        }
        if self.max_block_chars == 0 {
            return Err(Error::config(ENV_MAX_BLOCK_CHARS, "0", "must be at least 1"));
        }
        Ok(())
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            include_page_numbers: false,
            max_block_chars: DEFAULT_MAX_BLOCK_CHARS,
            skip_boilerplate: true,
            thresholds: Thresholds::default(),
        }
    }
}

/// Policy constants for layout grouping and classification.
///
/// All heuristics read from here so a run is reproducible and tunable.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    /// Spans whose vertical centers differ by at most this fraction of the
    /// font size share a line
    pub line_tolerance: f32,

    /// A vertical gap above this multiple of the page's average line
    /// spacing starts a new paragraph
    pub paragraph_gap_ratio: f32,

    /// Cap on the line spacing used for paragraph breaks, as a multiple of
    /// the body font size, so gaps between one-line paragraphs never count
    /// as line spacing
    pub max_line_pitch: f32,

    /// A font size change above this many points starts a new paragraph
    pub font_size_jump: f32,

    /// Paragraphs with more words are never headings
    pub heading_max_words: usize,

    /// Font size over body size at which a paragraph has a heading signal
    pub heading_font_ratio: f32,

    /// Ratio of math symbols to visible characters marking an equation
    pub equation_symbol_density: f32,

    /// Equations need at least this many visible characters
    pub equation_min_chars: usize,

    /// Share of monospaced characters marking a code block
    pub code_monospace_ratio: f32,

    /// Indentation (points) beyond the column margin suggesting a listing
    pub code_indent: f32,

    /// Caption followers with more words end the merge
    pub caption_follow_max_words: usize,

    /// Minimum gutter width (points) for two-column detection
    pub column_gutter: f32,

    /// Minimum column width (points) for two-column detection
    pub column_min_width: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            line_tolerance: 0.3,
            paragraph_gap_ratio: 1.5,
            max_line_pitch: 1.7,
            font_size_jump: 1.0,
            heading_max_words: 12,
            heading_font_ratio: 1.15,
            equation_symbol_density: 0.2,
            equation_min_chars: 3,
            code_monospace_ratio: 0.5,
            code_indent: 24.0,
            caption_follow_max_words: 30,
            column_gutter: 12.0,
            column_min_width: 80.0,
        }
    }
}

fn parse_positive<T>(name: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let parsed: T = value
        .trim()
        .parse()
        .map_err(|_| Error::config(name, value, "expected a positive integer"))?;
    if parsed <= T::default() {
        return Err(Error::config(name, value, "must be at least 1"));
    }
    Ok(parsed)
}

/// Parse a boolean flag the way the sync scripts spell them.
pub fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        _ => Err(Error::config(name, value, "expected true/false")),
    }
}
