//! Rendering options.

/// Notion's language tag for unhighlighted code.
pub const PLAIN_TEXT_LANGUAGE: &str = "plain text";

/// Options shared by the Markdown and Notion renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Escape Markdown control characters in flowing text
    pub escape_special_chars: bool,

    /// Clamp heading levels to this maximum (1-3)
    pub max_heading_level: u8,

    /// Language tag for preformatted blocks rendered as Notion code
    pub code_language: String,

    /// URL of the source PDF, embedded ahead of the content when set
    pub pdf_url: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            escape_special_chars: true,
            max_heading_level: 3,
            code_language: PLAIN_TEXT_LANGUAGE.to_string(),
            pdf_url: None,
        }
    }
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable Markdown escaping.
    pub fn with_escape(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }

    /// Set the maximum heading level.
    pub fn with_max_heading_level(mut self, level: u8) -> Self {
        self.max_heading_level = level.clamp(1, 3);
        self
    }

    /// Set the language of Notion code blocks.
    pub fn with_code_language(mut self, language: impl Into<String>) -> Self {
        self.code_language = language.into();
        self
    }

    /// Embed the source PDF ahead of the content.
    pub fn with_pdf_url(mut self, url: impl Into<String>) -> Self {
        self.pdf_url = Some(url.into());
        self
    }

    /// Effective level for a heading block.
    pub fn heading_level(&self, level: Option<u8>) -> u8 {
        level.unwrap_or(1).clamp(1, self.max_heading_level.clamp(1, 3))
    }
}
