//! Markdown preview rendering.

use crate::error::Result;
use crate::model::{BlockKind, ContentBlock, Document};

use super::RenderOptions;

/// Convert a document to Markdown.
pub fn to_markdown(doc: &Document, options: &RenderOptions) -> Result<String> {
    let renderer = MarkdownRenderer::new(options.clone());
    renderer.render(doc)
}

/// Markdown renderer.
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a document to Markdown.
    pub fn render(&self, doc: &Document) -> Result<String> {
        let mut output = String::new();
        for block in &doc.blocks {
            self.render_block(&mut output, block);
        }
        Ok(output.trim().to_string())
    }

    fn render_block(&self, output: &mut String, block: &ContentBlock) {
        if block.is_preformatted() {
            self.render_fenced(output, &block.text);
            return;
        }

        match block.kind {
            BlockKind::Heading => {
                let level = self.options.heading_level(block.level);
                output.push_str(&"#".repeat(level as usize));
                output.push(' ');
                output.push_str(&self.escape(&block.text));
                output.push_str("\n\n");
            }
            BlockKind::Caption => {
                output.push_str("> ");
                output.push_str(&self.escape(&block.text));
                output.push_str("\n\n");
            }
            BlockKind::Divider => {
                output.push_str("---\n\n");
                if !block.text.trim().is_empty() {
                    output.push_str(&format!("*{}*\n\n", self.escape(&block.text)));
                }
            }
            BlockKind::Equation | BlockKind::Code => self.render_fenced(output, &block.text),
            BlockKind::Paragraph | BlockKind::Citation => {
                if block.text.is_empty() {
                    return;
                }
                output.push_str(&self.escape(&block.text));
                output.push_str("\n\n");
            }
        }
    }

    fn render_fenced(&self, output: &mut String, text: &str) {
        let fence = if text.contains("```") { "~~~" } else { "```" };
        output.push_str(fence);
        output.push('\n');
        output.push_str(text);
        output.push('\n');
        output.push_str(fence);
        output.push_str("\n\n");
    }

    fn escape(&self, text: &str) -> String {
        if self.options.escape_special_chars {
            escape_markdown(text)
        } else {
            text.to_string()
        }
    }
}

/// Escape special Markdown characters.
/// Only characters that could be misinterpreted as inline syntax are
/// escaped, so extracted text stays readable.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            // Core formatting that must be escaped
            '\\' | '`' | '*' | '_' |
            // Brackets for links/images, pipe for tables
            '[' | ']' | '|' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}
