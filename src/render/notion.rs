//! Notion block payloads.
//!
//! Produces the JSON objects accepted by Notion's "append block children"
//! endpoint. Sending them is left to the caller.

use serde_json::{json, Map, Value};

use crate::error::{Error, Result};
use crate::model::{BlockKind, ContentBlock, Document};

use super::RenderOptions;

/// Maximum characters in one rich-text object.
pub const NOTION_TEXT_LIMIT: usize = 2000;

/// Maximum children per append request.
pub const NOTION_BATCH_SIZE: usize = 100;

/// Heading placed between the embed and the extracted blocks.
pub const EXTRACTED_CONTENT_HEADING: &str = "📄 Extracted Content";

/// Convert every block of a document.
///
/// Fails when a block's text exceeds [`NOTION_TEXT_LIMIT`], which only
/// happens if the pipeline ran with a larger block limit.
pub fn to_notion_blocks(doc: &Document, options: &RenderOptions) -> Result<Vec<Value>> {
    let mut out = Vec::with_capacity(doc.blocks.len());
    for block in &doc.blocks {
        out.extend(block_to_notion(block, options)?);
    }
    Ok(out)
}

/// Blocks for a paper page: an optional PDF embed, a divider, the
/// "Extracted Content" heading, then the document blocks.
pub fn page_blocks(doc: &Document, options: &RenderOptions) -> Result<Vec<Value>> {
    let mut out = Vec::new();
    if let Some(url) = options.pdf_url.as_deref() {
        out.push(embed(url));
    }
    out.push(divider());
    out.push(heading(EXTRACTED_CONTENT_HEADING, 2));
    out.extend(to_notion_blocks(doc, options)?);
    Ok(out)
}

/// Split blocks into append requests of at most [`NOTION_BATCH_SIZE`].
pub fn batches(blocks: &[Value]) -> impl Iterator<Item = &[Value]> {
    blocks.chunks(NOTION_BATCH_SIZE)
}

/// Convert one block. Dividers carrying a note become two blocks.
pub fn block_to_notion(block: &ContentBlock, options: &RenderOptions) -> Result<Vec<Value>> {
    let chars = block.char_count();
    if chars > NOTION_TEXT_LIMIT {
        return Err(Error::Render(format!(
            "block {} has {} characters, Notion accepts at most {}",
            block.order, chars, NOTION_TEXT_LIMIT
        )));
    }

    let value = match block.kind {
        BlockKind::Divider => {
            if block.text.trim().is_empty() {
                return Ok(vec![divider()]);
            }
            return Ok(vec![divider(), italic_paragraph(&block.text)]);
        }
        _ if block.is_preformatted() => code(&block.text, &options.code_language),
        BlockKind::Heading => heading(&block.text, options.heading_level(block.level)),
        BlockKind::Caption => typed("quote", &block.text),
        BlockKind::Equation | BlockKind::Code => code(&block.text, &options.code_language),
        BlockKind::Paragraph | BlockKind::Citation => typed("paragraph", &block.text),
    };
    Ok(vec![value])
}

fn rich_text(text: &str) -> Value {
    json!([{ "type": "text", "text": { "content": text } }])
}

fn typed(block_type: &str, text: &str) -> Value {
    let mut map = Map::new();
    map.insert("object".to_string(), json!("block"));
    map.insert("type".to_string(), json!(block_type));
    map.insert(block_type.to_string(), json!({ "rich_text": rich_text(text) }));
    Value::Object(map)
}

fn heading(text: &str, level: u8) -> Value {
    typed(&format!("heading_{}", level.clamp(1, 3)), text)
}

fn code(text: &str, language: &str) -> Value {
    json!({
        "object": "block",
        "type": "code",
        "code": { "rich_text": rich_text(text), "language": language }
    })
}

fn divider() -> Value {
    json!({ "object": "block", "type": "divider", "divider": {} })
}

fn italic_paragraph(text: &str) -> Value {
    json!({
        "object": "block",
        "type": "paragraph",
        "paragraph": {
            "rich_text": [{
                "type": "text",
                "text": { "content": text },
                "annotations": { "italic": true }
            }]
        }
    })
}

fn embed(url: &str) -> Value {
    json!({ "object": "block", "type": "embed", "embed": { "url": url } })
}
