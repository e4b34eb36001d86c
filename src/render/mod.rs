//! Rendering structured documents for output and for the destination API.

mod json;
mod markdown;
pub mod notion;
mod options;

pub use json::{from_json, to_json, JsonFormat};
pub use markdown::{to_markdown, MarkdownRenderer};
pub use notion::{batches, page_blocks, to_notion_blocks};
pub use options::{RenderOptions, PLAIN_TEXT_LANGUAGE};
