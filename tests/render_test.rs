//! Integration tests for Markdown, JSON and Notion rendering.

mod common;

use common::{paper_page, sentence_page};
use paperblocks::render::{self, notion};
use paperblocks::{
    structure_pages, structure_pages_with_options, JsonFormat, PageRecord, PipelineOptions,
    RenderOptions,
};

#[test]
fn test_markdown_preview() {
    let doc = structure_pages(&[paper_page(0)]);
    let md = render::to_markdown(&doc, &RenderOptions::new()).unwrap();

    assert!(md.starts_with("## 1. Introduction"));
    assert!(md.contains("> Figure 1: Overview of the system."));
    assert!(md.ends_with("```\nE = mc^2 (1)\n```"));
}

#[test]
fn test_json_round_trip() {
    let doc = structure_pages(&[paper_page(0), sentence_page(1)]);
    let json = render::to_json(&doc, JsonFormat::Pretty).unwrap();
    assert!(json.contains("\"kind\": \"caption\""));
    assert_eq!(render::from_json(&json).unwrap(), doc);
}

#[test]
fn test_notion_block_types() {
    let doc = structure_pages(&[paper_page(0)]);
    let blocks = render::to_notion_blocks(&doc, &RenderOptions::new()).unwrap();

    let types: Vec<&str> = blocks
        .iter()
        .map(|b| b["type"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["heading_2", "paragraph", "quote", "paragraph", "code"]);
    assert_eq!(blocks[4]["code"]["language"], "plain text");
    assert_eq!(
        blocks[2]["quote"]["rich_text"][0]["text"]["content"],
        "Figure 1: Overview of the system."
    );
}

#[test]
fn test_page_blocks_with_embed() {
    let doc = structure_pages(&[sentence_page(0)]);
    let options = RenderOptions::new().with_pdf_url("https://drive.example.com/paper.pdf");
    let blocks = render::page_blocks(&doc, &options).unwrap();

    assert_eq!(blocks.len(), 4);
    assert_eq!(blocks[0]["type"], "embed");
    assert_eq!(blocks[0]["embed"]["url"], "https://drive.example.com/paper.pdf");
    assert_eq!(blocks[1]["type"], "divider");
    assert_eq!(blocks[2]["type"], "heading_2");
    assert_eq!(
        blocks[2]["heading_2"]["rich_text"][0]["text"]["content"],
        notion::EXTRACTED_CONTENT_HEADING
    );
}

#[test]
fn test_truncated_document_batches() {
    let pages: Vec<PageRecord> = (0..150).map(sentence_page).collect();
    let doc =
        structure_pages_with_options(&pages, PipelineOptions::new().with_max_pages(120)).unwrap();
    let blocks = render::page_blocks(&doc, &RenderOptions::new()).unwrap();

    // divider + heading + 120 sentences + note divider + note paragraph
    assert_eq!(blocks.len(), 124);
    let last = blocks.last().unwrap();
    assert_eq!(
        last["paragraph"]["rich_text"][0]["text"]["content"],
        "Extraction truncated: processed 120 of 150 pages"
    );

    let sizes: Vec<usize> = render::batches(&blocks).map(|b| b.len()).collect();
    assert_eq!(sizes, vec![100, 24]);
}
