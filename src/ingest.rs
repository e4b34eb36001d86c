//! Span ingestion.
//!
//! Page records arrive either as flat span lists or in PyMuPDF's
//! `page.get_text("dict")` shape. Both are accepted from a JSON array or from
//! JSON lines (one page per line).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{BBox, Span};

/// Font size PyMuPDF assumes when a span omits it.
const DICT_DEFAULT_FONT_SIZE: f32 = 12.0;

/// The spans of one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// 0-based page index
    pub page: u32,
    /// Text spans on the page
    #[serde(default)]
    pub spans: Vec<Span>,
}

impl PageRecord {
    /// Create a record, stamping every span with the page index and dropping
    /// spans whose geometry is unusable.
    pub fn new(page: u32, spans: Vec<Span>) -> Self {
        let before = spans.len();
        let spans: Vec<Span> = spans
            .into_iter()
            .filter(|s| is_finite_span(s))
            .map(|mut s| {
                s.page = page;
                s
            })
            .collect();
        if spans.len() < before {
            log::warn!(
                "Page {}: dropped {} span(s) with non-finite geometry",
                page + 1,
                before - spans.len()
            );
        }
        Self { page, spans }
    }

    /// Build a record from a PyMuPDF text dictionary.
    pub fn from_text_dict(page: u32, dict: &TextDict) -> Self {
        Self::new(page, dict.spans(page))
    }

    /// Number of spans.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Whether the page has no spans.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

fn is_finite_span(span: &Span) -> bool {
    let b = &span.bbox;
    span.font_size.is_finite()
        && b.x0.is_finite()
        && b.y0.is_finite()
        && b.x1.is_finite()
        && b.y1.is_finite()
}

/// PyMuPDF `page.get_text("dict")` output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextDict {
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub blocks: Vec<DictBlock>,
}

/// A text (`type` 0) or image (`type` 1) block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DictBlock {
    #[serde(rename = "type", default)]
    pub block_type: u32,
    #[serde(default)]
    pub lines: Vec<DictLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DictLine {
    #[serde(default)]
    pub spans: Vec<DictSpan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictSpan {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_dict_size")]
    pub size: f32,
    #[serde(default)]
    pub flags: u32,
    #[serde(default)]
    pub font: String,
    pub bbox: [f32; 4],
}

fn default_dict_size() -> f32 {
    DICT_DEFAULT_FONT_SIZE
}

impl DictSpan {
    /// Convert to a [`Span`], decoding the font flags. Font names also mark
    /// monospace, since many embedded fonts leave the flag unset.
    pub fn to_span(&self, page: u32) -> Span {
        let mut span =
            Span::new(self.text.clone(), page, self.size, BBox::from(self.bbox)).with_flags(self.flags);
        if is_monospace_font(&self.font) {
            span.is_monospace = true;
        }
        span
    }
}

impl TextDict {
    /// All spans of text blocks in extraction order. Image blocks are skipped.
    pub fn spans(&self, page: u32) -> Vec<Span> {
        self.blocks
            .iter()
            .filter(|b| b.block_type == 0)
            .flat_map(|b| b.lines.iter())
            .flat_map(|l| l.spans.iter())
            .map(|s| s.to_span(page))
            .collect()
    }
}

fn is_monospace_font(font: &str) -> bool {
    let lower = font.to_lowercase();
    ["mono", "courier", "consolas", "menlo", "cmtt"]
        .iter()
        .any(|name| lower.contains(name))
}

/// One input record before its shape is known.
#[derive(Debug, Deserialize)]
struct RawPage {
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    spans: Option<Vec<Span>>,
    #[serde(default)]
    blocks: Option<Vec<DictBlock>>,
}

impl RawPage {
    fn into_record(self, position: usize) -> PageRecord {
        let page = self
            .page
            .unwrap_or_else(|| u32::try_from(position).unwrap_or(u32::MAX));
        match (self.spans, self.blocks) {
            (Some(spans), _) => PageRecord::new(page, spans),
            (None, Some(blocks)) => PageRecord::from_text_dict(
                page,
                &TextDict {
                    blocks,
                    ..TextDict::default()
                },
            ),
            (None, None) => {
                log::warn!("Page {} has neither spans nor blocks", page + 1);
                PageRecord::new(page, Vec::new())
            }
        }
    }
}

/// Parse page records from a JSON array or JSON lines.
///
/// Records without a `page` field take their position as the page index.
/// The result is ordered by page index (stable for duplicates).
pub fn parse_pages(input: &str) -> Result<Vec<PageRecord>> {
    let trimmed = input.trim_start();
    let raw: Vec<RawPage> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed)?
    } else {
        let mut pages = Vec::new();
        for (idx, line) in input.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let page: RawPage = serde_json::from_str(line).map_err(|e| {
                Error::InvalidInput(format!("line {}: {}", idx + 1, e))
            })?;
            pages.push(page);
        }
        pages
    };

    let mut records: Vec<PageRecord> = raw
        .into_iter()
        .enumerate()
        .map(|(position, page)| page.into_record(position))
        .collect();

    if records.windows(2).any(|w| w[0].page > w[1].page) {
        log::debug!("Page records out of order, sorting by page index");
        records.sort_by_key(|r| r.page);
    }

    Ok(records)
}

/// Load page records from a file.
pub fn load_pages_file<P: AsRef<Path>>(path: P) -> Result<Vec<PageRecord>> {
    let content = fs::read_to_string(path.as_ref())?;
    let records = parse_pages(&content)?;
    log::debug!(
        "Loaded {} page record(s) from {}",
        records.len(),
        path.as_ref().display()
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dict_span_flags() {
        let span = DictSpan {
            text: "x".to_string(),
            size: 9.0,
            flags: 16 | 2 | 1,
            font: "Times-BoldItalic".to_string(),
            bbox: [1.0, 2.0, 3.0, 4.0],
        }
        .to_span(3);

        assert!(span.is_bold);
        assert!(span.is_italic);
        assert!(span.is_superscript);
        assert!(!span.is_monospace);
        assert_eq!(span.page, 3);
        assert_eq!(span.bbox, BBox::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn test_monospace_from_font_name() {
        let span = DictSpan {
            text: "let".to_string(),
            size: 9.0,
            flags: 0,
            font: "CourierNewPSMT".to_string(),
            bbox: [0.0, 0.0, 10.0, 10.0],
        }
        .to_span(0);
        assert!(span.is_monospace);
    }

    #[test]
    fn test_image_blocks_skipped() {
        let json = r#"{
            "width": 612, "height": 792,
            "blocks": [
                {"type": 1, "bbox": [0, 0, 10, 10]},
                {"type": 0, "lines": [{"spans": [
                    {"text": "Hello", "size": 10, "flags": 0, "font": "Times", "bbox": [10, 10, 40, 20]}
                ]}]}
            ]
        }"#;
        let dict: TextDict = serde_json::from_str(json).unwrap();
        let record = PageRecord::from_text_dict(0, &dict);
        assert_eq!(record.len(), 1);
        assert_eq!(record.spans[0].text, "Hello");
    }

    #[test]
    fn test_new_stamps_page_and_drops_bad_geometry() {
        let spans = vec![
            Span::new("ok", 9, 10.0, BBox::new(0.0, 0.0, 5.0, 5.0)),
            Span::new("bad", 0, 10.0, BBox::new(f32::NAN, 0.0, 5.0, 5.0)),
        ];
        let record = PageRecord::new(2, spans);
        assert_eq!(record.len(), 1);
        assert_eq!(record.spans[0].page, 2);
    }

    #[test]
    fn test_parse_json_lines_with_positions() {
        let input = concat!(
            r#"{"spans": [{"text": "a", "font_size": 10, "bbox": {"x0": 0, "y0": 0, "x1": 5, "y1": 10}}]}"#,
            "\n\n",
            r#"{"spans": []}"#,
            "\n"
        );
        let pages = parse_pages(input).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page, 0);
        assert_eq!(pages[1].page, 1);
        assert!(pages[1].is_empty());
    }

    #[test]
    fn test_parse_sorts_by_page() {
        let input = r#"[{"page": 2, "spans": []}, {"page": 0, "spans": []}]"#;
        let pages = parse_pages(input).unwrap();
        assert_eq!(pages[0].page, 0);
        assert_eq!(pages[1].page, 2);
    }

    #[test]
    fn test_parse_error_reports_line() {
        let err = parse_pages("{\"page\": 0}\n{not json}\n").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(err.to_string().contains("line 2"));
    }
}
