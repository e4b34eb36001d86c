//! Content classification.
//!
//! Each paragraph gets exactly one [`BlockKind`] by first-matching
//! precedence: heading, citation, equation, code, caption, divider,
//! paragraph. Captions and section titles often carry numbers that look like
//! equation markers, so the order is fixed and never negotiated per input.

use regex::Regex;

use crate::model::{BlockKind, Paragraph};

use super::options::Thresholds;

/// Assigns semantic types to paragraphs.
#[derive(Debug, Clone)]
pub struct Classifier {
    thresholds: Thresholds,
    section_number_re: Regex,
    section_name_re: Regex,
    references_re: Regex,
    references_end_re: Regex,
    reference_entry_re: Regex,
    equation_number_re: Regex,
    caption_re: Regex,
    code_line_re: Regex,
    page_number_re: Regex,
    identifier_re: Regex,
    venue_re: Regex,
    year_re: Regex,
}

impl Classifier {
    /// Create a classifier with the given thresholds.
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            section_number_re: Regex::new(r"^(?:\d{1,2}(?:\.\d{1,2})*\.?|[IVXLC]{1,6}\.|[A-Z]\.)\s+\p{Lu}")
                .unwrap(),
            section_name_re: Regex::new(
                r"(?i)^(?:\d{1,2}(?:\.\d{1,2})*\.?\s+)?(?:abstract|introduction|related\s+work|background|preliminaries|method|methods|methodology|approach|experiments?|evaluation|results|discussion|limitations|future\s+work|conclusions?|summary|acknowledge?ments?|references|bibliography|works\s+cited|appendix(?:\s+\w+)?)\s*:?$",
            )
            .unwrap(),
            references_re: Regex::new(
                r"(?i)^(?:\d{1,2}\.?\s+)?(?:references|bibliography|works\s+cited|literature\s+cited)\s*:?$",
            )
            .unwrap(),
            references_end_re: Regex::new(
                r"(?i)^(?:[A-Z\d]{1,2}\.?\s+)?(?:appendix|appendices|acknowledge?ments?|supplementary|ethics\s+statement|ethical\s+considerations|broader\s+impact|checklist)",
            )
            .unwrap(),
            reference_entry_re: Regex::new(
                r"^\s*(?:\[\s*\d{1,4}\s*\]|\(\d{1,4}\)|\d{1,4}\.)\s*\p{Lu}[\p{L}'’\-]*.*\b(?:1[89]|20)\d{2}[a-z]?\b",
            )
            .unwrap(),
            equation_number_re: Regex::new(r"\(\d{1,3}(?:\.\d{1,3})?[a-z]?\)\s*$").unwrap(),
            caption_re: Regex::new(r"(?i)^(?:figure|fig\.?|table)\s*(?:\d+|[IVXLC]+\b)").unwrap(),
            code_line_re: Regex::new(
                r"(?:[;{}]\s*$|^\s*(?:def|fn|for|while|if|else|return|class|import|from|let|var|const|int|void|public|private|#include|print)\b|^\s*(?://|#|/\*)|=\s*[\w.]+\()",
            )
            .unwrap(),
            page_number_re: Regex::new(r"^\d{1,4}$").unwrap(),
            identifier_re: Regex::new(r"(?i)\b(?:doi|isbn|issn)\b\s*:|\bdoi\.org/").unwrap(),
            venue_re: Regex::new(r"(?i)\b(?:acm|ieee|uist|usenix|chi)\b").unwrap(),
            year_re: Regex::new(r"\b(?:19|20)\d{2}\b").unwrap(),
        }
    }

    /// Classify a page-ordered paragraph sequence in place.
    ///
    /// Tracks whether the scan is inside a references section: a references
    /// heading opens it, an appendix-like heading closes it.
    pub fn classify(&self, paragraphs: &mut [Paragraph]) {
        let mut in_references = false;

        for para in paragraphs.iter_mut() {
            let kind = self.classify_one(para, in_references);

            if kind == BlockKind::Heading {
                let text = para.text.trim();
                if self.references_re.is_match(text) {
                    in_references = true;
                } else if in_references && self.references_end_re.is_match(text) {
                    in_references = false;
                }
            }
        }

        log::debug!(
            "Classified {} paragraphs: {}",
            paragraphs.len(),
            BlockKind::ALL
                .iter()
                .map(|k| format!(
                    "{}={}",
                    k,
                    paragraphs.iter().filter(|p| p.kind == Some(*k)).count()
                ))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    /// Classify one paragraph, recording the kind and the signals later
    /// stages consult.
    pub fn classify_one(&self, para: &mut Paragraph, in_references: bool) -> BlockKind {
        let text = para.text.trim().to_string();
        para.in_references = in_references;
        para.heading_signal = self.has_heading_signal(para, &text);

        let kind = if self.is_heading(para, &text) {
            para.level = Some(self.heading_level(para, &text));
            BlockKind::Heading
        } else if (in_references && !is_divider_text(&text))
            || self.reference_entry_re.is_match(&text)
        {
            BlockKind::Citation
        } else if self.is_equation(para, &text) {
            BlockKind::Equation
        } else if self.is_code(para) {
            BlockKind::Code
        } else if self.is_caption_text(&text) {
            BlockKind::Caption
        } else if is_divider_text(&text) {
            BlockKind::Divider
        } else {
            BlockKind::Paragraph
        };

        para.kind = Some(kind);
        para.boilerplate =
            kind == BlockKind::Paragraph && !in_references && self.is_boilerplate(&text);
        kind
    }

    /// Whether text looks like running page furniture: a bare page number,
    /// a permission notice, a DOI/ISBN line or a venue header.
    pub fn is_boilerplate(&self, text: &str) -> bool {
        let text = text.trim();
        if self.page_number_re.is_match(text) {
            return true;
        }

        let lower = text.to_lowercase();
        if lower.contains("permission")
            && (lower.contains("make digital") || lower.contains("copyright"))
        {
            return true;
        }

        let words = text.split_whitespace().count();
        if words > BOILERPLATE_MAX_WORDS {
            return false;
        }
        self.identifier_re.is_match(text)
            || (self.venue_re.is_match(text) && self.year_re.is_match(text))
    }

    /// Whether text starts with a figure or table marker.
    pub fn is_caption_text(&self, text: &str) -> bool {
        self.caption_re.is_match(text.trim())
    }

    fn has_heading_signal(&self, para: &Paragraph, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let larger = para.font_ratio() >= self.thresholds.heading_font_ratio;
        let section = self.is_section_title(text);
        let bold = para.is_bold && !self.is_caption_text(text);
        larger || section || bold
    }

    fn is_section_title(&self, text: &str) -> bool {
        self.section_name_re.is_match(text)
            || (self.section_number_re.is_match(text) && !text.ends_with('.'))
    }

    fn is_heading(&self, para: &Paragraph, text: &str) -> bool {
        let words = text.split_whitespace().count();
        words > 0 && words <= self.thresholds.heading_max_words && para.heading_signal
    }

    fn heading_level(&self, para: &Paragraph, text: &str) -> u8 {
        let ratio = para.font_ratio();
        if ratio >= 1.6 {
            1
        } else if ratio >= 1.25 {
            2
        } else if self.section_number_re.is_match(text)
            && !text
                .split_whitespace()
                .next()
                .is_some_and(|n| n.trim_end_matches('.').contains('.'))
        {
            2
        } else {
            3
        }
    }

    fn is_equation(&self, para: &Paragraph, text: &str) -> bool {
        let visible = text.chars().filter(|c| !c.is_whitespace()).count();
        if visible < self.thresholds.equation_min_chars {
            return false;
        }

        let symbols = text.chars().filter(|c| is_math_symbol(*c)).count()
            + para.superscript_chars.min(visible);
        let density = symbols as f32 / visible as f32;
        if density >= self.thresholds.equation_symbol_density {
            return true;
        }

        self.equation_number_re.is_match(text) && text.chars().any(is_relation)
    }

    fn is_code(&self, para: &Paragraph) -> bool {
        if para.monospace_ratio >= self.thresholds.code_monospace_ratio {
            return true;
        }

        if para.indent() < self.thresholds.code_indent || para.lines.len() < 2 {
            return false;
        }
        let code_lines = para
            .lines
            .iter()
            .filter(|l| self.code_line_re.is_match(l))
            .count();
        code_lines * 2 > para.lines.len()
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}

/// Identifier and venue lines with more words are treated as prose.
const BOILERPLATE_MAX_WORDS: usize = 15;

/// Relational operators that make a trailing "(N)" an equation number.
fn is_relation(c: char) -> bool {
    matches!(
        c,
        '=' | '<' | '>' | '≤' | '≥' | '≠' | '≈' | '≡' | '∝' | '∈' | '⊂' | '⊆' | '→' | '⇒' | '∼'
    )
}

/// Operators, Greek letters, and super/subscript characters.
fn is_math_symbol(c: char) -> bool {
    let code = c as u32;
    matches!(
        c,
        '=' | '+'
            | '<'
            | '>'
            | '^'
            | '_'
            | '/'
            | '*'
            | '|'
            | '~'
            | '−'
            | '±'
            | '∓'
            | '×'
            | '÷'
            | '·'
            | '∙'
            | '√'
            | '∞'
            | '′'
            | '″'
            | '‖'
            | '¬'
            | '¹'
            | '²'
            | '³'
    ) || (0x0391..=0x03C9).contains(&code) // Greek letters
        || (0x03D0..=0x03F6).contains(&code) // Greek symbols (ϑ, ϕ, ϵ, ...)
        || (0x2070..=0x209F).contains(&code) // superscripts and subscripts
        || (0x2100..=0x214F).contains(&code) // letterlike (ℝ, ℕ, ℓ)
        || (0x2190..=0x21FF).contains(&code) // arrows
        || (0x2200..=0x22FF).contains(&code) // mathematical operators
        || (0x27C0..=0x27EF).contains(&code)
        || (0x2980..=0x2AFF).contains(&code)
        || (0x1D400..=0x1D7FF).contains(&code) // mathematical alphanumerics
}

/// Empty text, or a run of rule characters.
fn is_divider_text(text: &str) -> bool {
    let visible: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    visible.is_empty()
        || (visible.len() >= 3
            && visible
                .iter()
                .all(|c| matches!(c, '-' | '_' | '=' | '*' | '~' | '.' | '·' | '•' | '—' | '–' | '─' | '━' | '═')))
}
