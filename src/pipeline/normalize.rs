//! Canonical text for equations, citations and code.
//!
//! Dividers lose their rule characters; every other kind has its whitespace
//! runs collapsed.

use regex::Regex;

use crate::model::{BlockKind, Paragraph, TextFormat};

use super::cleanup::collapse_whitespace;

/// Rewrites paragraph text into its canonical form per kind.
#[derive(Debug, Clone)]
pub struct Normalizer {
    equation_number_re: Regex,
    citation_marker_re: Regex,
}

impl Normalizer {
    /// Create a normalizer.
    pub fn new() -> Self {
        Self {
            equation_number_re: Regex::new(r"^(.*?)\s*\((\d{1,3}(?:\.\d{1,3})?[a-z]?)\)$").unwrap(),
            citation_marker_re: Regex::new(
                r"^(?:\[\s*(\d{1,4})\s*\]|\(\s*(\d{1,4})\s*\)|(\d{1,4})\.(?:\s|$))\s*",
            )
            .unwrap(),
        }
    }

    /// Normalize every paragraph in place.
    pub fn normalize(&self, paragraphs: &mut [Paragraph]) {
        for para in paragraphs.iter_mut() {
            self.normalize_one(para);
        }
    }

    /// Normalize one paragraph according to its kind.
    pub fn normalize_one(&self, para: &mut Paragraph) {
        match para.kind_or_default() {
            BlockKind::Equation => {
                para.text = self.normalize_equation(&para.text);
                para.format = TextFormat::Preformatted;
            }
            BlockKind::Citation => {
                para.text = self.normalize_citation(&para.text);
            }
            BlockKind::Code => {
                para.text = code_text(para);
                para.format = TextFormat::Preformatted;
            }
            BlockKind::Divider => {
                para.text.clear();
            }
            _ => {
                para.text = collapse_whitespace(&para.text);
            }
        }
    }

    /// Collapse whitespace and separate a trailing `(N)` by one space.
    pub fn normalize_equation(&self, text: &str) -> String {
        let collapsed = collapse_whitespace(text);
        match self.equation_number_re.captures(&collapsed) {
            Some(caps) => {
                let body = caps.get(1).map_or("", |m| m.as_str());
                let number = caps.get(2).map_or("", |m| m.as_str());
                if body.is_empty() {
                    format!("({})", number)
                } else {
                    format!("{} ({})", body, number)
                }
            }
            None => collapsed,
        }
    }

    /// Collapse whitespace and rewrite a leading entry marker to `[N] `.
    pub fn normalize_citation(&self, text: &str) -> String {
        let collapsed = collapse_whitespace(text);
        let Some(caps) = self.citation_marker_re.captures(&collapsed) else {
            return collapsed;
        };
        let number = caps
            .get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map_or("", |m| m.as_str());
        let rest = &collapsed[caps.get(0).map_or(0, |m| m.end())..];
        if rest.is_empty() {
            format!("[{}]", number)
        } else {
            format!("[{}] {}", number, rest)
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Code keeps one line per source line; blank edges are dropped.
fn code_text(para: &Paragraph) -> String {
    let lines: Vec<&str> = para.lines.iter().map(|l| l.trim_end()).collect();
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => collapse_whitespace(&para.text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para(lines: &[&str], kind: BlockKind) -> Paragraph {
        let mut p = Paragraph::from_lines(lines.iter().map(|l| l.to_string()).collect(), 0);
        p.kind = Some(kind);
        p
    }

    #[test]
    fn test_equation_number_spacing() {
        let n = Normalizer::new();
        assert_eq!(n.normalize_equation("E  =  mc^2(1)"), "E = mc^2 (1)");
        assert_eq!(n.normalize_equation("a + b\n= c     (12)"), "a + b = c (12)");
        assert_eq!(n.normalize_equation("x = y"), "x = y");
        assert_eq!(n.normalize_equation("(3)"), "(3)");
    }

    #[test]
    fn test_equation_is_preformatted() {
        let n = Normalizer::new();
        let mut p = para(&["α =  β + γ", "(2)"], BlockKind::Equation);
        n.normalize_one(&mut p);
        assert_eq!(p.text, "α = β + γ (2)");
        assert_eq!(p.format, TextFormat::Preformatted);
    }

    #[test]
    fn test_citation_markers() {
        let n = Normalizer::new();
        assert_eq!(
            n.normalize_citation("[ 12 ]  Smith, J.   Deep   nets. 2020."),
            "[12] Smith, J. Deep nets. 2020."
        );
        assert_eq!(n.normalize_citation("3. Doe A. Title. 2019."), "[3] Doe A. Title. 2019.");
        assert_eq!(n.normalize_citation("(7) Lee K. Work. 2018."), "[7] Lee K. Work. 2018.");
        assert_eq!(n.normalize_citation("[4]Kim H. Paper. 2021."), "[4] Kim H. Paper. 2021.");
        assert_eq!(n.normalize_citation("Smith J. No marker. 2020."), "Smith J. No marker. 2020.");
    }

    #[test]
    fn test_citation_stays_plain() {
        let n = Normalizer::new();
        let mut p = para(&["[1] Smith J.", "Title.  2020."], BlockKind::Citation);
        n.normalize_one(&mut p);
        assert_eq!(p.text, "[1] Smith J. Title. 2020.");
        assert_eq!(p.format, TextFormat::Plain);
    }

    #[test]
    fn test_code_keeps_lines() {
        let n = Normalizer::new();
        let mut p = para(&["", "fn main() {", "    run();", "}", " "], BlockKind::Code);
        n.normalize_one(&mut p);
        assert_eq!(p.text, "fn main() {\n    run();\n}");
        assert_eq!(p.format, TextFormat::Preformatted);
    }

    #[test]
    fn test_other_kinds_collapse_whitespace() {
        let n = Normalizer::new();
        let mut p = para(&["Some   body", "text  here"], BlockKind::Paragraph);
        n.normalize_one(&mut p);
        assert_eq!(p.text, "Some body text here");

        let mut p = para(&["  Introduction "], BlockKind::Heading);
        n.normalize_one(&mut p);
        assert_eq!(p.text, "Introduction");
    }

    #[test]
    fn test_divider_rule_text_is_dropped() {
        let n = Normalizer::new();
        let mut p = para(&["———"], BlockKind::Divider);
        n.normalize_one(&mut p);
        assert!(p.text.is_empty());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let n = Normalizer::new();
        let once = n.normalize_citation("(5)  Park S. Study. 2017.");
        assert_eq!(n.normalize_citation(&once), once);
        let once = n.normalize_equation("y=ax+b   (4)");
        assert_eq!(n.normalize_equation(&once), once);
    }
}
