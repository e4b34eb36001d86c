//! Caption consolidation.
//!
//! Captions are often broken into several paragraphs by the layout grouper
//! (a caption label line followed by its wrapped description). This stage
//! folds the short, unmarked paragraphs that trail a caption back into it.

use crate::model::{BlockKind, Paragraph};

use super::options::Thresholds;

/// Merges caption continuation paragraphs into their caption.
#[derive(Debug, Clone)]
pub struct CaptionConsolidator {
    max_follow_words: usize,
}

impl CaptionConsolidator {
    /// Create a consolidator with the given thresholds.
    pub fn new(thresholds: &Thresholds) -> Self {
        Self {
            max_follow_words: thresholds.caption_follow_max_words,
        }
    }

    /// Merge followers into captions, returning the shortened sequence.
    ///
    /// Scans by index: at each caption, looks one paragraph ahead and keeps
    /// absorbing while the lookahead qualifies as a continuation.
    pub fn consolidate(&self, paragraphs: Vec<Paragraph>) -> Vec<Paragraph> {
        let mut slots: Vec<Option<Paragraph>> = paragraphs.into_iter().map(Some).collect();
        let mut merged = 0usize;
        let mut i = 0;

        while i < slots.len() {
            let is_caption = slots[i]
                .as_ref()
                .is_some_and(|p| p.kind == Some(BlockKind::Caption));
            if !is_caption {
                i += 1;
                continue;
            }

            let mut next = i + 1;
            while next < slots.len() {
                let follows = match (&slots[i], &slots[next]) {
                    (Some(caption), Some(candidate)) => self.is_continuation(caption, candidate),
                    _ => false,
                };
                if !follows {
                    break;
                }
                if let (Some(candidate), Some(caption)) = (slots[next].take(), slots[i].as_mut()) {
                    caption.absorb(candidate);
                    merged += 1;
                }
                next += 1;
            }
            i = next;
        }

        if merged > 0 {
            log::debug!("Merged {} caption continuation paragraph(s)", merged);
        }

        slots.into_iter().flatten().collect()
    }

    /// Whether `candidate` continues `caption`.
    fn is_continuation(&self, caption: &Paragraph, candidate: &Paragraph) -> bool {
        candidate.kind == Some(BlockKind::Paragraph)
            && !candidate.heading_signal
            && !candidate.in_references
            && candidate.word_count() <= self.max_follow_words
            && candidate.first_page() <= caption.first_page() + 1
    }
}

impl Default for CaptionConsolidator {
    fn default() -> Self {
        Self::new(&Thresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para(text: &str, kind: BlockKind, page: u32) -> Paragraph {
        let mut p = Paragraph::with_text(text).on_page(page);
        p.kind = Some(kind);
        p
    }

    #[test]
    fn test_merges_short_continuation() {
        let paras = vec![
            para("Figure 1: Overview of", BlockKind::Caption, 0),
            para("the system.", BlockKind::Paragraph, 0),
        ];
        let out = CaptionConsolidator::default().consolidate(paras);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "Figure 1: Overview of the system.");
        assert_eq!(out[0].kind, Some(BlockKind::Caption));
    }

    #[test]
    fn test_merges_several_followers_across_page() {
        let paras = vec![
            para("Table 1: Accuracy", BlockKind::Caption, 2),
            para("on the held-out", BlockKind::Paragraph, 2),
            para("test split.", BlockKind::Paragraph, 3),
            para("Discussion", BlockKind::Heading, 3),
        ];
        let out = CaptionConsolidator::default().consolidate(paras);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, "Table 1: Accuracy on the held-out test split.");
        assert_eq!(out[0].pages.iter().copied().collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(out[1].kind, Some(BlockKind::Heading));
    }

    #[test]
    fn test_stops_at_typed_paragraph() {
        let paras = vec![
            para("Figure 2: Loss", BlockKind::Caption, 0),
            para("x = y + 1 (2)", BlockKind::Equation, 0),
            para("short tail", BlockKind::Paragraph, 0),
        ];
        let out = CaptionConsolidator::default().consolidate(paras);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].text, "Figure 2: Loss");
    }

    #[test]
    fn test_stops_at_heading_signal_and_long_text() {
        let mut bold = para("Setup", BlockKind::Paragraph, 0);
        bold.heading_signal = true;
        let paras = vec![para("Figure 3: A", BlockKind::Caption, 0), bold];
        let out = CaptionConsolidator::default().consolidate(paras);
        assert_eq!(out.len(), 2);

        let long = "word ".repeat(40);
        let paras = vec![
            para("Figure 3: A", BlockKind::Caption, 0),
            para(long.trim(), BlockKind::Paragraph, 0),
        ];
        let out = CaptionConsolidator::default().consolidate(paras);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_does_not_merge_beyond_next_page() {
        let paras = vec![
            para("Figure 4: Map", BlockKind::Caption, 1),
            para("far away text", BlockKind::Paragraph, 3),
        ];
        let out = CaptionConsolidator::default().consolidate(paras);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_does_not_merge_into_references() {
        let mut cited = para("Smith 2020", BlockKind::Paragraph, 0);
        cited.in_references = true;
        let paras = vec![para("Figure 5: End", BlockKind::Caption, 0), cited];
        let out = CaptionConsolidator::default().consolidate(paras);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_consecutive_captions_stay_separate() {
        let paras = vec![
            para("Figure 6: Left", BlockKind::Caption, 0),
            para("Figure 7: Right", BlockKind::Caption, 0),
            para("panel detail", BlockKind::Paragraph, 0),
        ];
        let out = CaptionConsolidator::default().consolidate(paras);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, "Figure 6: Left");
        assert_eq!(out[1].text, "Figure 7: Right panel detail");
    }
}
