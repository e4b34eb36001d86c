//! Layout grouping: spans into lines, lines into paragraphs.
//!
//! Spans are grouped per page. Two-column pages are split at the gutter and
//! each column is read top to bottom before the next one, so paragraph order
//! follows reading order. Grouping is deterministic: every sort is stable and
//! uses a total order on coordinates.

use std::collections::BTreeMap;

use crate::model::{Paragraph, Span, DEFAULT_FONT_SIZE};

use super::cleanup::TextCleaner;
use super::options::Thresholds;

/// Upper bound on occupancy slices in gutter detection.
const MAX_COLUMN_SLICES: usize = 2048;

/// Advance width of a monospaced glyph relative to its font size.
const MONO_ADVANCE: f32 = 0.6;

/// A line of spans sharing a vertical band on one page.
#[derive(Debug, Clone)]
pub struct Line {
    /// The spans in this line, sorted by x position
    pub spans: Vec<Span>,
    /// Top of the line band
    pub top: f32,
    /// Bottom of the line band
    pub bottom: f32,
    /// Leftmost x position of visible text
    pub left: f32,
    /// Dominant font size (weighted by characters)
    pub font_size: f32,
}

impl Line {
    /// Create a line from spans.
    pub fn from_spans(mut spans: Vec<Span>) -> Self {
        spans.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));

        let top = spans.iter().map(|s| s.bbox.y0).fold(f32::INFINITY, f32::min);
        let bottom = spans
            .iter()
            .map(|s| s.bbox.y1)
            .fold(f32::NEG_INFINITY, f32::max);
        let left = spans
            .iter()
            .filter(|s| !s.is_blank())
            .map(|s| s.bbox.x0)
            .fold(f32::INFINITY, f32::min);
        let left = if left.is_finite() {
            left
        } else {
            spans.first().map(|s| s.bbox.x0).unwrap_or(0.0)
        };

        let total_chars: usize = spans.iter().map(|s| s.char_count()).sum();
        let weighted: f32 = spans
            .iter()
            .map(|s| s.font_size * s.char_count() as f32)
            .sum();
        let font_size = if total_chars > 0 {
            weighted / total_chars as f32
        } else {
            spans.first().map(|s| s.font_size).unwrap_or(DEFAULT_FONT_SIZE)
        };

        Self {
            spans,
            top: if top.is_finite() { top } else { 0.0 },
            bottom: if bottom.is_finite() { bottom } else { 0.0 },
            left,
            font_size,
        }
    }

    /// Combined text of all spans.
    ///
    /// A space is inserted between spans when their horizontal gap is wider
    /// than a fraction of the font size, except between CJK characters.
    pub fn text(&self, cleaner: &TextCleaner) -> String {
        let mut result = String::new();
        let mut prev: Option<&Span> = None;

        for span in &self.spans {
            let text = cleaner.clean(&span.text);
            if let Some(prev_span) = prev {
                let gap = span.bbox.x0 - prev_span.bbox.x1;
                let threshold = span.font_size.max(prev_span.font_size).max(1.0) * 0.15;
                let prev_last = result.chars().last();
                let curr_first = text.chars().next();
                let has_space = prev_last.is_some_and(char::is_whitespace)
                    || curr_first.is_some_and(char::is_whitespace);
                let both_cjk = prev_last.is_some_and(is_spaceless_script_char)
                    && curr_first.is_some_and(is_spaceless_script_char);
                if gap > threshold && !has_space && !both_cjk && !result.is_empty() {
                    result.push(' ');
                }
            }
            result.push_str(&text);
            prev = Some(span);
        }

        result.trim().to_string()
    }

    /// Line text with leading indentation rebuilt from the distance to
    /// `base_left`. Only monospaced lines get indentation.
    pub fn indented_text(&self, cleaner: &TextCleaner, base_left: f32) -> String {
        let text = self.text(cleaner);
        if text.is_empty() || !self.is_monospace() {
            return text;
        }
        let advance = (self.font_size * MONO_ADVANCE).max(1.0);
        let indent = ((self.left - base_left) / advance).round().clamp(0.0, 80.0) as usize;
        format!("{}{}", " ".repeat(indent), text)
    }

    /// Total characters in the line.
    pub fn char_count(&self) -> usize {
        self.spans.iter().map(|s| s.char_count()).sum()
    }

    /// Whether the line has no visible text.
    pub fn is_blank(&self) -> bool {
        self.spans.iter().all(|s| s.is_blank())
    }

    /// Check if the line is predominantly bold.
    pub fn is_bold(&self) -> bool {
        let bold_chars = self.chars_where(|s| s.is_bold);
        let total = self.visible_chars();
        total > 0 && bold_chars * 2 > total
    }

    /// Check if the line is predominantly monospaced.
    pub fn is_monospace(&self) -> bool {
        let mono_chars = self.chars_where(|s| s.is_monospace);
        let total = self.visible_chars();
        total > 0 && mono_chars * 2 > total
    }

    fn visible_chars(&self) -> usize {
        self.chars_where(|_| true)
    }

    fn chars_where(&self, pred: impl Fn(&Span) -> bool) -> usize {
        self.spans
            .iter()
            .filter(|s| pred(s))
            .map(|s| s.text.chars().filter(|c| !c.is_whitespace()).count())
            .sum()
    }

    fn center_y(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }
}

/// A detected column in the page layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Left boundary x coordinate
    pub left: f32,
    /// Right boundary x coordinate
    pub right: f32,
    /// Column index (0 = leftmost)
    pub index: usize,
}

impl Column {
    /// Check if an x coordinate falls within this column.
    pub fn contains(&self, x: f32) -> bool {
        x >= self.left && x <= self.right
    }

    /// Check if a span belongs to this column (by its horizontal center).
    pub fn contains_span(&self, span: &Span) -> bool {
        self.contains(span.bbox.center_x())
    }
}

/// Font statistics for one page.
#[derive(Debug, Clone, Default)]
pub struct FontStatistics {
    /// Body text font size (most common, weighted by characters)
    pub body_size: f32,
    /// Observed font sizes (tenths of a point) with character counts
    pub size_histogram: BTreeMap<i32, usize>,
}

impl FontStatistics {
    /// Build statistics from a page's spans.
    pub fn from_spans(spans: &[Span]) -> Self {
        let mut stats = Self::default();
        for span in spans.iter().filter(|s| !s.is_blank()) {
            stats.add_size(span.font_size, span.char_count());
        }
        stats.analyze();
        stats
    }

    /// Add a font size observation with a character weight.
    pub fn add_size(&mut self, size: f32, chars: usize) {
        let key = (size * 10.0).round() as i32;
        *self.size_histogram.entry(key).or_insert(0) += chars;
    }

    /// Calculate the body size. Ties go to the smaller size.
    pub fn analyze(&mut self) {
        let body = self
            .size_histogram
            .iter()
            .fold(None, |best: Option<(i32, usize)>, (&key, &count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((key, count)),
            });

        self.body_size = match body {
            Some((key, _)) if key > 0 => key as f32 / 10.0,
            _ => DEFAULT_FONT_SIZE,
        };
    }
}

/// Groups spans into paragraphs.
#[derive(Debug, Clone)]
pub struct LayoutGrouper {
    thresholds: Thresholds,
    cleaner: TextCleaner,
}

impl LayoutGrouper {
    /// Create a grouper with the given thresholds.
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            cleaner: TextCleaner::default(),
        }
    }

    /// Replace the text cleaner.
    pub fn with_cleaner(mut self, cleaner: TextCleaner) -> Self {
        self.cleaner = cleaner;
        self
    }

    /// Group one page's spans into ordered paragraphs.
    ///
    /// Every span lands in exactly one paragraph; a page without spans
    /// yields no paragraphs.
    pub fn group_page(&self, page: u32, spans: &[Span]) -> Vec<Paragraph> {
        if spans.is_empty() {
            return vec![];
        }

        let stats = FontStatistics::from_spans(spans);
        let columns = self.detect_columns(spans);

        log::debug!(
            "Page {}: {} spans, body size {:.1}, {} column(s)",
            page,
            spans.len(),
            stats.body_size,
            columns.len()
        );

        let mut column_spans: Vec<Vec<Span>> = vec![Vec::new(); columns.len()];
        for span in spans {
            let idx = columns
                .iter()
                .position(|c| c.contains_span(span))
                .unwrap_or(if span.bbox.center_x() < columns[0].left {
                    0
                } else {
                    columns.len() - 1
                });
            column_spans[idx].push(span.clone());
        }

        let mut paragraphs = Vec::new();
        for col_spans in column_spans {
            let lines = self.group_spans_into_lines(col_spans);
            paragraphs.extend(self.group_lines_into_paragraphs(lines, page, stats.body_size));
        }
        paragraphs
    }

    /// Detect columns based on a vertical gutter.
    ///
    /// Looks for the widest run of empty x-slices in the middle of the page.
    /// Returns one column unless a gutter separates two columns of
    /// reasonable width and span count.
    pub fn detect_columns(&self, spans: &[Span]) -> Vec<Column> {
        let visible: Vec<&Span> = spans.iter().filter(|s| !s.is_blank()).collect();

        let min_x = visible
            .iter()
            .map(|s| s.bbox.x0)
            .fold(f32::INFINITY, f32::min);
        let max_x = visible
            .iter()
            .map(|s| s.bbox.x1)
            .fold(f32::NEG_INFINITY, f32::max);

        let single = |min_x: f32, max_x: f32| {
            vec![Column {
                left: min_x - 10.0,
                right: max_x + 10.0,
                index: 0,
            }]
        };

        if !min_x.is_finite() || !max_x.is_finite() {
            return vec![Column {
                left: f32::NEG_INFINITY,
                right: f32::INFINITY,
                index: 0,
            }];
        }

        let min_width = self.thresholds.column_min_width;
        let page_width = max_x - min_x;
        if page_width < min_width * 2.0 + self.thresholds.column_gutter {
            return single(min_x, max_x);
        }

        let slice_width = (page_width / MAX_COLUMN_SLICES as f32).max(3.0);
        let num_slices = ((page_width / slice_width) as usize + 1).min(MAX_COLUMN_SLICES + 1);
        let mut occupancy = vec![0usize; num_slices];
        for span in &visible {
            let start = ((span.bbox.x0 - min_x) / slice_width) as usize;
            let end = ((span.bbox.x1 - min_x) / slice_width) as usize;
            for slot in occupancy
                .iter_mut()
                .take(end.min(num_slices - 1) + 1)
                .skip(start)
            {
                *slot += 1;
            }
        }

        // Widest empty run in the middle 70% of the page; ties go to the
        // run closest to the center.
        let search_start = num_slices * 15 / 100;
        let search_end = num_slices * 85 / 100;
        let center = num_slices / 2;
        let mut best: Option<(usize, usize)> = None;
        let mut run_start = None;

        for i in search_start..=search_end {
            let empty = i < search_end && occupancy[i] == 0;
            match (empty, run_start) {
                (true, None) => run_start = Some(i),
                (false, Some(start)) => {
                    let len = i - start;
                    let dist = (start + len / 2).abs_diff(center);
                    let better = match best {
                        None => true,
                        Some((b_start, b_len)) => {
                            len > b_len
                                || (len == b_len && dist < (b_start + b_len / 2).abs_diff(center))
                        }
                    };
                    if better {
                        best = Some((start, len));
                    }
                    run_start = None;
                }
                _ => {}
            }
        }

        let Some((gap_start, gap_len)) = best else {
            return single(min_x, max_x);
        };

        let gap_width = gap_len as f32 * slice_width;
        if gap_width < self.thresholds.column_gutter {
            log::debug!("Gap too small ({:.1}pt), treating as single column", gap_width);
            return single(min_x, max_x);
        }

        let gutter = min_x + (gap_start as f32 + gap_len as f32 / 2.0) * slice_width;
        if gutter - min_x < min_width || max_x - gutter < min_width {
            log::debug!("Column too narrow, treating as single column");
            return single(min_x, max_x);
        }

        let left_spans = visible
            .iter()
            .filter(|s| s.bbox.center_x() < gutter)
            .count();
        let right_spans = visible.len() - left_spans;
        let min_spans = (visible.len() / 10).max(2);
        if left_spans < min_spans || right_spans < min_spans {
            log::debug!("Spans too imbalanced, treating as single column");
            return single(min_x, max_x);
        }

        vec![
            Column {
                left: min_x - 10.0,
                right: gutter,
                index: 0,
            },
            Column {
                left: gutter,
                right: max_x + 10.0,
                index: 1,
            },
        ]
    }

    /// Group a column's spans into lines by vertical proximity.
    fn group_spans_into_lines(&self, mut spans: Vec<Span>) -> Vec<Line> {
        if spans.is_empty() {
            return vec![];
        }

        spans.sort_by(|a, b| {
            a.bbox
                .center_y()
                .total_cmp(&b.bbox.center_y())
                .then_with(|| a.bbox.x0.total_cmp(&b.bbox.x0))
        });

        let mut lines = Vec::new();
        let mut current: Vec<Span> = Vec::new();
        let mut band = (0.0f32, 0.0f32, 0.0f32); // (top, bottom, font size)

        for span in spans {
            if !current.is_empty() && !self.same_line(&span, band) {
                lines.push(Line::from_spans(std::mem::take(&mut current)));
            }
            if current.is_empty() {
                band = (span.bbox.y0, span.bbox.y1, span.font_size);
            } else {
                band = (
                    band.0.min(span.bbox.y0),
                    band.1.max(span.bbox.y1),
                    band.2.max(span.font_size),
                );
            }
            current.push(span);
        }

        if !current.is_empty() {
            lines.push(Line::from_spans(current));
        }

        lines
    }

    fn same_line(&self, span: &Span, (top, bottom, font_size): (f32, f32, f32)) -> bool {
        let tolerance = self.thresholds.line_tolerance * font_size.max(span.font_size).max(1.0);
        let center_diff = (span.bbox.center_y() - (top + bottom) / 2.0).abs();
        if center_diff <= tolerance {
            return true;
        }

        let overlap = span.bbox.y1.min(bottom) - span.bbox.y0.max(top);
        let min_height = span.bbox.height().min(bottom - top);
        min_height > 0.0 && overlap >= min_height * 0.5
    }

    /// Group lines into paragraphs based on spacing and font continuity.
    fn group_lines_into_paragraphs(
        &self,
        lines: Vec<Line>,
        page: u32,
        body_size: f32,
    ) -> Vec<Paragraph> {
        if lines.is_empty() {
            return vec![];
        }

        let max_pitch = body_size.max(1.0) * self.thresholds.max_line_pitch;
        let avg_spacing = average_line_spacing(&lines).min(max_pitch);
        let margin_left = lines
            .iter()
            .filter(|l| !l.is_blank())
            .map(|l| l.left)
            .fold(f32::INFINITY, f32::min);
        let margin_left = if margin_left.is_finite() {
            margin_left
        } else {
            0.0
        };

        let mut paragraphs = Vec::new();
        let mut current: Vec<Line> = Vec::new();
        let mut prev_visible: Option<usize> = None;

        for line in lines {
            if line.is_blank() {
                current.push(line);
                continue;
            }
            if let Some(prev_idx) = prev_visible {
                if self.should_break(&current[prev_idx], &line, avg_spacing) {
                    paragraphs.push(self.build_paragraph(
                        std::mem::take(&mut current),
                        page,
                        body_size,
                        margin_left,
                    ));
                }
            }
            current.push(line);
            prev_visible = Some(current.len() - 1);
        }

        if !current.is_empty() {
            paragraphs.push(self.build_paragraph(current, page, body_size, margin_left));
        }

        paragraphs
    }

    /// Determine if a new paragraph should start.
    fn should_break(&self, prev: &Line, curr: &Line, avg_spacing: f32) -> bool {
        let pitch = curr.center_y() - prev.center_y();
        if pitch < 0.0 || pitch > avg_spacing * self.thresholds.paragraph_gap_ratio {
            return true;
        }

        if (prev.font_size - curr.font_size).abs() > self.thresholds.font_size_jump {
            return true;
        }

        prev.is_bold() != curr.is_bold()
    }

    fn build_paragraph(
        &self,
        lines: Vec<Line>,
        page: u32,
        body_size: f32,
        margin_left: f32,
    ) -> Paragraph {
        let base_left = lines
            .iter()
            .filter(|l| !l.is_blank())
            .map(|l| l.left)
            .fold(f32::INFINITY, f32::min);
        let texts: Vec<String> = lines
            .iter()
            .map(|l| l.indented_text(&self.cleaner, base_left))
            .filter(|t| !t.is_empty())
            .collect();
        let mut para = Paragraph::from_lines(texts, page);

        let spans = || lines.iter().flat_map(|l| l.spans.iter());
        let visible = |s: &Span| s.text.chars().filter(|c| !c.is_whitespace()).count();
        let total: usize = spans().map(visible).sum();
        let bold: usize = spans().filter(|s| s.is_bold).map(visible).sum();
        let mono: usize = spans().filter(|s| s.is_monospace).map(visible).sum();
        let weighted: f32 = spans().map(|s| s.font_size * visible(s) as f32).sum();

        para.font_size = if total > 0 {
            weighted / total as f32
        } else {
            lines.first().map(|l| l.font_size).unwrap_or(body_size)
        };
        para.body_font_size = body_size;
        para.is_bold = total > 0 && bold * 2 > total;
        para.monospace_ratio = if total > 0 {
            mono as f32 / total as f32
        } else {
            0.0
        };
        para.superscript_chars = spans().filter(|s| s.is_superscript).map(visible).sum();
        para.left = if base_left.is_finite() {
            base_left
        } else {
            margin_left
        };
        para.margin_left = margin_left;
        para.top = lines.first().map(|l| l.top).unwrap_or(0.0);
        para
    }
}

impl Default for LayoutGrouper {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}

/// Average distance between consecutive visible line centers.
fn average_line_spacing(lines: &[Line]) -> f32 {
    let centers: Vec<f32> = lines
        .iter()
        .filter(|l| !l.is_blank())
        .map(|l| l.center_y())
        .collect();

    let spacings: Vec<f32> = centers
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return lines
            .first()
            .map(|l| l.font_size * 1.2)
            .unwrap_or(12.0)
            .max(1.0);
    }

    // The median resists the outsized gaps between paragraphs.
    let mut sorted = spacings;
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted[sorted.len() / 2]
}

/// Check if character is from a script that doesn't use word spaces.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x3040..=0x309F).contains(&code)
        || (0x30A0..=0x30FF).contains(&code)
        || (0x3000..=0x303F).contains(&code)
}
