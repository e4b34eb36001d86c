//! Character-level cleanup applied to span text before grouping.

use unicode_normalization::UnicodeNormalization;

/// Options for span text cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupOptions {
    /// Normalize Unicode to NFC form
    pub normalize_unicode: bool,

    /// Expand typographic ligatures (ﬁ, ﬂ, ...)
    pub fix_ligatures: bool,

    /// Remove Private Use Area characters (undecodable glyphs)
    pub remove_pua: bool,

    /// Remove the Unicode replacement character (U+FFFD)
    pub remove_replacement_char: bool,

    /// Replace control characters and non-breaking spaces with plain spaces
    pub normalize_spaces: bool,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
            fix_ligatures: true,
            remove_pua: true,
            remove_replacement_char: true,
            normalize_spaces: true,
        }
    }
}

/// Span text cleaner.
#[derive(Debug, Clone)]
pub struct TextCleaner {
    options: CleanupOptions,
    ligature_map: Vec<(char, &'static str)>,
}

impl TextCleaner {
    /// Create a cleaner with the given options.
    pub fn new(options: CleanupOptions) -> Self {
        Self {
            options,
            ligature_map: vec![
                ('\u{FB00}', "ff"),
                ('\u{FB01}', "fi"),
                ('\u{FB02}', "fl"),
                ('\u{FB03}', "ffi"),
                ('\u{FB04}', "ffl"),
                ('\u{FB05}', "st"),
                ('\u{FB06}', "st"),
            ],
        }
    }

    /// Clean one span's text. Leading and trailing spaces are kept since
    /// they carry word boundaries between spans.
    pub fn clean(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        for c in text.chars() {
            if self.options.remove_replacement_char && c == '\u{FFFD}' {
                continue;
            }
            if self.options.remove_pua && is_private_use(c) {
                continue;
            }
            if self.options.fix_ligatures {
                if let Some((_, expansion)) = self.ligature_map.iter().find(|(l, _)| *l == c) {
                    result.push_str(expansion);
                    continue;
                }
            }
            if self.options.normalize_spaces && (c.is_control() || c == '\u{00A0}') {
                result.push(' ');
                continue;
            }
            result.push(c);
        }

        if self.options.normalize_unicode {
            result.nfc().collect()
        } else {
            result
        }
    }
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::new(CleanupOptions::default())
    }
}

fn is_private_use(c: char) -> bool {
    let code = c as u32;
    (0xE000..=0xF8FF).contains(&code)
        || (0xF0000..=0xFFFFD).contains(&code)
        || (0x100000..=0x10FFFD).contains(&code)
}

/// Collapse every whitespace run to a single space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
