//! Whole-document Markdown cleanup.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Three or more newlines in a row.
static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Typographic ligatures and their plain-letter spellings.
const LIGATURES: [(char, &str); 7] = [
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

/// Optional cleanup steps. Blank-line collapsing and trimming always run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostProcessOptions {
    /// Normalize Unicode to NFC form
    pub normalize_unicode: bool,
    /// Replace ligature code points with their letters
    pub fix_ligatures: bool,
}

impl PostProcessOptions {
    /// Create options with every optional step off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable NFC normalization.
    pub fn with_normalize_unicode(mut self, enabled: bool) -> Self {
        self.normalize_unicode = enabled;
        self
    }

    /// Enable or disable ligature replacement.
    pub fn with_fix_ligatures(mut self, enabled: bool) -> Self {
        self.fix_ligatures = enabled;
        self
    }
}

/// Final pass over the assembled document.
#[derive(Debug, Clone, Default)]
pub struct PostProcessor {
    options: PostProcessOptions,
}

impl PostProcessor {
    /// Create a post-processor.
    pub fn new(options: PostProcessOptions) -> Self {
        Self { options }
    }

    /// Clean up a document.
    ///
    /// Whitespace-only lines become empty, runs of blank lines collapse to
    /// a single blank line and the result is trimmed.
    pub fn process(&self, markdown: &str) -> String {
        let mut result = if self.options.normalize_unicode {
            markdown.nfc().collect::<String>()
        } else {
            markdown.to_string()
        };

        if self.options.fix_ligatures {
            result = fix_ligatures(&result);
        }

        let lines: Vec<&str> = result
            .split('\n')
            .map(|line| if line.trim().is_empty() { "" } else { line })
            .collect();
        let joined = lines.join("\n");

        EXCESS_NEWLINES.replace_all(&joined, "\n\n").trim().to_string()
    }
}

fn fix_ligatures(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match LIGATURES.iter().find(|(lig, _)| *lig == c) {
            Some((_, letters)) => out.push_str(letters),
            None => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_blank_runs() {
        let processor = PostProcessor::default();
        assert_eq!(processor.process("A\n\n\n\nB"), "A\n\nB");
        assert_eq!(processor.process("A\n  \n\t\n\nB"), "A\n\nB");
        assert_eq!(processor.process("A\nB"), "A\nB");
    }

    #[test]
    fn test_trims_document() {
        assert_eq!(
            PostProcessor::default().process("\n\n  # Title\n\nBody \n\n"),
            "# Title\n\nBody"
        );
    }

    #[test]
    fn test_keeps_list_indentation() {
        let text = "Intro\n\n  (i) one\n\n  (ii) two";
        assert_eq!(PostProcessor::default().process(text), text);
    }

    #[test]
    fn test_ligatures_off_by_default() {
        assert_eq!(PostProcessor::default().process("e\u{FB03}cient"), "e\u{FB03}cient");
        let processor = PostProcessor::new(PostProcessOptions::new().with_fix_ligatures(true));
        assert_eq!(processor.process("e\u{FB03}cient \u{FB01}le"), "efficient file");
    }

    #[test]
    fn test_nfc() {
        let processor = PostProcessor::new(PostProcessOptions::new().with_normalize_unicode(true));
        assert_eq!(processor.process("Cafe\u{0301}"), "Caf\u{00E9}");
    }

    #[test]
    fn test_idempotent() {
        let processor = PostProcessor::default();
        let once = processor.process("\n# A\n\n\n\nB\n \nC\n\n");
        assert_eq!(processor.process(&once), once);
    }
}
