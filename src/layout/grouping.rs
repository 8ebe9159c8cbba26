//! Character → word → line grouping.

use crate::model::{BBox, Character, Line, Word};

use super::config::GroupingConfig;

/// Drop characters overlapping any exclusion zone (table or image area).
pub fn filter_excluded(chars: &[Character], zones: &[BBox]) -> Vec<Character> {
    chars
        .iter()
        .filter(|c| !zones.iter().any(|zone| c.bbox.overlaps(zone)))
        .cloned()
        .collect()
}

/// Mean character size of a page, or `default` when the page has no text.
pub fn average_font_size(chars: &[Character], default: f32) -> f32 {
    if chars.is_empty() {
        return default;
    }
    chars.iter().map(|c| c.size).sum::<f32>() / chars.len() as f32
}

/// Groups characters into words and words into lines by proximity.
#[derive(Debug, Clone, Default)]
pub struct WordLineGrouper {
    config: GroupingConfig,
}

impl WordLineGrouper {
    /// Create a grouper with the given thresholds.
    pub fn new(config: GroupingConfig) -> Self {
        Self { config }
    }

    /// Group characters, in content order, into lines sorted top to bottom.
    pub fn group(&self, chars: &[Character]) -> Vec<Line> {
        let words = self.group_words(chars);
        let lines = self.group_lines(words);
        log::debug!("Grouped {} chars into {} lines", chars.len(), lines.len());
        lines
    }

    /// Join consecutive characters into words.
    pub fn group_words(&self, chars: &[Character]) -> Vec<Word> {
        let mut words = Vec::new();
        let mut start = 0;

        for i in 1..chars.len() {
            let prev = &chars[i - 1];
            let curr = &chars[i];
            let same_word = (curr.top() - prev.top()).abs() < self.config.word_vertical_tolerance
                && curr.bbox.x0 - prev.bbox.x1 < self.config.word_gap;
            if !same_word {
                words.extend(Word::from_chars(&chars[start..i]));
                start = i;
            }
        }
        if start < chars.len() {
            words.extend(Word::from_chars(&chars[start..]));
        }

        words.retain(|w| !w.text.is_empty());
        words
    }

    /// Join words sharing a vertical position into lines.
    pub fn group_lines(&self, mut words: Vec<Word>) -> Vec<Line> {
        words.sort_by(|a, b| {
            a.bbox
                .top
                .total_cmp(&b.bbox.top)
                .then(a.bbox.x0.total_cmp(&b.bbox.x0))
        });

        let mut lines = Vec::new();
        let mut current: Vec<Word> = Vec::new();
        for word in words {
            if let Some(last) = current.last() {
                if (word.bbox.top - last.bbox.top).abs() >= self.config.line_vertical_tolerance {
                    lines.extend(Line::from_words(std::mem::take(&mut current)));
                }
            }
            current.push(word);
        }
        lines.extend(Line::from_words(current));

        lines.retain(|l| !l.trimmed().is_empty());
        lines
    }
}
