//! Positioned text: characters, words and lines.

use serde::{Deserialize, Serialize};

use super::BBox;

/// Whether a font name indicates a bold face.
pub fn is_bold_font(font_name: &str) -> bool {
    font_name.to_lowercase().contains("bold")
}

/// Whether a font name indicates an italic or oblique face.
pub fn is_italic_font(font_name: &str) -> bool {
    let lower = font_name.to_lowercase();
    lower.contains("italic") || lower.contains("oblique")
}

/// A single glyph with its geometry and font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// Decoded text of the glyph (usually one char, ligatures may carry more)
    pub text: String,
    /// Glyph box in page coordinates
    pub bbox: BBox,
    /// Effective font size in points
    pub size: f32,
    /// Font name, e.g. "Helvetica-Bold"
    pub font_name: String,
}

impl Character {
    /// Create a new character.
    pub fn new(
        text: impl Into<String>,
        bbox: BBox,
        size: f32,
        font_name: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            bbox,
            size,
            font_name: font_name.into(),
        }
    }

    /// Top edge.
    pub fn top(&self) -> f32 {
        self.bbox.top
    }

    /// Whether the glyph is whitespace only.
    pub fn is_whitespace(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }
}

/// A run of characters on one visual line, merged by horizontal proximity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Concatenated character text, trimmed
    pub text: String,
    /// Covering box of all member characters
    pub bbox: BBox,
    /// Font size of the first character
    pub size: f32,
    /// Font name of the first character
    pub font_name: String,
}

impl Word {
    /// Build a word from its member characters. Returns `None` for an empty slice.
    pub fn from_chars(chars: &[Character]) -> Option<Self> {
        let first = chars.first()?;
        let bbox = BBox::enclosing(chars.iter().map(|c| &c.bbox))?;
        let text: String = chars.iter().map(|c| c.text.as_str()).collect();

        Some(Self {
            text: text.trim().to_string(),
            bbox,
            size: first.size,
            font_name: first.font_name.clone(),
        })
    }
}

/// Words sharing a vertical position, ordered left to right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Space-joined word text
    pub text: String,
    /// Covering box of all member words
    pub bbox: BBox,
    /// Font size of the leftmost word
    pub size: f32,
    /// Font name of the leftmost word
    pub font_name: String,
}

impl Line {
    /// Build a line from words; words are re-sorted left to right before joining.
    pub fn from_words(mut words: Vec<Word>) -> Option<Self> {
        words.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
        let bbox = BBox::enclosing(words.iter().map(|w| &w.bbox))?;
        let first = words.first()?;

        let text = words
            .iter()
            .map(|w| w.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Some(Self {
            size: first.size,
            font_name: first.font_name.clone(),
            text,
            bbox,
        })
    }

    /// Create a line directly from text and geometry.
    pub fn new(
        text: impl Into<String>,
        bbox: BBox,
        size: f32,
        font_name: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            bbox,
            size,
            font_name: font_name.into(),
        }
    }

    /// Top edge.
    pub fn top(&self) -> f32 {
        self.bbox.top
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.bbox.bottom
    }

    /// Trimmed text.
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    /// Whether the line's font is bold.
    pub fn is_bold(&self) -> bool {
        is_bold_font(&self.font_name)
    }

    /// Whether the line's font is italic.
    pub fn is_italic(&self) -> bool {
        is_italic_font(&self.font_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(text: &str, x0: f32, font: &str) -> Character {
        Character::new(text, BBox::new(x0, 100.0, x0 + 5.0, 110.0), 10.0, font)
    }

    #[test]
    fn test_font_style_detection() {
        assert!(is_bold_font("Helvetica-Bold"));
        assert!(is_bold_font("ABCDEE+Calibri,BOLD"));
        assert!(!is_bold_font("Helvetica"));
        assert!(is_italic_font("Times-Italic"));
        assert!(is_italic_font("Helvetica-Oblique"));
        assert!(!is_italic_font("Helvetica-Bold"));
    }

    #[test]
    fn test_word_from_chars() {
        let chars = vec![ch("H", 0.0, "Arial-Bold"), ch("i", 5.0, "Arial"), ch(" ", 10.0, "Arial")];
        let word = Word::from_chars(&chars).unwrap();
        assert_eq!(word.text, "Hi");
        assert_eq!(word.bbox, BBox::new(0.0, 100.0, 15.0, 110.0));
        assert_eq!(word.font_name, "Arial-Bold");
        assert!(Word::from_chars(&[]).is_none());
    }

    #[test]
    fn test_line_sorts_words_left_to_right() {
        let right = Word::from_chars(&[ch("world", 50.0, "Arial")]).unwrap();
        let left = Word::from_chars(&[ch("hello", 0.0, "Arial-Bold")]).unwrap();
        let line = Line::from_words(vec![right, left]).unwrap();
        assert_eq!(line.text, "hello world");
        assert_eq!(line.font_name, "Arial-Bold");
        assert!(line.is_bold());
        assert!(Line::from_words(vec![]).is_none());
    }
}
