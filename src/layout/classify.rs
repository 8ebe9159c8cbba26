//! Heading and list classification as ordered rule tables.
//!
//! Each table is evaluated top to bottom and the first rule that matches
//! decides. Headings always take precedence over list items.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::model::{is_bold_font, Line};

use super::config::HeadingThresholds;

/// Numbered section prefix: `1.2`, `1.2.3.`, or `20.`, followed by whitespace.
static NUMBERED_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)+\.?|\d+\.)\s+").unwrap());

static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[•·◦▪▫]\s*").unwrap());
static DASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[–\-*] \s*").unwrap());
static ROMAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\(([ivxlcdm]+)\)\s+").unwrap());
static LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\([a-z]\)|[a-z]\))\s+").unwrap());
static NUMBER_DOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\.\s+").unwrap());
static NUMBER_PAREN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\)\s+").unwrap());

/// Deepest heading level emitted.
const MAX_HEADING_LEVEL: u8 = 3;

/// Signals a line offers to the heading rules.
#[derive(Debug, Clone, Copy)]
pub struct LineFeatures<'a> {
    /// Trimmed line text
    pub text: &'a str,
    /// Line font size divided by the page's average font size
    pub size_ratio: f32,
    /// Whether the line's font is bold
    pub is_bold: bool,
    /// Length of `text` in characters
    pub len: usize,
}

impl<'a> LineFeatures<'a> {
    /// Derive features for a line on a page with the given average font size.
    pub fn of(line: &'a Line, avg_font_size: f32) -> Self {
        let text = line.trimmed();
        let size_ratio = if avg_font_size > 0.0 {
            line.size / avg_font_size
        } else {
            1.0
        };
        Self {
            text,
            size_ratio,
            is_bold: is_bold_font(&line.font_name),
            len: text.chars().count(),
        }
    }
}

/// One heading rule: returns the heading level when it applies.
pub struct HeadingRule {
    /// Rule name, for logs and tests
    pub name: &'static str,
    /// Decide the heading level, or `None` to defer to the next rule
    pub apply: fn(&LineFeatures<'_>, &HeadingThresholds) -> Option<u8>,
}

/// Heading rules in precedence order: numbered prefix, font size, bold and short.
pub static HEADING_RULES: [HeadingRule; 3] = [
    HeadingRule {
        name: "numbered",
        apply: numbered_heading,
    },
    HeadingRule {
        name: "size",
        apply: size_heading,
    },
    HeadingRule {
        name: "bold-short",
        apply: bold_short_heading,
    },
];

/// Level from the number of components in a section prefix: `20.` is 1,
/// `1.2` is 2, `1.1.1` and deeper are 3.
///
/// The count is capped before narrowing, so prefixes of any length stay at 3.
fn numbered_heading(features: &LineFeatures<'_>, _: &HeadingThresholds) -> Option<u8> {
    let caps = NUMBERED_HEADING.captures(features.text)?;
    let components = caps[1].split('.').filter(|part| !part.is_empty()).count();
    let level = components.clamp(1, usize::from(MAX_HEADING_LEVEL));
    u8::try_from(level).ok()
}

/// Size score 3 maps to level 1 and 2 to level 2. A score of 1 is a level 3
/// heading only for bold or short lines.
fn size_heading(features: &LineFeatures<'_>, thresholds: &HeadingThresholds) -> Option<u8> {
    let ratio = features.size_ratio;
    let score = if ratio > thresholds.large_ratio {
        3
    } else if ratio > thresholds.medium_ratio {
        2
    } else if ratio > thresholds.small_ratio {
        1
    } else {
        0
    };

    let is_short = features.len < thresholds.short_len;
    match score {
        2 | 3 => Some(MAX_HEADING_LEVEL + 1 - score),
        1 if features.is_bold || is_short => Some(MAX_HEADING_LEVEL),
        _ => None,
    }
}

fn bold_short_heading(features: &LineFeatures<'_>, thresholds: &HeadingThresholds) -> Option<u8> {
    let short = features.len < thresholds.short_len && features.len < thresholds.bold_short_len;
    (features.is_bold && short).then_some(MAX_HEADING_LEVEL)
}

/// Heading level for a line, if any rule applies.
pub fn detect_heading(features: &LineFeatures<'_>, thresholds: &HeadingThresholds) -> Option<u8> {
    HEADING_RULES
        .iter()
        .find_map(|rule| (rule.apply)(features, thresholds))
}

/// One list rule: a prefix pattern, how to render its marker and the indent.
pub struct ListRule {
    /// Rule name, for logs and tests
    pub name: &'static str,
    /// Prefix matched and stripped from the item text
    pub pattern: &'static Lazy<Regex>,
    /// Markdown marker for a match
    pub marker: fn(&Captures<'_>) -> String,
    /// Indent level; rendered as two spaces per level
    pub indent: u8,
}

fn dash_marker(_: &Captures<'_>) -> String {
    "-".to_string()
}

fn literal_marker(caps: &Captures<'_>) -> String {
    caps[1].to_string()
}

fn roman_marker(caps: &Captures<'_>) -> String {
    format!("({})", &caps[1])
}

fn dot_marker(caps: &Captures<'_>) -> String {
    format!("{}.", &caps[1])
}

fn paren_marker(caps: &Captures<'_>) -> String {
    format!("{})", &caps[1])
}

/// List rules in precedence order.
pub static LIST_RULES: [ListRule; 6] = [
    ListRule {
        name: "bullet",
        pattern: &BULLET,
        marker: dash_marker,
        indent: 0,
    },
    ListRule {
        name: "dash",
        pattern: &DASH,
        marker: dash_marker,
        indent: 0,
    },
    ListRule {
        name: "roman",
        pattern: &ROMAN,
        marker: roman_marker,
        indent: 1,
    },
    ListRule {
        name: "letter",
        pattern: &LETTER,
        marker: literal_marker,
        indent: 2,
    },
    ListRule {
        name: "number-dot",
        pattern: &NUMBER_DOT,
        marker: dot_marker,
        indent: 0,
    },
    ListRule {
        name: "number-paren",
        pattern: &NUMBER_PAREN,
        marker: paren_marker,
        indent: 0,
    },
];

/// A recognised list item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMarker {
    /// Markdown marker, e.g. "-", "(iv)", "12."
    pub marker: String,
    /// Indent level
    pub indent: u8,
    /// Name of the rule that matched
    pub rule: &'static str,
}

impl ListMarker {
    /// Strip this marker's prefix from item text.
    pub fn strip<'t>(&self, text: &'t str) -> &'t str {
        let text = text.trim_start();
        LIST_RULES
            .iter()
            .find(|rule| rule.name == self.rule)
            .and_then(|rule| rule.pattern.find(text))
            .map(|m| &text[m.end()..])
            .unwrap_or(text)
    }

    /// Render an item: indent, marker, then text.
    pub fn render(&self, text: &str) -> String {
        format!(
            "{}{} {}",
            "  ".repeat(self.indent as usize),
            self.marker,
            self.strip(text)
        )
    }
}

/// Detect a list marker at the start of a line. Texts shorter than two
/// characters are never list items.
pub fn detect_list_marker(text: &str) -> Option<ListMarker> {
    let text = text.trim();
    if text.chars().count() < 2 {
        return None;
    }

    LIST_RULES.iter().find_map(|rule| {
        rule.pattern.captures(text).map(|caps| ListMarker {
            marker: (rule.marker)(&caps),
            indent: rule.indent,
            rule: rule.name,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BBox;

    fn features(text: &str, size_ratio: f32, is_bold: bool) -> LineFeatures<'_> {
        LineFeatures {
            text,
            size_ratio,
            is_bold,
            len: text.chars().count(),
        }
    }

    fn heading(text: &str, size_ratio: f32, is_bold: bool) -> Option<u8> {
        detect_heading(&features(text, size_ratio, is_bold), &HeadingThresholds::default())
    }

    #[test]
    fn test_numbered_heading_levels() {
        assert_eq!(heading("20. PUBLICITY AND USE OF NAMES", 1.0, false), Some(1));
        assert_eq!(heading("1.2 Definitions", 1.0, false), Some(2));
        assert_eq!(heading("1.1.1 Scope", 1.0, false), Some(3));
        assert_eq!(heading("1.2.3.4.5 Deep", 1.0, false), Some(3));
        let very_deep = format!("{} Appendix", vec!["1"; 256].join("."));
        assert_eq!(heading(&very_deep, 1.0, false), Some(3));
        assert_eq!(heading("2020 was a year", 1.0, false), None);
    }

    #[test]
    fn test_numbered_rule_precedes_size() {
        assert_eq!(heading("1.1.1 Scope", 2.0, true), Some(3));
    }

    #[test]
    fn test_size_heading_levels() {
        assert_eq!(heading("Introduction", 1.5, false), Some(1));
        assert_eq!(heading("Background", 1.2, false), Some(2));
        assert_eq!(heading("Minor", 1.1, false), Some(3));
        assert_eq!(heading("Body text", 1.0, false), None);
    }

    #[test]
    fn test_size_thresholds_are_exclusive() {
        assert_eq!(heading("Edge", 1.3, false), Some(2));
        assert_eq!(heading("Edge", 1.08, false), None);
    }

    #[test]
    fn test_slightly_large_long_line_is_not_heading() {
        let long = "word ".repeat(30);
        assert_eq!(heading(long.trim(), 1.1, false), None);
        assert_eq!(heading(long.trim(), 1.1, true), Some(3));
    }

    #[test]
    fn test_bold_short_heading() {
        assert_eq!(heading("Terms", 1.0, true), Some(3));
        let medium = "x".repeat(60);
        assert_eq!(heading(&medium, 1.0, true), None);
    }

    #[test]
    fn test_rule_order_is_documented() {
        let names: Vec<&str> = HEADING_RULES.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["numbered", "size", "bold-short"]);
    }

    #[test]
    fn test_features_from_line() {
        let line = Line::new("  Title  ", BBox::new(0.0, 0.0, 10.0, 10.0), 18.0, "Arial-BoldMT");
        let f = LineFeatures::of(&line, 12.0);
        assert_eq!(f.text, "Title");
        assert_eq!(f.len, 5);
        assert!(f.is_bold);
        assert!((f.size_ratio - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_bullet_markers() {
        let m = detect_list_marker("• Item one").unwrap();
        assert_eq!((m.marker.as_str(), m.indent), ("-", 0));
        assert_eq!(m.render("• Item one"), "- Item one");

        let m = detect_list_marker("▪tight").unwrap();
        assert_eq!(m.render("▪tight"), "- tight");

        let m = detect_list_marker("– en dash item").unwrap();
        assert_eq!(m.render("– en dash item"), "- en dash item");

        assert!(detect_list_marker("-no space").is_none());
        assert!(detect_list_marker("•").is_none());
    }

    #[test]
    fn test_roman_marker_preserved() {
        let m = detect_list_marker("(iv) Roman item").unwrap();
        assert_eq!(m.marker, "(iv)");
        assert_eq!(m.indent, 1);
        assert_eq!(m.render("(iv) Roman item"), "  (iv) Roman item");

        let m = detect_list_marker("(II) Upper").unwrap();
        assert_eq!(m.marker, "(II)");
    }

    #[test]
    fn test_letter_markers() {
        let m = detect_list_marker("(a) first").unwrap();
        assert_eq!((m.marker.as_str(), m.indent), ("(a)", 2));
        assert_eq!(m.render("(a) first"), "    (a) first");

        let m = detect_list_marker("b) second").unwrap();
        assert_eq!((m.marker.as_str(), m.indent), ("b)", 2));
    }

    #[test]
    fn test_roman_letters_prefer_roman_rule() {
        let m = detect_list_marker("(c) copyright").unwrap();
        assert_eq!(m.rule, "roman");
        assert_eq!(m.indent, 1);
    }

    #[test]
    fn test_numbered_markers() {
        let m = detect_list_marker("12. Twelfth").unwrap();
        assert_eq!((m.marker.as_str(), m.indent), ("12.", 0));
        assert_eq!(m.render("12. Twelfth"), "12. Twelfth");

        let m = detect_list_marker("3) Third").unwrap();
        assert_eq!(m.marker, "3)");
        assert_eq!(m.render("3) Third"), "3) Third");
    }

    #[test]
    fn test_plain_text_is_not_list() {
        assert!(detect_list_marker("Plain paragraph").is_none());
        assert!(detect_list_marker("").is_none());
    }
}
