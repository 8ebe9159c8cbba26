//! Layout analysis thresholds.
//!
//! All distances are in page units (points). The defaults are empirically
//! tuned; every value can be overridden, e.g. by deserialising a JSON file.

use serde::{Deserialize, Serialize};

/// Thresholds for grouping characters into words and words into lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Maximum top difference for consecutive characters in one word
    pub word_vertical_tolerance: f32,
    /// Maximum horizontal gap for consecutive characters in one word
    pub word_gap: f32,
    /// Maximum top difference for consecutive words in one line
    pub line_vertical_tolerance: f32,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            word_vertical_tolerance: 2.0,
            word_gap: 3.0,
            line_vertical_tolerance: 3.0,
        }
    }
}

/// Parameters for running header/footer detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderFooterConfig {
    /// Fewer pages than this yields an empty set
    pub min_pages: usize,
    /// Fraction of page height scanned at the top and at the bottom
    pub zone_fraction: f32,
    /// Maximum top difference between consecutive characters of one zone line
    pub line_gap: f32,
    /// Minimum character count of a repeated line
    pub min_text_len: usize,
}

impl Default for HeaderFooterConfig {
    fn default() -> Self {
        Self {
            min_pages: 3,
            zone_fraction: 0.15,
            line_gap: 3.0,
            min_text_len: 4,
        }
    }
}

/// Heading detection thresholds relative to the page's average font size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingThresholds {
    /// Size ratio above which a line scores 3
    pub large_ratio: f32,
    /// Size ratio above which a line scores 2
    pub medium_ratio: f32,
    /// Size ratio above which a line scores 1
    pub small_ratio: f32,
    /// Lines shorter than this count as short
    pub short_len: usize,
    /// Bold lines shorter than this are headings even at body size
    pub bold_short_len: usize,
    /// Average font size used when a page has no characters
    pub default_font_size: f32,
}

impl Default for HeadingThresholds {
    fn default() -> Self {
        Self {
            large_ratio: 1.3,
            medium_ratio: 1.15,
            small_ratio: 1.08,
            short_len: 100,
            bold_short_len: 50,
            default_font_size: 12.0,
        }
    }
}

/// All layout thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Word/line grouping
    pub grouping: GroupingConfig,
    /// Running header/footer detection
    pub header_footer: HeaderFooterConfig,
    /// Heading detection
    pub headings: HeadingThresholds,
}

impl LayoutConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(|e| crate::Error::InvalidOptions(e.to_string()))
    }

    /// Set grouping thresholds.
    pub fn with_grouping(mut self, grouping: GroupingConfig) -> Self {
        self.grouping = grouping;
        self
    }

    /// Set header/footer parameters.
    pub fn with_header_footer(mut self, header_footer: HeaderFooterConfig) -> Self {
        self.header_footer = header_footer;
        self
    }

    /// Set heading thresholds.
    pub fn with_headings(mut self, headings: HeadingThresholds) -> Self {
        self.headings = headings;
        self
    }
}
