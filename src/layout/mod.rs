//! Layout analysis: from positioned characters to text blocks.
//!
//! The per-page flow is
//!
//! 1. drop characters inside table and image areas,
//! 2. group characters into words and words into lines,
//! 3. drop running header/footer lines,
//! 4. rejoin bare section numbers with their heading text,
//! 5. classify lines and group them into heading, list and paragraph blocks.
//!
//! Header/footer detection runs once per document before any page is laid out.

mod blocks;
mod classify;
mod config;
mod grouping;
mod headers;
mod section;

pub use blocks::BlockBuilder;
pub use classify::{
    detect_heading, detect_list_marker, HeadingRule, LineFeatures, ListMarker, ListRule,
    HEADING_RULES, LIST_RULES,
};
pub use config::{GroupingConfig, HeaderFooterConfig, HeadingThresholds, LayoutConfig};
pub use grouping::{average_font_size, filter_excluded, WordLineGrouper};
pub use headers::{HeaderFooterDetector, PageSample};
pub use section::{is_section_number, merge_section_numbers};

use std::collections::HashSet;

use crate::model::{BBox, Block, Character, Line};

/// Runs the per-page layout flow with one configuration.
#[derive(Debug, Clone, Default)]
pub struct LayoutAnalyzer {
    config: LayoutConfig,
}

impl LayoutAnalyzer {
    /// Create an analyzer.
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// A header/footer detector using this configuration.
    pub fn header_footer_detector(&self) -> HeaderFooterDetector {
        HeaderFooterDetector::new(self.config.header_footer, self.config.grouping.word_gap)
    }

    /// Text blocks of one page.
    ///
    /// `chars` are all characters of the page; the average font size is taken
    /// over all of them, before exclusion zones are applied.
    pub fn text_blocks(
        &self,
        chars: &[Character],
        exclusion_zones: &[BBox],
        header_footer: &HashSet<String>,
    ) -> Vec<Block> {
        let avg_font_size = average_font_size(chars, self.config.headings.default_font_size);
        let filtered = filter_excluded(chars, exclusion_zones);
        if filtered.is_empty() {
            return vec![];
        }

        let lines: Vec<Line> = WordLineGrouper::new(self.config.grouping)
            .group(&filtered)
            .into_iter()
            .filter(|line| !header_footer.contains(line.trimmed()))
            .collect();
        let lines = merge_section_numbers(lines);

        log::debug!(
            "Page layout: {} of {} chars kept, {} lines, avg size {:.1}",
            filtered.len(),
            chars.len(),
            lines.len(),
            avg_font_size
        );

        BlockBuilder::new(self.config.headings, avg_font_size, header_footer).build(&lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, x: f32, top: f32, size: f32, font: &str) -> Vec<Character> {
        text.chars()
            .enumerate()
            .map(|(i, c)| {
                let x0 = x + i as f32 * size * 0.5;
                Character::new(
                    c.to_string(),
                    BBox::new(x0, top, x0 + size * 0.5, top + size),
                    size,
                    font,
                )
            })
            .collect()
    }

    #[test]
    fn test_section_number_merged_into_heading() {
        let mut chars = run("20.", 72.0, 100.0, 10.0, "Helvetica");
        chars.extend(run("PUBLICITY AND USE OF NAMES", 72.0, 115.0, 10.0, "Helvetica"));
        chars.extend(run(
            "Neither party shall use the other's name.",
            72.0,
            140.0,
            10.0,
            "Helvetica",
        ));

        let blocks = LayoutAnalyzer::default().text_blocks(&chars, &[], &HashSet::new());
        assert_eq!(blocks[0].content, "# 20. PUBLICITY AND USE OF NAMES");
        assert_eq!(blocks[1].content, "Neither party shall use the other's name.");
    }

    #[test]
    fn test_exclusion_zone_removes_text() {
        let mut chars = run("Visible text here", 72.0, 100.0, 10.0, "Helvetica");
        chars.extend(run("Cell text", 72.0, 300.0, 10.0, "Helvetica"));
        let zone = BBox::new(60.0, 290.0, 500.0, 320.0);

        let blocks = LayoutAnalyzer::default().text_blocks(&chars, &[zone], &HashSet::new());
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].content, "Visible text here");
    }

    #[test]
    fn test_average_size_includes_excluded_chars() {
        // Small table text lowers the page average, so the body line reads as large.
        let mut chars = run("Body line of text", 72.0, 100.0, 12.0, "Helvetica");
        chars.extend(run("tiny cell text repeated in a table grid", 72.0, 300.0, 6.0, "Helvetica"));
        let zone = BBox::new(60.0, 290.0, 800.0, 320.0);

        let blocks = LayoutAnalyzer::default().text_blocks(&chars, &[zone], &HashSet::new());
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].content, "# Body line of text");
    }
}
