//! Conversion results and statistics.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::model::{Block, BlockKind};

/// Counts collected while converting one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionReport {
    /// Total number of pages processed
    pub page_count: u32,

    /// Number of paragraph blocks
    pub text_block_count: u32,

    /// Number of headings
    pub heading_count: u32,

    /// Number of list items
    pub list_item_count: u32,

    /// Number of tables rendered
    pub table_count: u32,

    /// Number of tables skipped because their grid or bbox was unusable
    pub tables_skipped: u32,

    /// Number of images written
    pub image_count: u32,

    /// Number of images whose extraction failed
    pub images_skipped: u32,

    /// Pages that contributed no characters, unreadable ones included
    pub pages_without_text: u32,

    /// Distinct header/footer texts removed
    pub header_footer_lines: u32,
}

impl ConversionReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the text blocks of one page.
    pub fn record_text_blocks(&mut self, blocks: &[Block]) {
        for block in blocks {
            match block.kind {
                BlockKind::Text if block.is_heading() => self.heading_count += 1,
                BlockKind::Text => self.text_block_count += 1,
                BlockKind::List => self.list_item_count += 1,
                BlockKind::Table | BlockKind::Image => {}
            }
        }
    }

    /// Total number of elements skipped.
    pub fn skipped(&self) -> u32 {
        self.tables_skipped + self.images_skipped
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| crate::Error::Other(e.to_string()))
    }
}

/// What a conversion produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOutput {
    /// The written Markdown file
    pub markdown_path: PathBuf,
    /// Statistics of the run
    pub report: ConversionReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_text_blocks() {
        let mut report = ConversionReport::new();
        report.record_text_blocks(&[
            Block::heading("# Title", 1, 0.0, 10.0),
            Block::text("Body", 20.0, 30.0),
            Block::list("- a", 40.0, 50.0),
            Block::list("- b", 60.0, 70.0),
        ]);
        assert_eq!(report.heading_count, 1);
        assert_eq!(report.text_block_count, 1);
        assert_eq!(report.list_item_count, 2);
    }

    #[test]
    fn test_report_json() {
        let report = ConversionReport {
            page_count: 3,
            images_skipped: 1,
            ..Default::default()
        };
        let json = report.to_json().unwrap();
        assert!(json.contains("\"page_count\": 3"));
        assert!(json.contains("\"images_skipped\": 1"));
        assert_eq!(report.skipped(), 1);
    }
}
