//! Page-level output blocks.

use serde::{Deserialize, Serialize};

/// Kind of a rendered block, used for reading-order spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Paragraph or heading
    Text,
    /// One list item
    List,
    /// A Markdown table
    Table,
    /// A Markdown image reference
    Image,
}

/// A unit of page output with its vertical span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Block kind
    pub kind: BlockKind,
    /// Rendered Markdown
    pub content: String,
    /// Top of the block on the page
    pub y0: f32,
    /// Bottom of the block on the page
    pub y1: f32,
    /// Heading level when the block is a heading
    pub heading_level: Option<u8>,
}

impl Block {
    /// Create a new block.
    pub fn new(kind: BlockKind, content: impl Into<String>, y0: f32, y1: f32) -> Self {
        Self {
            kind,
            content: content.into(),
            y0,
            y1,
            heading_level: None,
        }
    }

    /// Paragraph block.
    pub fn text(content: impl Into<String>, y0: f32, y1: f32) -> Self {
        Self::new(BlockKind::Text, content, y0, y1)
    }

    /// Heading block; content already carries the `#` prefix.
    pub fn heading(content: impl Into<String>, level: u8, y0: f32, y1: f32) -> Self {
        Self {
            heading_level: Some(level),
            ..Self::new(BlockKind::Text, content, y0, y1)
        }
    }

    /// List item block.
    pub fn list(content: impl Into<String>, y0: f32, y1: f32) -> Self {
        Self::new(BlockKind::List, content, y0, y1)
    }

    /// Table block.
    pub fn table(content: impl Into<String>, y0: f32, y1: f32) -> Self {
        Self::new(BlockKind::Table, content, y0, y1)
    }

    /// Image block.
    pub fn image(content: impl Into<String>, y0: f32, y1: f32) -> Self {
        Self::new(BlockKind::Image, content, y0, y1)
    }

    /// Whether this block is a heading.
    pub fn is_heading(&self) -> bool {
        self.heading_level.is_some()
    }
}
