//! Group classified lines into heading, list and paragraph blocks.

use std::collections::HashSet;

use crate::model::{Block, Line};

use super::classify::{detect_heading, detect_list_marker, LineFeatures, ListMarker};
use super::config::HeadingThresholds;

/// What a line starts.
#[derive(Debug, Clone, PartialEq)]
enum LineKind {
    Heading(u8),
    List(ListMarker),
    Text,
}

/// Builds the text blocks of one page.
#[derive(Debug, Clone)]
pub struct BlockBuilder<'a> {
    thresholds: HeadingThresholds,
    avg_font_size: f32,
    header_footer: &'a HashSet<String>,
}

impl<'a> BlockBuilder<'a> {
    /// Create a builder for a page with the given average font size.
    pub fn new(
        thresholds: HeadingThresholds,
        avg_font_size: f32,
        header_footer: &'a HashSet<String>,
    ) -> Self {
        Self {
            thresholds,
            avg_font_size,
            header_footer,
        }
    }

    /// Turn lines, in reading order, into blocks.
    ///
    /// Headings are single-line blocks. A list item or paragraph absorbs the
    /// following lines until the next heading or list item; blank and
    /// header/footer lines are skipped everywhere.
    pub fn build(&self, lines: &[Line]) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = &lines[i];
            let text = line.trimmed();
            if self.is_skipped(text) {
                i += 1;
                continue;
            }

            match self.classify(line) {
                LineKind::Heading(level) => {
                    let content = format!("{} {}", "#".repeat(level as usize), text);
                    blocks.push(Block::heading(content, level, line.top(), line.bottom()));
                    i += 1;
                }
                LineKind::List(marker) => {
                    let (parts, y1, next) = self.absorb(lines, i + 1, text, line.bottom());
                    blocks.push(Block::list(marker.render(&parts.join(" ")), line.top(), y1));
                    i = next;
                }
                LineKind::Text => {
                    let (parts, y1, next) = self.absorb(lines, i + 1, text, line.bottom());
                    let paragraph = parts.join(" ");
                    let content = if line.is_bold() {
                        format!("**{}**", paragraph)
                    } else if line.is_italic() {
                        format!("*{}*", paragraph)
                    } else {
                        paragraph
                    };
                    blocks.push(Block::text(content, line.top(), y1));
                    i = next;
                }
            }
        }

        blocks
    }

    fn is_skipped(&self, text: &str) -> bool {
        text.is_empty() || self.header_footer.contains(text)
    }

    fn classify(&self, line: &Line) -> LineKind {
        let features = LineFeatures::of(line, self.avg_font_size);
        if let Some(level) = detect_heading(&features, &self.thresholds) {
            return LineKind::Heading(level);
        }
        match detect_list_marker(features.text) {
            Some(marker) => LineKind::List(marker),
            None => LineKind::Text,
        }
    }

    /// Collect continuation lines starting at `start`. Returns the texts,
    /// the bottom of the last absorbed line and the index to resume from.
    fn absorb<'l>(
        &self,
        lines: &'l [Line],
        start: usize,
        first: &'l str,
        first_bottom: f32,
    ) -> (Vec<&'l str>, f32, usize) {
        let mut parts = vec![first];
        let mut y1 = first_bottom;
        let mut i = start;

        while i < lines.len() {
            let line = &lines[i];
            let text = line.trimmed();
            if self.is_skipped(text) {
                i += 1;
                continue;
            }
            if self.classify(line) != LineKind::Text {
                break;
            }
            parts.push(text);
            y1 = line.bottom();
            i += 1;
        }

        (parts, y1, i)
    }
}
