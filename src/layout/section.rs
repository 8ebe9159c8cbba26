//! Rejoin section numbers laid out apart from their heading text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::Line;

/// A line holding nothing but a section number: `20`, `20.`, `1.1.1`.
static SECTION_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+(\.\d+)*\.?)$").unwrap());

/// Whether a trimmed line text is a bare section number.
pub fn is_section_number(text: &str) -> bool {
    SECTION_NUMBER.is_match(text)
}

/// Merge every bare section-number line with the line that follows it.
///
/// The merged line spans both boxes, takes the larger font size and keeps
/// the text line's font. A merged line is never merged again.
pub fn merge_section_numbers(lines: Vec<Line>) -> Vec<Line> {
    let mut merged = Vec::with_capacity(lines.len());
    let mut iter = lines.into_iter();

    while let Some(line) = iter.next() {
        if is_section_number(line.trimmed()) {
            if let Some(next) = iter.next() {
                log::debug!(
                    "Merging section number {:?} with {:?}",
                    line.trimmed(),
                    next.trimmed()
                );
                merged.push(Line::new(
                    format!("{} {}", line.trimmed(), next.trimmed()),
                    line.bbox.union(&next.bbox),
                    line.size.max(next.size),
                    next.font_name,
                ));
                continue;
            }
        }
        merged.push(line);
    }

    merged
}
