//! Running header and footer detection.

use std::collections::{HashMap, HashSet};

use crate::model::Character;

use super::config::HeaderFooterConfig;

/// Characters and height of one page, as seen by the detector.
#[derive(Debug, Clone, Copy)]
pub struct PageSample<'a> {
    /// Page height in points
    pub height: f32,
    /// All characters of the page
    pub chars: &'a [Character],
}

impl<'a> PageSample<'a> {
    /// Create a new sample.
    pub fn new(height: f32, chars: &'a [Character]) -> Self {
        Self { height, chars }
    }
}

/// Finds line texts repeated in the top or bottom margin of most pages.
#[derive(Debug, Clone)]
pub struct HeaderFooterDetector {
    config: HeaderFooterConfig,
    word_gap: f32,
}

impl HeaderFooterDetector {
    /// Create a detector. `word_gap` is the horizontal gap that separates
    /// words, so zone lines read the same as body lines.
    pub fn new(config: HeaderFooterConfig, word_gap: f32) -> Self {
        Self { config, word_gap }
    }

    /// Scan all pages and return the set of repeated header/footer texts.
    ///
    /// Only pages with characters take part. Returns an empty set when fewer
    /// than `min_pages` such pages exist.
    pub fn detect(&self, pages: &[PageSample<'_>]) -> HashSet<String> {
        let mut result = HashSet::new();
        let pages: Vec<&PageSample<'_>> = pages.iter().filter(|p| !p.chars.is_empty()).collect();
        if pages.len() < self.config.min_pages {
            log::debug!(
                "Header/footer detection skipped: {} pages with text < {}",
                pages.len(),
                self.config.min_pages
            );
            return result;
        }

        let mut header_counts: HashMap<String, usize> = HashMap::new();
        let mut footer_counts: HashMap<String, usize> = HashMap::new();
        for page in &pages {
            let (headers, footers) = self.zone_lines(page);
            for text in headers {
                *header_counts.entry(text).or_default() += 1;
            }
            for text in footers {
                *footer_counts.entry(text).or_default() += 1;
            }
        }

        let threshold = pages.len() / 2;
        for (text, count) in header_counts.into_iter().chain(footer_counts) {
            if count >= threshold && text.chars().count() >= self.config.min_text_len {
                result.insert(text);
            }
        }

        log::info!("Detected {} header/footer texts to exclude", result.len());
        result
    }

    /// Distinct line texts found in the header and footer zones of one page.
    fn zone_lines(&self, page: &PageSample<'_>) -> (HashSet<String>, HashSet<String>) {
        let header_limit = page.height * self.config.zone_fraction;
        let footer_start = page.height * (1.0 - self.config.zone_fraction);

        let mut sorted: Vec<&Character> = page.chars.iter().collect();
        sorted.sort_by(|a, b| a.top().total_cmp(&b.top()).then(a.bbox.x0.total_cmp(&b.bbox.x0)));

        let mut headers = HashSet::new();
        let mut footers = HashSet::new();
        let mut emit = |line: &[&Character], top: f32| {
            let text = self.join_line(line);
            if text.is_empty() {
                return;
            }
            if top <= header_limit {
                headers.insert(text);
            } else if top >= footer_start {
                footers.insert(text);
            }
        };

        let mut current: Vec<&Character> = Vec::new();
        let mut prev_top: Option<f32> = None;
        for ch in sorted {
            if let Some(top) = prev_top {
                if (ch.top() - top).abs() >= self.config.line_gap {
                    emit(&current, top);
                    current.clear();
                }
            }
            current.push(ch);
            prev_top = Some(ch.top());
        }
        if let Some(top) = prev_top {
            emit(&current, top);
        }

        (headers, footers)
    }

    fn join_line(&self, line: &[&Character]) -> String {
        let mut chars = line.to_vec();
        chars.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));

        let mut text = String::new();
        let mut prev_x1: Option<f32> = None;
        for ch in chars {
            if let Some(x1) = prev_x1 {
                if ch.bbox.x0 - x1 >= self.word_gap && !text.ends_with(' ') {
                    text.push(' ');
                }
            }
            text.push_str(&ch.text);
            prev_x1 = Some(ch.bbox.x1);
        }
        text.trim().to_string()
    }
}

impl Default for HeaderFooterDetector {
    fn default() -> Self {
        Self::new(HeaderFooterConfig::default(), 3.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BBox;

    fn text_at(text: &str, x: f32, top: f32) -> Vec<Character> {
        text.chars()
            .enumerate()
            .map(|(i, c)| {
                let x0 = x + i as f32 * 5.0;
                let bbox = BBox::new(x0, top, x0 + 5.0, top + 10.0);
                Character::new(c.to_string(), bbox, 10.0, "Helvetica")
            })
            .collect()
    }

    fn page(lines: &[(&str, f32)]) -> Vec<Character> {
        lines
            .iter()
            .flat_map(|(text, top)| text_at(text, 72.0, *top))
            .collect()
    }

    fn sample_all(pages: &[Vec<Character>]) -> Vec<PageSample<'_>> {
        pages.iter().map(|c| PageSample::new(792.0, c)).collect()
    }

    #[test]
    fn test_repeated_header_and_footer() {
        let pages: Vec<Vec<Character>> = (1..=4)
            .map(|n| {
                let body = format!("Body text of page {}", n);
                page(&[
                    ("ACME Corp", 30.0),
                    (body.as_str(), 300.0),
                    ("Confidential", 760.0),
                ])
            })
            .collect();
        let samples = sample_all(&pages);

        let found = HeaderFooterDetector::default().detect(&samples);
        assert!(found.contains("ACME Corp"));
        assert!(found.contains("Confidential"));
        assert!(!found.iter().any(|t| t.starts_with("Body")));
    }

    #[test]
    fn test_short_documents_yield_nothing() {
        let pages: Vec<Vec<Character>> = (0..2).map(|_| page(&[("ACME Corp", 30.0)])).collect();
        let samples = sample_all(&pages);
        assert!(HeaderFooterDetector::default().detect(&samples).is_empty());
    }

    #[test]
    fn test_blank_pages_do_not_count() {
        let mut pages: Vec<Vec<Character>> = (0..2).map(|_| page(&[("ACME Corp", 30.0)])).collect();
        pages.push(vec![]);
        let samples = sample_all(&pages);
        assert!(HeaderFooterDetector::default().detect(&samples).is_empty());
    }

    #[test]
    fn test_short_texts_are_ignored() {
        let pages: Vec<Vec<Character>> = (0..3)
            .map(|_| page(&[("p. 1", 30.0), ("Ref", 770.0)]))
            .collect();
        let samples = sample_all(&pages);
        let found = HeaderFooterDetector::default().detect(&samples);
        assert!(found.contains("p. 1"));
        assert!(!found.contains("Ref"));
    }

    #[test]
    fn test_varying_page_numbers_are_not_repeated() {
        let pages: Vec<Vec<Character>> = (1..=6)
            .map(|n| page(&[(format!("Page {} of 6", n).as_str(), 770.0)]))
            .collect();
        let samples = sample_all(&pages);
        assert!(HeaderFooterDetector::default().detect(&samples).is_empty());
    }

    #[test]
    fn test_half_of_pages_is_enough() {
        // "Draft edition" on 2 of 4 pages, "Errata notice" on 1 of 4.
        let pages: Vec<Vec<Character>> = (0..4)
            .map(|n| {
                let mut lines = vec![("Body text", 300.0)];
                if n < 2 {
                    lines.push(("Draft edition", 30.0));
                }
                if n == 3 {
                    lines.push(("Errata notice", 770.0));
                }
                page(&lines)
            })
            .collect();

        let found = HeaderFooterDetector::default().detect(&sample_all(&pages));
        assert!(found.contains("Draft edition"));
        assert!(!found.contains("Errata notice"));
    }

    #[test]
    fn test_zone_text_inserts_word_spaces() {
        let mut chars = text_at("ACME", 72.0, 30.0);
        chars.extend(text_at("Corp", 100.0, 30.0));
        let detector = HeaderFooterDetector::default();
        let (headers, _) = detector.zone_lines(&PageSample::new(792.0, &chars));
        assert!(headers.contains("ACME Corp"));
    }
}
