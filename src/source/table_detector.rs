//! Table detection from ruling lines (lattice mode).
//!
//! Horizontal and vertical path segments are snapped onto shared grid lines,
//! joined when collinear, and grouped into connected grids. Each grid with at
//! least two cells becomes a table whose cells collect the characters whose
//! centres fall inside them. A cell whose left (or top) rule is missing is
//! merged into its neighbour and reported as `None`.

use crate::model::{BBox, Character};

use super::content::Segment;
use super::RawTable;

/// Table detector configuration.
#[derive(Debug, Clone, Copy)]
pub struct TableDetectorConfig {
    /// Rules closer than this are snapped onto one grid line
    pub snap_tolerance: f32,
    /// Collinear rules separated by less than this are joined
    pub join_tolerance: f32,
    /// Rules shorter than this are ignored
    pub min_edge_length: f32,
    /// Slack when testing whether two rules cross
    pub intersection_tolerance: f32,
    /// Horizontal gap between glyphs that inserts a space in cell text
    pub text_gap: f32,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            snap_tolerance: 3.0,
            join_tolerance: 3.0,
            min_edge_length: 3.0,
            intersection_tolerance: 3.0,
            text_gap: 3.0,
        }
    }
}

/// A horizontal or vertical rule: `pos` is the fixed coordinate and
/// `start..end` the extent along the other axis.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rule {
    pos: f32,
    start: f32,
    end: f32,
}

impl Rule {
    fn length(&self) -> f32 {
        self.end - self.start
    }
}

/// Detects ruled tables on a page.
#[derive(Debug, Clone, Default)]
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    /// Create a new table detector with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new table detector with custom configuration.
    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// Detect tables from ruling segments and fill their cells from `chars`.
    ///
    /// Tables are returned top to bottom.
    pub fn detect(&self, segments: &[Segment], chars: &[Character]) -> Vec<RawTable> {
        log::debug!("TableDetector: starting with {} segments", segments.len());

        let mut horizontals: Vec<Rule> = segments
            .iter()
            .filter(|s| s.is_horizontal())
            .map(|s| Rule {
                pos: (s.top + s.bottom) / 2.0,
                start: s.x0,
                end: s.x1,
            })
            .collect();
        let mut verticals: Vec<Rule> = segments
            .iter()
            .filter(|s| s.is_vertical())
            .map(|s| Rule {
                pos: (s.x0 + s.x1) / 2.0,
                start: s.top,
                end: s.bottom,
            })
            .collect();

        snap(&mut horizontals, self.config.snap_tolerance);
        snap(&mut verticals, self.config.snap_tolerance);
        let horizontals = self.join_and_filter(horizontals);
        let verticals = self.join_and_filter(verticals);

        log::debug!(
            "TableDetector: {} horizontal and {} vertical rules after snapping",
            horizontals.len(),
            verticals.len()
        );

        if horizontals.len() < 2 || verticals.len() < 2 {
            return vec![];
        }

        let mut tables: Vec<RawTable> = self
            .components(&horizontals, &verticals)
            .into_iter()
            .filter_map(|(h, v)| self.build_table(&h, &v, chars))
            .collect();
        tables.sort_by(|a, b| a.bbox.top.total_cmp(&b.bbox.top));

        log::debug!("TableDetector: found {} tables", tables.len());
        tables
    }

    fn join_and_filter(&self, mut rules: Vec<Rule>) -> Vec<Rule> {
        rules.sort_by(|a, b| a.pos.total_cmp(&b.pos).then(a.start.total_cmp(&b.start)));

        let mut joined: Vec<Rule> = Vec::with_capacity(rules.len());
        for rule in rules {
            match joined.last_mut() {
                Some(last)
                    if last.pos == rule.pos
                        && rule.start <= last.end + self.config.join_tolerance =>
                {
                    last.end = last.end.max(rule.end);
                }
                _ => joined.push(rule),
            }
        }

        joined.retain(|r| r.length() >= self.config.min_edge_length);
        joined
    }

    /// Group rules into connected grids via their crossings.
    fn components(&self, horizontals: &[Rule], verticals: &[Rule]) -> Vec<(Vec<Rule>, Vec<Rule>)> {
        let tol = self.config.intersection_tolerance;
        let nh = horizontals.len();
        let mut sets = DisjointSets::new(nh + verticals.len());

        for (i, h) in horizontals.iter().enumerate() {
            for (j, v) in verticals.iter().enumerate() {
                let crosses = v.pos >= h.start - tol
                    && v.pos <= h.end + tol
                    && h.pos >= v.start - tol
                    && h.pos <= v.end + tol;
                if crosses {
                    sets.union(i, nh + j);
                }
            }
        }

        let mut roots: Vec<usize> = Vec::new();
        let mut groups: Vec<(Vec<Rule>, Vec<Rule>)> = Vec::new();
        for idx in 0..nh + verticals.len() {
            let root = sets.find(idx);
            let slot = match roots.iter().position(|r| *r == root) {
                Some(slot) => slot,
                None => {
                    roots.push(root);
                    groups.push((Vec::new(), Vec::new()));
                    groups.len() - 1
                }
            };
            if idx < nh {
                groups[slot].0.push(horizontals[idx]);
            } else {
                groups[slot].1.push(verticals[idx - nh]);
            }
        }
        groups
    }

    fn build_table(
        &self,
        horizontals: &[Rule],
        verticals: &[Rule],
        chars: &[Character],
    ) -> Option<RawTable> {
        let ys = distinct_positions(horizontals);
        let xs = distinct_positions(verticals);
        if ys.len() < 2 || xs.len() < 2 {
            return None;
        }

        let n_rows = ys.len() - 1;
        let n_cols = xs.len() - 1;
        let tol = self.config.intersection_tolerance;

        // A cell exists unless the rule separating it from its left or upper
        // neighbour is absent; absent cells are merged into that neighbour.
        let mut slots = vec![vec![Slot::Own; n_cols]; n_rows];
        for r in 0..n_rows {
            let mid_y = (ys[r] + ys[r + 1]) / 2.0;
            for c in 0..n_cols {
                let mid_x = (xs[c] + xs[c + 1]) / 2.0;
                slots[r][c] = if c > 0 && !covers(verticals, xs[c], mid_y, tol) {
                    Slot::MergedLeft
                } else if r > 0 && !covers(horizontals, ys[r], mid_x, tol) {
                    Slot::MergedUp
                } else {
                    Slot::Own
                };
            }
        }

        let cell_count = slots.iter().flatten().filter(|s| **s == Slot::Own).count();
        if cell_count < 2 {
            log::debug!(
                "TableDetector: grid {}x{} has {} cell(s), skipping",
                n_rows,
                n_cols,
                cell_count
            );
            return None;
        }

        let bbox = BBox::new(xs[0], ys[0], xs[n_cols], ys[n_rows]);
        let mut buckets: Vec<Vec<Vec<&Character>>> = vec![vec![Vec::new(); n_cols]; n_rows];
        for ch in chars {
            let (cx, cy) = (ch.bbox.center_x(), ch.bbox.center_y());
            let (Some(c), Some(r)) = (slot_of(&xs, cx), slot_of(&ys, cy)) else {
                continue;
            };
            let (r, c) = anchor(&slots, r, c);
            buckets[r][c].push(ch);
        }

        let rows = buckets
            .into_iter()
            .enumerate()
            .map(|(r, row)| {
                row.into_iter()
                    .enumerate()
                    .map(|(c, cell_chars)| {
                        (slots[r][c] == Slot::Own).then(|| self.cell_text(cell_chars))
                    })
                    .collect()
            })
            .collect();

        log::debug!("TableDetector: table {}x{} at {:?}", n_rows, n_cols, bbox);
        Some(RawTable::new(bbox, rows))
    }

    /// Join a cell's glyphs in reading order.
    fn cell_text(&self, mut chars: Vec<&Character>) -> String {
        chars.sort_by(|a, b| {
            a.bbox
                .top
                .total_cmp(&b.bbox.top)
                .then(a.bbox.x0.total_cmp(&b.bbox.x0))
        });

        let mut lines: Vec<Vec<&Character>> = Vec::new();
        for ch in chars {
            let tolerance = self.config.snap_tolerance;
            match lines.last_mut() {
                Some(line) if (ch.bbox.top - line[0].bbox.top).abs() < tolerance => line.push(ch),
                _ => lines.push(vec![ch]),
            }
        }

        lines
            .into_iter()
            .map(|mut line| {
                line.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
                let mut text = String::new();
                let mut prev_x1: Option<f32> = None;
                for ch in line {
                    if let Some(x1) = prev_x1 {
                        if ch.bbox.x0 - x1 >= self.config.text_gap && !text.ends_with(' ') {
                            text.push(' ');
                        }
                    }
                    text.push_str(&ch.text);
                    prev_x1 = Some(ch.bbox.x1);
                }
                text.trim().to_string()
            })
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Snap rule positions that lie within `tolerance` of each other onto their mean.
fn snap(rules: &mut [Rule], tolerance: f32) {
    let mut order: Vec<usize> = (0..rules.len()).collect();
    order.sort_by(|&a, &b| rules[a].pos.total_cmp(&rules[b].pos));

    let mut cluster: Vec<usize> = Vec::new();
    for idx in order {
        if let Some(&last) = cluster.last() {
            if rules[idx].pos - rules[last].pos > tolerance {
                settle(rules, &cluster);
                cluster.clear();
            }
        }
        cluster.push(idx);
    }
    settle(rules, &cluster);
}

fn settle(rules: &mut [Rule], cluster: &[usize]) {
    if cluster.is_empty() {
        return;
    }
    let mean = cluster.iter().map(|&i| rules[i].pos).sum::<f32>() / cluster.len() as f32;
    for &i in cluster {
        rules[i].pos = mean;
    }
}

fn distinct_positions(rules: &[Rule]) -> Vec<f32> {
    let mut positions: Vec<f32> = rules.iter().map(|r| r.pos).collect();
    positions.sort_by(|a, b| a.total_cmp(b));
    positions.dedup_by(|a, b| (*a - *b).abs() < 0.01);
    positions
}

/// Whether any rule on grid line `pos` spans the point `at`.
fn covers(rules: &[Rule], pos: f32, at: f32, tolerance: f32) -> bool {
    rules.iter().any(|r| {
        (r.pos - pos).abs() < 0.01 && at >= r.start - tolerance && at <= r.end + tolerance
    })
}

/// Index of the band `bounds[i]..bounds[i + 1]` containing `value`.
fn slot_of(bounds: &[f32], value: f32) -> Option<usize> {
    bounds
        .windows(2)
        .position(|w| value >= w[0] && value <= w[1])
}

/// Follow merges to the cell that owns a grid position.
///
/// `MergedLeft` only occurs with `c > 0` and `MergedUp` with `r > 0`, so the
/// walk always reaches an owned cell.
fn anchor(slots: &[Vec<Slot>], mut r: usize, mut c: usize) -> (usize, usize) {
    loop {
        match slots[r][c] {
            Slot::MergedLeft if c > 0 => c -= 1,
            Slot::MergedUp if r > 0 => r -= 1,
            _ => return (r, c),
        }
    }
}

/// Ownership of a grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Own,
    /// No rule on the left: part of the cell to the left
    MergedLeft,
    /// No rule above: part of the cell above
    MergedUp,
}

/// Union-find over rule indices.
struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[rb] = ra;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(x0: f32, x1: f32, y: f32) -> Segment {
        Segment::between((x0, y), (x1, y))
    }

    fn v(x: f32, top: f32, bottom: f32) -> Segment {
        Segment::between((x, top), (x, bottom))
    }

    fn word(text: &str, x: f32, top: f32) -> Vec<Character> {
        text.chars()
            .enumerate()
            .map(|(i, c)| {
                let x0 = x + i as f32 * 5.0;
                Character::new(
                    c.to_string(),
                    BBox::new(x0, top, x0 + 5.0, top + 10.0),
                    10.0,
                    "Helvetica",
                )
            })
            .collect()
    }

    /// 2 rows x 2 columns between x 100..300 and y 100..160.
    fn grid() -> Vec<Segment> {
        vec![
            h(100.0, 300.0, 100.0),
            h(100.0, 300.0, 130.0),
            h(100.0, 300.0, 160.0),
            v(100.0, 100.0, 160.0),
            v(200.0, 100.0, 160.0),
            v(300.0, 100.0, 160.0),
        ]
    }

    #[test]
    fn test_detect_simple_grid() {
        let mut chars = word("Name", 110.0, 110.0);
        chars.extend(word("Age", 210.0, 110.0));
        chars.extend(word("Ada", 110.0, 140.0));
        chars.extend(word("36", 210.0, 140.0));

        let tables = TableDetector::new().detect(&grid(), &chars);
        assert_eq!(tables.len(), 1);
        let table = &tables[0];
        assert_eq!(table.bbox, BBox::new(100.0, 100.0, 300.0, 160.0));
        assert_eq!(
            table.rows,
            vec![
                vec![Some("Name".to_string()), Some("Age".to_string())],
                vec![Some("Ada".to_string()), Some("36".to_string())],
            ]
        );
    }

    #[test]
    fn test_nearby_rules_are_snapped() {
        let mut segments = grid();
        segments[1] = h(100.0, 300.0, 131.5);
        segments[4] = v(201.0, 100.0, 160.0);
        let tables = TableDetector::new().detect(&segments, &[]);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows.len(), 2);
        assert_eq!(tables[0].rows[0].len(), 2);
    }

    #[test]
    fn test_page_frame_is_not_a_table() {
        let frame = vec![
            h(20.0, 592.0, 20.0),
            h(20.0, 592.0, 772.0),
            v(20.0, 20.0, 772.0),
            v(592.0, 20.0, 772.0),
        ];
        assert!(TableDetector::new().detect(&frame, &[]).is_empty());
    }

    #[test]
    fn test_lone_rules_are_ignored() {
        let segments = vec![h(72.0, 540.0, 400.0), h(72.0, 540.0, 420.0)];
        assert!(TableDetector::new().detect(&segments, &[]).is_empty());
    }

    #[test]
    fn test_missing_inner_rule_merges_cell() {
        // Middle vertical only spans the lower row.
        let segments = vec![
            h(100.0, 300.0, 100.0),
            h(100.0, 300.0, 130.0),
            h(100.0, 300.0, 160.0),
            v(100.0, 100.0, 160.0),
            v(200.0, 130.0, 160.0),
            v(300.0, 100.0, 160.0),
        ];
        let chars = word("Title", 220.0, 110.0);
        let tables = TableDetector::new().detect(&segments, &chars);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows[0], vec![Some("Title".to_string()), None]);
        assert_eq!(tables[0].rows[1], vec![Some(String::new()), Some(String::new())]);
    }

    #[test]
    fn test_vertical_merge_keeps_text_in_upper_cell() {
        // Middle horizontal only spans the left column.
        let segments = vec![
            h(100.0, 300.0, 100.0),
            h(100.0, 200.0, 130.0),
            h(100.0, 300.0, 160.0),
            v(100.0, 100.0, 160.0),
            v(200.0, 100.0, 160.0),
            v(300.0, 100.0, 160.0),
        ];
        let mut chars = word("A", 110.0, 110.0);
        chars.extend(word("B", 110.0, 140.0));
        chars.extend(word("tall", 210.0, 110.0));
        chars.extend(word("cell", 210.0, 140.0));

        let tables = TableDetector::new().detect(&segments, &chars);
        assert_eq!(tables.len(), 1);
        assert_eq!(
            tables[0].rows,
            vec![
                vec![Some("A".to_string()), Some("tall\ncell".to_string())],
                vec![Some("B".to_string()), None],
            ]
        );
    }

    #[test]
    fn test_separate_grids_sorted_top_down() {
        let mut segments: Vec<Segment> = grid()
            .into_iter()
            .map(|s| Segment {
                top: s.top + 400.0,
                bottom: s.bottom + 400.0,
                ..s
            })
            .collect();
        segments.extend(grid());
        let tables = TableDetector::new().detect(&segments, &[]);
        assert_eq!(tables.len(), 2);
        assert!(tables[0].bbox.top < tables[1].bbox.top);
    }

    #[test]
    fn test_cell_text_inserts_spaces_at_gaps() {
        let mut chars = word("ab", 110.0, 110.0);
        chars.extend(word("cd", 130.0, 110.0));
        let tables = TableDetector::new().detect(&grid(), &chars);
        assert_eq!(tables[0].rows[0][0], Some("ab cd".to_string()));
    }
}
