//! GFM table formatting.

/// Render a cell grid as a GitHub-flavoured Markdown table.
///
/// Row 0 is the header. Data rows shorter than the header are padded with
/// empty cells and longer rows are truncated. `None` cells render empty.
/// Returns an empty string when there is no header cell.
pub fn table_to_markdown(rows: &[Vec<Option<String>>]) -> String {
    let Some(header) = rows.first() else {
        return String::new();
    };
    let width = header.len();
    if width == 0 {
        return String::new();
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format_row(header, width));
    lines.push(format!("| {} |", vec!["---"; width].join(" | ")));
    for row in &rows[1..] {
        lines.push(format_row(row, width));
    }
    lines.join("\n")
}

fn format_row(row: &[Option<String>], width: usize) -> String {
    let cells: Vec<String> = (0..width)
        .map(|i| row.get(i).and_then(|c| c.as_deref()).map(clean_cell).unwrap_or_default())
        .collect();
    format!("| {} |", cells.join(" | "))
}

/// Collapse internal whitespace (including newlines) and escape pipes.
fn clean_cell(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}
