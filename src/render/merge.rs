//! Reading-order merge of a page's blocks.

use crate::model::{Block, BlockKind};

/// Interleave text, table and image blocks by their top edge and join them.
///
/// The sort is stable, so blocks starting at the same height keep the order
/// text, tables, images. A blank line separates neighbours of different
/// kinds, two paragraphs, or two list items; other neighbours are joined by a
/// single newline.
pub fn merge_page(text: Vec<Block>, tables: Vec<Block>, images: Vec<Block>) -> String {
    let mut blocks: Vec<Block> = text.into_iter().chain(tables).chain(images).collect();
    blocks.sort_by(|a, b| a.y0.total_cmp(&b.y0));

    let mut out = String::new();
    let mut prev: Option<BlockKind> = None;
    for block in &blocks {
        if let Some(kind) = prev {
            out.push('\n');
            if needs_blank_line(kind, block.kind) {
                out.push('\n');
            }
        }
        out.push_str(&block.content);
        prev = Some(block.kind);
    }
    out
}

fn needs_blank_line(prev: BlockKind, next: BlockKind) -> bool {
    prev != next || matches!(prev, BlockKind::Text | BlockKind::List)
}
