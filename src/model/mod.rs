//! Data model for layout analysis.
//!
//! Everything here is derived, read-only and scoped to a single conversion:
//! characters come from a [`crate::source::PageSource`], words and lines from
//! grouping, and blocks from classification and formatting.

mod block;
mod geometry;
mod text;

pub use block::{Block, BlockKind};
pub use geometry::BBox;
pub use text::{is_bold_font, is_italic_font, Character, Line, Word};
