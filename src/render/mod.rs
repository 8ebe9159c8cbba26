//! Markdown rendering of page elements and the final document.

mod image;
mod merge;
mod postprocess;
mod table;

pub use image::{ExtractedImage, ImageExtractor};
pub use merge::merge_page;
pub use postprocess::{PostProcessOptions, PostProcessor};
pub use table::table_to_markdown;
