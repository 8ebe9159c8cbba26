//! # pdfdown
//!
//! Layout-aware PDF to Markdown conversion.
//!
//! Pages are read as positioned characters, ruled tables and placed images.
//! Characters are grouped into words and lines, lines are classified as
//! headings, list items or paragraphs from font size, weight and numbering,
//! and everything is merged back in reading order.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfdown::convert;
//!
//! fn main() -> pdfdown::Result<()> {
//!     let path = convert("contract.pdf", "out", "out/images", "/images", None)?;
//!     println!("Markdown written to {}", path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Headings**: numbered sections and font-size ratios mapped to `#`..`###`
//! - **Lists**: bullets, dashes, numbers, letters and roman numerals with nesting
//! - **Tables**: ruled grids rendered as GFM tables, merged cells included
//! - **Images**: written to disk and linked in reading order
//! - **Running headers/footers**: text repeated on most pages is dropped
//! - **Pluggable input**: any [`source::DocumentSource`] can be converted

pub mod convert;
pub mod error;
pub mod layout;
pub mod model;
pub mod render;
pub mod source;

// Re-export commonly used types
pub use convert::{
    convert, output_file_name, ConversionOutput, ConversionReport, ConvertOptions, Converter,
    ErrorMode,
};
pub use error::{Error, Result};
pub use layout::{GroupingConfig, HeaderFooterConfig, HeadingThresholds, LayoutConfig};
pub use model::{BBox, Block, BlockKind, Character, Line, Word};
pub use render::{table_to_markdown, PostProcessOptions};
pub use source::{DocumentSource, LopdfDocument, MemoryDocument, MemoryPage, PageSource};

use std::path::Path;

/// Check whether data starts with a readable PDF header.
///
/// # Example
///
/// ```
/// assert!(pdfdown::is_pdf(b"%PDF-1.7\n"));
/// assert!(!pdfdown::is_pdf(b"PK\x03\x04"));
/// ```
pub fn is_pdf(data: &[u8]) -> bool {
    source::detect_version(data).is_ok()
}

/// Render a PDF file to a Markdown string without writing any file.
///
/// Images are not extracted.
///
/// # Example
///
/// ```no_run
/// let markdown = pdfdown::to_markdown("document.pdf").unwrap();
/// println!("{}", markdown);
/// ```
pub fn to_markdown<P: AsRef<Path>>(path: P) -> Result<String> {
    let document = LopdfDocument::open(path)?;
    markdown_of(&document)
}

/// Render PDF bytes to a Markdown string without writing any file.
///
/// Images are not extracted.
pub fn to_markdown_from_bytes(data: &[u8]) -> Result<String> {
    let document = LopdfDocument::from_bytes(data)?;
    markdown_of(&document)
}

fn markdown_of(document: &dyn DocumentSource) -> Result<String> {
    let converter = Converter::new(ConvertOptions::new().with_images(false));
    let (markdown, _) = converter.render_document(document, "document")?;
    Ok(markdown)
}
