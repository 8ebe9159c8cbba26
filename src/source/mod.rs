//! Page source abstraction.
//!
//! Layout analysis never touches a concrete PDF library. Everything it needs
//! from a page (positioned characters, table grids, image placements and
//! image bytes) comes through [`PageSource`], and pages come from a
//! [`DocumentSource`]. Two implementations ship with the crate:
//!
//! - [`LopdfDocument`]: interprets real PDF content streams through `lopdf`
//! - [`MemoryDocument`]: pre-built geometry, for tests and for callers that
//!   already run another extraction toolkit

mod content;
mod memory;
mod pdf;
mod table_detector;

pub use content::{
    decode_text_simple, ContentInterpreter, FontMetrics, Matrix, PageContent, PageFrame, Segment,
};
pub use memory::{MemoryDocument, MemoryImage, MemoryPage};
pub use pdf::{detect_version, LopdfDocument};
pub use table_detector::{TableDetector, TableDetectorConfig};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{BBox, Character};

/// A table found on a page: its bounding box and a grid of cell texts.
///
/// `None` cells are covered by a neighbouring merged cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    /// Table area in page coordinates
    pub bbox: BBox,
    /// Rows of cells
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Create a new table.
    pub fn new(bbox: BBox, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { bbox, rows }
    }
}

/// An image referenced by a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Position of the image in the page's image list
    pub index: usize,
    /// Resource name or other source-specific identifier
    pub name: String,
    /// First placement on the page; `None` when the image is never drawn
    pub bbox: Option<BBox>,
}

/// Encoded image bytes ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Encoded file content
    pub bytes: Vec<u8>,
    /// File extension without the dot, e.g. "png"
    pub extension: String,
}

impl ImageData {
    /// Create new image data.
    pub fn new(bytes: Vec<u8>, extension: impl Into<String>) -> Self {
        Self {
            bytes,
            extension: extension.into(),
        }
    }
}

/// Everything layout analysis reads from one page.
pub trait PageSource {
    /// Zero-based page index.
    fn index(&self) -> usize;

    /// Page width in points.
    fn width(&self) -> f32;

    /// Page height in points.
    fn height(&self) -> f32;

    /// Characters in content order, in top-down page coordinates.
    fn characters(&self) -> Result<Vec<Character>>;

    /// Tables detected on the page.
    fn tables(&self) -> Result<Vec<RawTable>>;

    /// Images referenced by the page, in a stable order.
    fn images(&self) -> Result<Vec<ImageRef>>;

    /// Extract the bytes of one image.
    fn image_data(&self, image: &ImageRef) -> Result<ImageData>;
}

impl<T: PageSource + ?Sized> PageSource for &T {
    fn index(&self) -> usize {
        (**self).index()
    }

    fn width(&self) -> f32 {
        (**self).width()
    }

    fn height(&self) -> f32 {
        (**self).height()
    }

    fn characters(&self) -> Result<Vec<Character>> {
        (**self).characters()
    }

    fn tables(&self) -> Result<Vec<RawTable>> {
        (**self).tables()
    }

    fn images(&self) -> Result<Vec<ImageRef>> {
        (**self).images()
    }

    fn image_data(&self, image: &ImageRef) -> Result<ImageData> {
        (**self).image_data(image)
    }
}

/// A document as an ordered collection of pages.
pub trait DocumentSource {
    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Open the page at a zero-based index.
    fn page(&self, index: usize) -> Result<Box<dyn PageSource + '_>>;
}
