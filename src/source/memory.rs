//! In-memory page source.

use crate::error::{Error, Result};
use crate::model::{BBox, Character};

use super::{DocumentSource, ImageData, ImageRef, PageSource, RawTable};

/// Horizontal advance of a glyph laid out by [`MemoryPage::add_text`], as a
/// fraction of the font size.
const TEXT_ADVANCE: f32 = 0.5;

/// An image held in memory, possibly with a simulated extraction failure.
#[derive(Debug, Clone)]
pub struct MemoryImage {
    /// Placement on the page
    pub bbox: Option<BBox>,
    /// Image bytes, or the message of the extraction error
    pub data: std::result::Result<ImageData, String>,
}

impl MemoryImage {
    /// An image that extracts successfully.
    pub fn new(bbox: BBox, bytes: Vec<u8>, extension: impl Into<String>) -> Self {
        Self {
            bbox: Some(bbox),
            data: Ok(ImageData::new(bytes, extension)),
        }
    }

    /// An image whose extraction fails with the given message.
    pub fn failing(bbox: BBox, message: impl Into<String>) -> Self {
        Self {
            bbox: Some(bbox),
            data: Err(message.into()),
        }
    }
}

/// A page built from pre-computed geometry.
#[derive(Debug, Clone)]
pub struct MemoryPage {
    index: usize,
    width: f32,
    height: f32,
    characters: Vec<Character>,
    tables: Vec<RawTable>,
    images: Vec<MemoryImage>,
}

impl MemoryPage {
    /// Create an empty page.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            index: 0,
            width,
            height,
            characters: Vec::new(),
            tables: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Create an empty US Letter page.
    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }

    /// Append one character.
    pub fn add_char(&mut self, character: Character) -> &mut Self {
        self.characters.push(character);
        self
    }

    /// Lay out a string as touching glyphs starting at `(x, top)`.
    ///
    /// Each glyph advances by half the font size, so the whole string
    /// (spaces included) forms a single word.
    pub fn add_text(&mut self, text: &str, x: f32, top: f32, size: f32, font: &str) -> &mut Self {
        let advance = size * TEXT_ADVANCE;
        let mut cursor = x;
        for c in text.chars() {
            let bbox = BBox::new(cursor, top, cursor + advance, top + size);
            self.characters
                .push(Character::new(c.to_string(), bbox, size, font));
            cursor += advance;
        }
        self
    }

    /// Append a table.
    pub fn add_table(&mut self, table: RawTable) -> &mut Self {
        self.tables.push(table);
        self
    }

    /// Append an image.
    pub fn add_image(&mut self, image: MemoryImage) -> &mut Self {
        self.images.push(image);
        self
    }
}

impl PageSource for MemoryPage {
    fn index(&self) -> usize {
        self.index
    }

    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn characters(&self) -> Result<Vec<Character>> {
        Ok(self.characters.clone())
    }

    fn tables(&self) -> Result<Vec<RawTable>> {
        Ok(self.tables.clone())
    }

    fn images(&self) -> Result<Vec<ImageRef>> {
        Ok(self
            .images
            .iter()
            .enumerate()
            .map(|(index, image)| ImageRef {
                index,
                name: format!("img{}", index),
                bbox: image.bbox,
            })
            .collect())
    }

    fn image_data(&self, image: &ImageRef) -> Result<ImageData> {
        let stored = self
            .images
            .get(image.index)
            .ok_or_else(|| Error::ImageExtract(format!("no image at index {}", image.index)))?;
        stored.data.clone().map_err(Error::ImageExtract)
    }
}

/// A document made of [`MemoryPage`]s.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    pages: Vec<MemoryPage>,
}

impl MemoryDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page; its index is assigned from its position.
    pub fn add_page(&mut self, mut page: MemoryPage) -> &mut Self {
        page.index = self.pages.len();
        self.pages.push(page);
        self
    }

    /// Builder-style variant of [`MemoryDocument::add_page`].
    pub fn with_page(mut self, page: MemoryPage) -> Self {
        self.add_page(page);
        self
    }
}

impl DocumentSource for MemoryDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, index: usize) -> Result<Box<dyn PageSource + '_>> {
        let page = self
            .pages
            .get(index)
            .ok_or(Error::PageOutOfRange(index, self.pages.len()))?;
        Ok(Box::new(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_text_lays_out_touching_glyphs() {
        let mut page = MemoryPage::letter();
        page.add_text("Hi there", 72.0, 100.0, 10.0, "Helvetica");
        let chars = page.characters().unwrap();
        assert_eq!(chars.len(), 8);
        assert_eq!(chars[0].bbox, BBox::new(72.0, 100.0, 77.0, 110.0));
        assert_eq!(chars[1].bbox.x0, chars[0].bbox.x1);
    }

    #[test]
    fn test_page_indices_follow_insertion() {
        let doc = MemoryDocument::new()
            .with_page(MemoryPage::letter())
            .with_page(MemoryPage::letter());
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.page(1).unwrap().index(), 1);
        assert!(matches!(doc.page(2), Err(Error::PageOutOfRange(2, 2))));
    }

    #[test]
    fn test_failing_image() {
        let mut page = MemoryPage::letter();
        page.add_image(MemoryImage::failing(BBox::new(0.0, 0.0, 1.0, 1.0), "corrupt"));
        let images = page.images().unwrap();
        let err = page.image_data(&images[0]).unwrap_err();
        assert!(matches!(err, Error::ImageExtract(ref m) if m == "corrupt"));
    }
}
