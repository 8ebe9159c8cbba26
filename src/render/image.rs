//! Image extraction to disk and Markdown links.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::model::BBox;
use crate::source::{ImageRef, PageSource};

/// An image written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedImage {
    /// Placement on the page
    pub bbox: BBox,
    /// Written file
    pub path: PathBuf,
    /// Markdown image reference
    pub markdown: String,
}

/// Writes page images to an output directory and links them from Markdown.
#[derive(Debug, Clone)]
pub struct ImageExtractor {
    output_dir: PathBuf,
    public_path: String,
    base_name: String,
}

impl ImageExtractor {
    /// Create an extractor.
    ///
    /// `public_path` is used verbatim as the link prefix; `base_name` is the
    /// document stem that prefixes every file name.
    pub fn new(
        output_dir: impl Into<PathBuf>,
        public_path: impl Into<String>,
        base_name: impl Into<String>,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            public_path: public_path.into(),
            base_name: base_name.into(),
        }
    }

    /// Directory images are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// File name for an image: `{base}_p{page}_img{index}.{ext}`.
    pub fn file_name(&self, page: usize, index: usize, extension: &str) -> String {
        format!("{}_p{}_img{}.{}", self.base_name, page, index, extension)
    }

    /// Markdown reference to a written file.
    pub fn markdown_link(&self, file_name: &str) -> String {
        format!("![Image]({}/{})", self.public_path, file_name)
    }

    /// Extract one image of a page and write it to disk.
    ///
    /// Fails with [`Error::ImageExtract`] when the image has no placement or
    /// its bytes cannot be produced, and with [`Error::Io`] when the write
    /// fails.
    pub fn extract<P: PageSource + ?Sized>(
        &self,
        page: &P,
        image: &ImageRef,
    ) -> Result<ExtractedImage> {
        let bbox = image
            .bbox
            .ok_or_else(|| Error::ImageExtract(format!("image {} is never placed", image.name)))?;
        let data = page.image_data(image)?;
        if data.bytes.is_empty() {
            return Err(Error::ImageExtract(format!("image {} has no data", image.name)));
        }

        let file_name = self.file_name(page.index(), image.index, &data.extension);
        let path = self.output_dir.join(&file_name);
        std::fs::write(&path, &data.bytes)?;
        log::debug!("Wrote image {} ({} bytes)", path.display(), data.bytes.len());

        Ok(ExtractedImage {
            bbox,
            path,
            markdown: self.markdown_link(&file_name),
        })
    }
}
