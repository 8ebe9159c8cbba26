//! PDF to Markdown conversion.
//!
//! A [`Converter`] owns its options and nothing else, so one value can be
//! shared by any number of threads converting different documents.
//!
//! # Example
//!
//! ```no_run
//! use pdfdown::convert::{ConvertOptions, Converter};
//!
//! fn main() -> pdfdown::Result<()> {
//!     let converter = Converter::new(
//!         ConvertOptions::new()
//!             .with_output_dir("out")
//!             .with_image_output_dir("out/images")
//!             .with_public_image_path("/images"),
//!     );
//!
//!     let output = converter.convert("contract.pdf")?;
//!     println!("{}", output.markdown_path.display());
//!     Ok(())
//! }
//! ```

mod options;
mod report;

pub use options::{ConvertOptions, ErrorMode};
pub use report::{ConversionOutput, ConversionReport};

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::layout::{LayoutAnalyzer, PageSample};
use crate::model::{Block, Character};
use crate::render::{merge_page, table_to_markdown, ImageExtractor, PostProcessor};
use crate::source::{DocumentSource, LopdfDocument, PageSource, RawTable};

/// Converts documents to Markdown files.
#[derive(Debug, Clone)]
pub struct Converter {
    options: ConvertOptions,
    analyzer: LayoutAnalyzer,
    post_processor: PostProcessor,
}

impl Converter {
    /// Create a converter.
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            analyzer: LayoutAnalyzer::new(options.layout),
            post_processor: PostProcessor::new(options.post_process),
            options,
        }
    }

    /// The options in use.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert a PDF file.
    ///
    /// The Markdown file is named after the custom filename, or the PDF's
    /// stem, and is written only once the whole document has been rendered.
    pub fn convert<P: AsRef<Path>>(&self, pdf_path: P) -> Result<ConversionOutput> {
        let path = pdf_path.as_ref();
        log::info!("Converting {}", path.display());
        let document = LopdfDocument::open(path)?;
        self.convert_document(&document, &document_stem(path))
    }

    /// Convert any document source. `base_name` prefixes image file names
    /// and names the output when no custom filename is set.
    pub fn convert_document(
        &self,
        document: &dyn DocumentSource,
        base_name: &str,
    ) -> Result<ConversionOutput> {
        self.prepare_output_dirs()?;
        let (markdown, report) = self.render_document(document, base_name)?;

        let file_name = output_file_name(self.options.custom_filename.as_deref(), base_name);
        let markdown_path = self.options.output_dir.join(file_name);
        std::fs::write(&markdown_path, markdown)?;

        log::info!(
            "Wrote {} ({} pages, {} tables, {} images, {} skipped)",
            markdown_path.display(),
            report.page_count,
            report.table_count,
            report.image_count,
            report.skipped()
        );
        Ok(ConversionOutput {
            markdown_path,
            report,
        })
    }

    /// Render a document to Markdown without writing the Markdown file.
    ///
    /// Images are still written to the image output directory, which must
    /// exist; failed writes are counted as skipped images.
    pub fn render_document(
        &self,
        document: &dyn DocumentSource,
        base_name: &str,
    ) -> Result<(String, ConversionReport)> {
        let mut report = ConversionReport::new();
        let page_count = document.page_count();
        report.page_count = page_count as u32;

        let pages = (0..page_count)
            .map(|index| document.page(index))
            .collect::<Result<Vec<_>>>()?;

        let mut page_chars = Vec::with_capacity(pages.len());
        for page in &pages {
            let chars = self.page_characters(page.as_ref())?;
            if chars.is_empty() {
                report.pages_without_text += 1;
            }
            page_chars.push(chars);
        }

        let header_footer = if self.options.detect_headers_footers {
            let samples: Vec<PageSample<'_>> = pages
                .iter()
                .zip(&page_chars)
                .map(|(page, chars)| PageSample::new(page.height(), chars))
                .collect();
            self.analyzer.header_footer_detector().detect(&samples)
        } else {
            HashSet::new()
        };
        report.header_footer_lines = header_footer.len() as u32;

        let images = ImageExtractor::new(
            &self.options.image_output_dir,
            self.options.public_image_path.as_str(),
            base_name,
        );

        let mut markdown = String::new();
        for (page, chars) in pages.iter().zip(&page_chars) {
            let content =
                self.render_page(page.as_ref(), chars, &header_footer, &images, &mut report)?;
            markdown.push_str(&content);
            markdown.push_str("\n\n");
        }

        Ok((self.post_processor.process(&markdown), report))
    }

    fn prepare_output_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.options.output_dir)?;
        std::fs::create_dir_all(&self.options.image_output_dir)?;
        Ok(())
    }

    fn page_characters(&self, page: &dyn PageSource) -> Result<Vec<Character>> {
        self.recover(page, "text", page.characters())
    }

    /// Apply the error mode to a page-level extraction result.
    fn recover<T>(
        &self,
        page: &dyn PageSource,
        what: &str,
        result: Result<Vec<T>>,
    ) -> Result<Vec<T>> {
        match result {
            Ok(items) => Ok(items),
            Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                log::warn!("Page {}: no {} extracted: {}", page.index(), what, e);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    fn render_page(
        &self,
        page: &dyn PageSource,
        chars: &[Character],
        header_footer: &HashSet<String>,
        images: &ImageExtractor,
        report: &mut ConversionReport,
    ) -> Result<String> {
        let mut exclusion_zones = Vec::new();

        let mut table_blocks = Vec::new();
        if self.options.extract_tables {
            for table in self.recover(page, "tables", page.tables())? {
                if table.bbox.is_valid() {
                    exclusion_zones.push(table.bbox);
                }
                match table_block(&table) {
                    Ok(block) => {
                        table_blocks.push(block);
                        report.table_count += 1;
                    }
                    Err(e) => {
                        log::warn!("Page {}: skipping table: {}", page.index(), e);
                        report.tables_skipped += 1;
                    }
                }
            }
        }

        let mut image_blocks = Vec::new();
        if self.options.extract_images {
            for image in self.recover(page, "images", page.images())? {
                let Some(bbox) = image.bbox else {
                    log::debug!("Page {}: image {} is never drawn", page.index(), image.name);
                    continue;
                };
                exclusion_zones.push(bbox);
                match images.extract(page, &image) {
                    Ok(extracted) => {
                        image_blocks.push(Block::image(extracted.markdown, bbox.top, bbox.bottom));
                        report.image_count += 1;
                    }
                    Err(e) => {
                        log::warn!("Page {}: skipping image {}: {}", page.index(), image.name, e);
                        report.images_skipped += 1;
                    }
                }
            }
        }

        let text_blocks = self.analyzer.text_blocks(chars, &exclusion_zones, header_footer);
        report.record_text_blocks(&text_blocks);

        log::debug!(
            "Page {}: {} text blocks, {} tables, {} images",
            page.index(),
            text_blocks.len(),
            table_blocks.len(),
            image_blocks.len()
        );
        Ok(merge_page(text_blocks, table_blocks, image_blocks))
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}

fn table_block(table: &RawTable) -> Result<Block> {
    if !table.bbox.is_valid() {
        return Err(Error::TableExtract(format!("invalid bounding box {:?}", table.bbox)));
    }
    let markdown = table_to_markdown(&table.rows);
    if markdown.is_empty() {
        return Err(Error::TableExtract("table has no header cells".to_string()));
    }
    Ok(Block::table(markdown, table.bbox.top, table.bbox.bottom))
}

fn document_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "document".to_string())
}

/// Name of the Markdown file: the custom name with `.md` appended unless it
/// already ends with it (any case), otherwise `{stem}.md`.
pub fn output_file_name(custom_filename: Option<&str>, stem: &str) -> String {
    match custom_filename.filter(|name| !name.is_empty()) {
        Some(name) if name.to_lowercase().ends_with(".md") => name.to_string(),
        Some(name) => format!("{}.md", name),
        None => format!("{}.md", stem),
    }
}

/// Convert a PDF with default options and return the Markdown file path.
///
/// `public_image_path` is used verbatim as the prefix of image links.
pub fn convert<P: AsRef<Path>>(
    pdf_path: P,
    output_dir: impl Into<PathBuf>,
    image_output_dir: impl Into<PathBuf>,
    public_image_path: &str,
    custom_filename: Option<&str>,
) -> Result<PathBuf> {
    let mut options = ConvertOptions::new()
        .with_output_dir(output_dir)
        .with_image_output_dir(image_output_dir)
        .with_public_image_path(public_image_path);
    options.custom_filename = custom_filename.map(str::to_string);

    Ok(Converter::new(options).convert(pdf_path)?.markdown_path)
}
