//! [`DocumentSource`] backed by `lopdf`.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::error::{Error, Result};
use crate::model::Character;

use super::content::{decode_text_simple, ContentInterpreter, FontMetrics, PageContent, PageFrame};
use super::table_detector::{TableDetector, TableDetectorConfig};
use super::{DocumentSource, ImageData, ImageRef, PageSource, RawTable};

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
/// Readers accept the header anywhere in the first kilobyte.
const HEADER_SEARCH_LEN: usize = 1024;
/// US Letter, used when no media box can be found.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];
/// Guard against cyclic `Parent` chains.
const MAX_INHERIT_DEPTH: usize = 32;

/// Check the `%PDF-x.y` header and return the version string.
pub fn detect_version(data: &[u8]) -> Result<String> {
    let window = &data[..data.len().min(HEADER_SEARCH_LEN)];
    let start = window
        .windows(PDF_MAGIC.len())
        .position(|w| w == PDF_MAGIC)
        .ok_or(Error::UnknownFormat)?;

    let version: String = data[start + PDF_MAGIC.len()..]
        .iter()
        .take(3)
        .map(|&b| b as char)
        .collect();

    let mut parts = version.split('.');
    let valid = matches!(
        (parts.next(), parts.next()),
        (Some(major), Some(minor))
            if major.len() == 1
                && minor.len() == 1
                && major.chars().all(|c| c.is_ascii_digit())
                && minor.chars().all(|c| c.is_ascii_digit())
    );
    if !valid {
        return Err(Error::UnsupportedVersion(version));
    }
    Ok(version)
}

/// A PDF document opened through `lopdf`.
pub struct LopdfDocument {
    doc: Document,
    pages: Vec<ObjectId>,
    detector: TableDetector,
}

impl LopdfDocument {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Parse a PDF held in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let version = detect_version(data)?;
        let doc = Document::load_mem(data)?;
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        log::debug!("Loaded PDF {} with {} pages", version, pages.len());

        Ok(Self {
            doc,
            pages,
            detector: TableDetector::new(),
        })
    }

    /// Use a custom table detector configuration.
    pub fn with_table_detector(mut self, config: TableDetectorConfig) -> Self {
        self.detector = TableDetector::with_config(config);
        self
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &Document {
        &self.doc
    }

    fn load_page(&self, index: usize) -> Result<LopdfPage<'_>> {
        let page_id = *self
            .pages
            .get(index)
            .ok_or(Error::PageOutOfRange(index, self.pages.len()))?;

        let frame = self.page_frame(page_id);
        let content = self.interpret(page_id, frame).map_err(|e| e.to_string());
        if let Err(msg) = &content {
            log::warn!("Page {}: cannot read content stream: {}", index + 1, msg);
        }
        let images = self.page_images(page_id, content.as_ref().ok());

        Ok(LopdfPage {
            index,
            frame,
            content,
            images,
            doc: &self.doc,
            detector: &self.detector,
        })
    }

    /// Look up a page attribute, following `Parent` links for inherited keys.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut dict = self.doc.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_INHERIT_DEPTH {
            if let Ok(obj) = dict.get(key) {
                return Some(resolve(&self.doc, obj));
            }
            let parent = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
            dict = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    fn page_frame(&self, page_id: ObjectId) -> PageFrame {
        let media_box = self
            .inherited(page_id, b"MediaBox")
            .and_then(|obj| obj.as_array().ok())
            .filter(|arr| arr.len() >= 4)
            .map(|arr| {
                let mut values = [0.0f32; 4];
                for (slot, obj) in values.iter_mut().zip(arr) {
                    *slot = resolve(&self.doc, obj).as_float().unwrap_or(0.0);
                }
                values
            })
            .unwrap_or(DEFAULT_MEDIA_BOX);
        PageFrame::from_media_box(media_box[0], media_box[1], media_box[2], media_box[3])
    }

    fn interpret(&self, page_id: ObjectId, frame: PageFrame) -> Result<PageContent> {
        let page_dict = self.doc.get_dictionary(page_id)?;
        if page_dict.get(b"Contents").is_err() {
            return Ok(PageContent::default());
        }

        let data = self
            .doc
            .get_page_content(page_id)
            .map_err(|e| Error::TextExtract(e.to_string()))?;
        let operations = Content::decode(&data)
            .map_err(|e| Error::TextExtract(e.to_string()))?
            .operations;

        let font_dicts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::TextExtract(e.to_string()))?;

        let mut fonts = HashMap::new();
        let mut encodings = HashMap::new();
        for (name, dict) in &font_dicts {
            fonts.insert(name.clone(), font_metrics(&self.doc, dict));
            if let Ok(encoding) = dict.get_font_encoding(&self.doc) {
                encodings.insert(name.clone(), encoding);
            }
        }

        let decoder = |font: &[u8], bytes: &[u8]| -> String {
            encodings
                .get(font)
                .and_then(|encoding| Document::decode_text(encoding, bytes).ok())
                .unwrap_or_else(|| decode_text_simple(bytes))
        };

        Ok(ContentInterpreter::new(frame, &fonts, &decoder).run(&operations))
    }

    /// Image XObjects from the page resources, in dictionary order.
    fn page_images(
        &self,
        page_id: ObjectId,
        content: Option<&PageContent>,
    ) -> Vec<(ImageRef, &Stream)> {
        let Some(xobjects) = self
            .inherited(page_id, b"Resources")
            .and_then(|res| res.as_dict().ok())
            .and_then(|res| res.get(b"XObject").ok())
            .and_then(|obj| resolve(&self.doc, obj).as_dict().ok())
        else {
            return vec![];
        };

        let mut images = Vec::new();
        for (name, obj) in xobjects.iter() {
            let Object::Stream(stream) = resolve(&self.doc, obj) else {
                continue;
            };
            let is_image = stream
                .dict
                .get(b"Subtype")
                .and_then(Object::as_name_str)
                .map(|s| s == "Image")
                .unwrap_or(false);
            if !is_image {
                continue;
            }

            let image = ImageRef {
                index: images.len(),
                name: String::from_utf8_lossy(name).to_string(),
                bbox: content.and_then(|c| c.placement(name)),
            };
            images.push((image, stream));
        }
        images
    }
}

impl DocumentSource for LopdfDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, index: usize) -> Result<Box<dyn PageSource + '_>> {
        Ok(Box::new(self.load_page(index)?))
    }
}

/// One interpreted page of a [`LopdfDocument`].
pub struct LopdfPage<'a> {
    index: usize,
    frame: PageFrame,
    content: std::result::Result<PageContent, String>,
    images: Vec<(ImageRef, &'a Stream)>,
    doc: &'a Document,
    detector: &'a TableDetector,
}

impl PageSource for LopdfPage<'_> {
    fn index(&self) -> usize {
        self.index
    }

    fn width(&self) -> f32 {
        self.frame.width
    }

    fn height(&self) -> f32 {
        self.frame.height
    }

    fn characters(&self) -> Result<Vec<Character>> {
        match &self.content {
            Ok(content) => Ok(content.chars.clone()),
            Err(msg) => Err(Error::TextExtract(msg.clone())),
        }
    }

    fn tables(&self) -> Result<Vec<RawTable>> {
        match &self.content {
            Ok(content) => Ok(self.detector.detect(&content.segments, &content.chars)),
            Err(msg) => Err(Error::TableExtract(msg.clone())),
        }
    }

    fn images(&self) -> Result<Vec<ImageRef>> {
        Ok(self.images.iter().map(|(image, _)| image.clone()).collect())
    }

    fn image_data(&self, image: &ImageRef) -> Result<ImageData> {
        let (_, stream) = self
            .images
            .iter()
            .find(|(candidate, _)| candidate.index == image.index)
            .ok_or_else(|| Error::ImageExtract(format!("no image {} on page", image.name)))?;
        encode_image(self.doc, stream)
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Glyph widths for a font dictionary.
fn font_metrics(doc: &Document, font: &Dictionary) -> FontMetrics {
    let base_font = font
        .get(b"BaseFont")
        .and_then(Object::as_name_str)
        .unwrap_or("Unknown")
        .to_string();
    let subtype = font
        .get(b"Subtype")
        .and_then(Object::as_name_str)
        .unwrap_or("");

    if subtype == "Type0" {
        return composite_metrics(doc, font, base_font);
    }

    let first_char = font
        .get(b"FirstChar")
        .and_then(Object::as_i64)
        .unwrap_or(0)
        .max(0) as u32;
    let widths = font
        .get(b"Widths")
        .ok()
        .and_then(|obj| resolve(doc, obj).as_array().ok())
        .map(|arr| {
            arr.iter()
                .map(|w| resolve(doc, w).as_float().unwrap_or(0.0))
                .collect()
        })
        .unwrap_or_default();

    FontMetrics::simple(base_font, first_char, widths)
}

/// Metrics for a Type0 font from its descendant's `DW` and `W` entries.
fn composite_metrics(doc: &Document, font: &Dictionary, base_font: String) -> FontMetrics {
    let mut metrics = FontMetrics {
        base_font,
        two_byte: true,
        default_width: 1000.0,
        ..FontMetrics::default()
    };

    let descendant = font
        .get(b"DescendantFonts")
        .ok()
        .and_then(|obj| resolve(doc, obj).as_array().ok())
        .and_then(|arr| arr.first())
        .and_then(|obj| resolve(doc, obj).as_dict().ok());
    let Some(descendant) = descendant else {
        return metrics;
    };

    if let Ok(dw) = descendant.get(b"DW").and_then(Object::as_float) {
        metrics.default_width = dw;
    }

    let Some(w) = descendant
        .get(b"W")
        .ok()
        .and_then(|obj| resolve(doc, obj).as_array().ok())
    else {
        return metrics;
    };

    // W is a sequence of `c [w1 w2 ...]` and `c_first c_last w` entries.
    // Entries with codes outside the u32 range are skipped.
    let mut i = 0;
    while i < w.len() {
        let Ok(first) = resolve(doc, &w[i]).as_i64() else {
            break;
        };
        let first = u32::try_from(first).ok();
        match w.get(i + 1).map(|obj| resolve(doc, obj)) {
            Some(Object::Array(run)) => {
                if let Some(first) = first {
                    for (offset, width) in run.iter().enumerate() {
                        let Some(code) = u32::try_from(offset)
                            .ok()
                            .and_then(|offset| first.checked_add(offset))
                        else {
                            break;
                        };
                        if let Ok(width) = resolve(doc, width).as_float() {
                            metrics.cid_widths.insert(code, width);
                        }
                    }
                }
                i += 2;
            }
            Some(last) => {
                let (Ok(last), Some(Ok(width))) = (
                    last.as_i64(),
                    w.get(i + 2).map(|obj| resolve(doc, obj).as_float()),
                ) else {
                    break;
                };
                if let (Some(first), Ok(last)) = (first, u32::try_from(last)) {
                    for code in first..=last.min(first.saturating_add(0xFFFF)) {
                        metrics.cid_widths.insert(code, width);
                    }
                }
                i += 3;
            }
            None => break,
        }
    }
    metrics
}

fn filter_names(dict: &Dictionary) -> Vec<String> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![String::from_utf8_lossy(name).to_string()],
        Ok(Object::Array(arr)) => arr
            .iter()
            .filter_map(|obj| obj.as_name_str().ok())
            .map(str::to_string)
            .collect(),
        _ => vec![],
    }
}

/// Number of colour components for a colour space we can encode.
fn color_components(doc: &Document, dict: &Dictionary) -> Result<usize> {
    let space = dict
        .get(b"ColorSpace")
        .map(|obj| resolve(doc, obj))
        .map_err(|_| Error::ImageExtract("image has no colour space".to_string()))?;
    let unsupported = || Error::ImageExtract(format!("unsupported colour space {:?}", space));

    match space {
        Object::Name(name) => match name.as_slice() {
            b"DeviceRGB" | b"CalRGB" => Ok(3),
            b"DeviceGray" | b"CalGray" => Ok(1),
            _ => Err(unsupported()),
        },
        Object::Array(arr) => match arr.first().and_then(|o| o.as_name_str().ok()) {
            Some("CalRGB") => Ok(3),
            Some("CalGray") => Ok(1),
            Some("ICCBased") => match arr.get(1).map(|obj| resolve(doc, obj)) {
                Some(Object::Stream(profile)) => {
                    icc_components(&profile.dict).ok_or_else(unsupported)
                }
                _ => Err(unsupported()),
            },
            _ => Err(unsupported()),
        },
        _ => Err(unsupported()),
    }
}

fn icc_components(dict: &Dictionary) -> Option<usize> {
    match dict.get(b"N").and_then(Object::as_i64).ok()? {
        1 => Some(1),
        3 => Some(3),
        _ => None,
    }
}

/// Encode an image XObject as a file: JPEG and JPEG 2000 streams are written
/// as-is, 8-bit gray and RGB samples are re-encoded as PNG.
fn encode_image(doc: &Document, stream: &Stream) -> Result<ImageData> {
    let filters = filter_names(&stream.dict);
    match filters.last().map(String::as_str) {
        Some("DCTDecode") if filters.len() == 1 => {
            return Ok(ImageData::new(stream.content.clone(), "jpg"));
        }
        Some("JPXDecode") if filters.len() == 1 => {
            return Ok(ImageData::new(stream.content.clone(), "jp2"));
        }
        Some("DCTDecode" | "JPXDecode" | "JBIG2Decode" | "CCITTFaxDecode") => {
            return Err(Error::ImageExtract(format!(
                "unsupported filter chain {:?}",
                filters
            )));
        }
        _ => {}
    }

    let dict = &stream.dict;
    let dimension = |key: &[u8]| -> Result<u32> {
        dict.get(key)
            .and_then(Object::as_i64)
            .ok()
            .filter(|v| *v > 0)
            .map(|v| v as u32)
            .ok_or_else(|| {
                Error::ImageExtract(format!("missing {}", String::from_utf8_lossy(key)))
            })
    };
    let width = dimension(b"Width")?;
    let height = dimension(b"Height")?;
    let bits = dict
        .get(b"BitsPerComponent")
        .and_then(Object::as_i64)
        .unwrap_or(8);
    if bits != 8 {
        return Err(Error::ImageExtract(format!(
            "{} bits per component is not supported",
            bits
        )));
    }
    let components = color_components(doc, dict)?;

    let mut samples = if filters.is_empty() {
        stream.content.clone()
    } else {
        stream
            .decompressed_content()
            .map_err(|e| Error::ImageExtract(e.to_string()))?
    };
    let needed = width as usize * height as usize * components;
    if samples.len() < needed {
        return Err(Error::ImageExtract(format!(
            "expected {} bytes of samples for {}x{}, found {}",
            needed,
            width,
            height,
            samples.len()
        )));
    }
    samples.truncate(needed);

    let image = match components {
        1 => GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8),
        _ => RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8),
    }
    .ok_or_else(|| Error::ImageExtract("sample buffer does not fit image".to_string()))?;

    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(ImageData::new(bytes, "png"))
}
