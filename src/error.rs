//! Error types for the pdfdown library.

use std::io;
use thiserror::Error;

/// Result type alias for pdfdown operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting a PDF.
///
/// Only a subset is fatal for a conversion: opening the document and
/// preparing output directories. Table and image variants are produced by
/// per-element extraction and are logged and skipped by the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading the source or writing output files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file does not start with a PDF header.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF header carries an unparseable version.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Page index is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(usize, usize),

    /// Error extracting positioned characters from a page.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// A table's bounding box or grid is unusable.
    #[error("Table extraction error: {0}")]
    TableExtract(String),

    /// Error extracting or encoding an image.
    #[error("Image extraction error: {0}")]
    ImageExtract(String),

    /// Conversion options are inconsistent.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the pipeline may skip the offending element and continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::TableExtract(_) | Error::ImageExtract(_) | Error::TextExtract(_)
        )
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::ImageExtract(err.to_string())
    }
}
