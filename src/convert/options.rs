//! Conversion options.

use std::path::PathBuf;

use crate::layout::LayoutConfig;
use crate::render::PostProcessOptions;

/// How page-level extraction failures are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail the conversion when a page cannot be read
    Strict,
    /// Skip unreadable page content and continue
    #[default]
    Lenient,
}

/// Options for converting a PDF to Markdown.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Directory the Markdown file is written to
    pub output_dir: PathBuf,

    /// Directory extracted images are written to
    pub image_output_dir: PathBuf,

    /// Prefix of image links in the Markdown, used verbatim
    pub public_image_path: String,

    /// Output file name; the document stem is used when absent
    pub custom_filename: Option<String>,

    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Whether images are written and linked
    pub extract_images: bool,

    /// Whether ruled tables are rendered as Markdown tables
    pub extract_tables: bool,

    /// Whether running headers and footers are removed
    pub detect_headers_footers: bool,

    /// Final cleanup options
    pub post_process: PostProcessOptions,

    /// Layout thresholds
    pub layout: LayoutConfig,
}

impl ConvertOptions {
    /// Create options with defaults: output and images in the current
    /// directory, links relative to `images`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Markdown output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the image output directory.
    pub fn with_image_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_output_dir = dir.into();
        self
    }

    /// Set the prefix of image links.
    pub fn with_public_image_path(mut self, path: impl Into<String>) -> Self {
        self.public_image_path = path.into();
        self
    }

    /// Set the output file name.
    pub fn with_custom_filename(mut self, name: impl Into<String>) -> Self {
        self.custom_filename = Some(name.into());
        self
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Fail on unreadable pages.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Enable or disable image extraction.
    pub fn with_images(mut self, extract: bool) -> Self {
        self.extract_images = extract;
        self
    }

    /// Enable or disable table extraction.
    pub fn with_tables(mut self, extract: bool) -> Self {
        self.extract_tables = extract;
        self
    }

    /// Enable or disable header/footer removal.
    pub fn with_header_footer_detection(mut self, detect: bool) -> Self {
        self.detect_headers_footers = detect;
        self
    }

    /// Set post-processing options.
    pub fn with_post_process(mut self, options: PostProcessOptions) -> Self {
        self.post_process = options;
        self
    }

    /// Set layout thresholds.
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            image_output_dir: PathBuf::from("images"),
            public_image_path: "images".to_string(),
            custom_filename: None,
            error_mode: ErrorMode::Lenient,
            extract_images: true,
            extract_tables: true,
            detect_headers_footers: true,
            post_process: PostProcessOptions::default(),
            layout: LayoutConfig::default(),
        }
    }
}
