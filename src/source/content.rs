//! Content stream interpretation.
//!
//! Walks decoded content stream operations and produces positioned glyphs,
//! axis-aligned ruling segments and image placements, all in top-down page
//! coordinates. Fonts and text decoding are supplied by the caller so the
//! interpreter itself stays independent of how a document resolves resources.

use std::collections::HashMap;

use lopdf::content::Operation;
use lopdf::Object;

use crate::model::{BBox, Character};

/// Ascent used to place a glyph's top above its baseline, in font-size units.
const ASCENT: f32 = 0.8;
/// Descent below the baseline, in font-size units.
const DESCENT: f32 = 0.2;
/// Maximum off-axis extent of a segment still treated as a straight rule.
const AXIS_TOLERANCE: f32 = 1.0;
/// Glyph width in 1/1000 text space units when a font provides none.
const FALLBACK_GLYPH_WIDTH: f32 = 500.0;

/// A 2D affine transform in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    /// The identity transform.
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Create a matrix from its six components.
    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Pure translation.
    pub fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self × other`: apply `self` first, then `other`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Transform a point.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    /// Length of the transformed unit vertical vector.
    pub fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Maps PDF user space (bottom-up) onto top-down page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    /// Left edge of the media box in user space
    pub x0: f32,
    /// Bottom edge of the media box in user space
    pub y0: f32,
    /// Page width
    pub width: f32,
    /// Page height
    pub height: f32,
}

impl PageFrame {
    /// Frame for a media box `[llx lly urx ury]`.
    pub fn from_media_box(llx: f32, lly: f32, urx: f32, ury: f32) -> Self {
        Self {
            x0: llx.min(urx),
            y0: lly.min(ury),
            width: (urx - llx).abs(),
            height: (ury - lly).abs(),
        }
    }

    /// Convert a user-space point to page coordinates.
    pub fn to_page(&self, x: f32, y: f32) -> (f32, f32) {
        (x - self.x0, self.y0 + self.height - y)
    }
}

/// Glyph widths of one font resource.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FontMetrics {
    /// Base font name, e.g. "Helvetica-Bold"
    pub base_font: String,
    /// Whether character codes are two bytes wide (Type0 fonts)
    pub two_byte: bool,
    /// First code covered by `widths`
    pub first_char: u32,
    /// Widths in 1/1000 text space units, indexed from `first_char`
    pub widths: Vec<f32>,
    /// Per-code widths for composite fonts
    pub cid_widths: HashMap<u32, f32>,
    /// Width used for codes without an explicit entry
    pub default_width: f32,
}

impl FontMetrics {
    /// Metrics for a simple one-byte font.
    pub fn simple(base_font: impl Into<String>, first_char: u32, widths: Vec<f32>) -> Self {
        Self {
            base_font: base_font.into(),
            two_byte: false,
            first_char,
            widths,
            cid_widths: HashMap::new(),
            default_width: FALLBACK_GLYPH_WIDTH,
        }
    }

    /// Width of a character code in 1/1000 text space units.
    pub fn glyph_width(&self, code: u32) -> f32 {
        if self.two_byte {
            return self
                .cid_widths
                .get(&code)
                .copied()
                .unwrap_or(self.default_width);
        }
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .filter(|w| *w > 0.0)
            .unwrap_or(self.default_width)
    }
}

/// An axis-aligned ruling segment in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x0: f32,
    pub top: f32,
    pub x1: f32,
    pub bottom: f32,
}

impl Segment {
    /// Normalised segment between two page points.
    pub fn between(p: (f32, f32), q: (f32, f32)) -> Self {
        Self {
            x0: p.0.min(q.0),
            top: p.1.min(q.1),
            x1: p.0.max(q.0),
            bottom: p.1.max(q.1),
        }
    }

    /// Whether the segment runs horizontally.
    pub fn is_horizontal(&self) -> bool {
        self.bottom - self.top < AXIS_TOLERANCE && self.x1 - self.x0 >= AXIS_TOLERANCE
    }

    /// Whether the segment runs vertically.
    pub fn is_vertical(&self) -> bool {
        self.x1 - self.x0 < AXIS_TOLERANCE && self.bottom - self.top >= AXIS_TOLERANCE
    }
}

/// Result of interpreting one page's content stream.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    /// Glyphs in content order
    pub chars: Vec<Character>,
    /// Stroked or filled axis-aligned path edges
    pub segments: Vec<Segment>,
    /// First placement of each XObject drawn with `Do`
    pub placements: Vec<(Vec<u8>, BBox)>,
}

impl PageContent {
    /// First placement of a named XObject.
    pub fn placement(&self, name: &[u8]) -> Option<BBox> {
        self.placements
            .iter()
            .find(|(n, _)| n.as_slice() == name)
            .map(|(_, bbox)| *bbox)
    }
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scale: f32,
    leading: f32,
    rise: f32,
    font: Vec<u8>,
    font_size: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
            font: Vec::new(),
            font_size: 12.0,
        }
    }
}

/// Text decoder: `(font resource name, code bytes) -> text`.
pub type TextDecoder<'a> = dyn Fn(&[u8], &[u8]) -> String + 'a;

/// Interprets content stream operations for one page.
pub struct ContentInterpreter<'a> {
    frame: PageFrame,
    fonts: &'a HashMap<Vec<u8>, FontMetrics>,
    decoder: &'a TextDecoder<'a>,
    fallback_font: FontMetrics,
}

impl<'a> ContentInterpreter<'a> {
    /// Create an interpreter for a page.
    pub fn new(
        frame: PageFrame,
        fonts: &'a HashMap<Vec<u8>, FontMetrics>,
        decoder: &'a TextDecoder<'a>,
    ) -> Self {
        Self {
            frame,
            fonts,
            decoder,
            fallback_font: FontMetrics::simple("Unknown", 0, Vec::new()),
        }
    }

    /// Run all operations and collect the page content.
    pub fn run(&self, operations: &[Operation]) -> PageContent {
        let mut out = PageContent::default();
        let mut state = GraphicsState::default();
        let mut stack: Vec<GraphicsState> = Vec::new();
        let mut text_matrix = Matrix::IDENTITY;
        let mut line_matrix = Matrix::IDENTITY;
        let mut path = PathBuilder::default();

        for op in operations {
            let nums: Vec<f32> = op.operands.iter().filter_map(number).collect();
            match op.operator.as_str() {
                "q" => stack.push(state.clone()),
                "Q" => {
                    if let Some(saved) = stack.pop() {
                        state = saved;
                    }
                }
                "cm" if nums.len() >= 6 => {
                    let m = Matrix::new(nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]);
                    state.ctm = m.multiply(&state.ctm);
                }
                "BT" => {
                    text_matrix = Matrix::IDENTITY;
                    line_matrix = Matrix::IDENTITY;
                }
                "Tf" if op.operands.len() >= 2 => {
                    if let Object::Name(name) = &op.operands[0] {
                        state.font = name.clone();
                    }
                    state.font_size = number(&op.operands[1]).unwrap_or(12.0);
                }
                "Tc" if !nums.is_empty() => state.char_spacing = nums[0],
                "Tw" if !nums.is_empty() => state.word_spacing = nums[0],
                "Tz" if !nums.is_empty() => state.horizontal_scale = nums[0] / 100.0,
                "TL" if !nums.is_empty() => state.leading = nums[0],
                "Ts" if !nums.is_empty() => state.rise = nums[0],
                "Td" if nums.len() >= 2 => {
                    line_matrix = Matrix::translation(nums[0], nums[1]).multiply(&line_matrix);
                    text_matrix = line_matrix;
                }
                "TD" if nums.len() >= 2 => {
                    state.leading = -nums[1];
                    line_matrix = Matrix::translation(nums[0], nums[1]).multiply(&line_matrix);
                    text_matrix = line_matrix;
                }
                "Tm" if nums.len() >= 6 => {
                    line_matrix = Matrix::new(nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]);
                    text_matrix = line_matrix;
                }
                "T*" => {
                    line_matrix = Matrix::translation(0.0, -state.leading).multiply(&line_matrix);
                    text_matrix = line_matrix;
                }
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = op.operands.first() {
                        self.show(bytes, &state, &mut text_matrix, &mut out.chars);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = op.operands.first() {
                        for item in items {
                            match item {
                                Object::String(bytes, _) => {
                                    self.show(bytes, &state, &mut text_matrix, &mut out.chars)
                                }
                                other => {
                                    if let Some(adjust) = number(other) {
                                        let tx = -adjust / 1000.0
                                            * state.font_size
                                            * state.horizontal_scale;
                                        text_matrix =
                                            Matrix::translation(tx, 0.0).multiply(&text_matrix);
                                    }
                                }
                            }
                        }
                    }
                }
                "'" | "\"" => {
                    let text_idx = if op.operator == "\"" {
                        if nums.len() >= 2 {
                            state.word_spacing = nums[0];
                            state.char_spacing = nums[1];
                        }
                        2
                    } else {
                        0
                    };
                    line_matrix = Matrix::translation(0.0, -state.leading).multiply(&line_matrix);
                    text_matrix = line_matrix;
                    if let Some(Object::String(bytes, _)) = op.operands.get(text_idx) {
                        self.show(bytes, &state, &mut text_matrix, &mut out.chars);
                    }
                }
                "m" if nums.len() >= 2 => path.move_to(self.user_to_page(&state, nums[0], nums[1])),
                "l" if nums.len() >= 2 => path.line_to(self.user_to_page(&state, nums[0], nums[1])),
                "c" if nums.len() >= 6 => path.jump_to(self.user_to_page(&state, nums[4], nums[5])),
                "v" | "y" if nums.len() >= 4 => {
                    path.jump_to(self.user_to_page(&state, nums[2], nums[3]))
                }
                "h" => path.close(),
                "re" if nums.len() >= 4 => {
                    let (x, y, w, h) = (nums[0], nums[1], nums[2], nums[3]);
                    path.move_to(self.user_to_page(&state, x, y));
                    path.line_to(self.user_to_page(&state, x + w, y));
                    path.line_to(self.user_to_page(&state, x + w, y + h));
                    path.line_to(self.user_to_page(&state, x, y + h));
                    path.close();
                }
                "S" | "s" | "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" => {
                    if matches!(op.operator.as_str(), "s" | "b" | "b*") {
                        path.close();
                    }
                    out.segments.extend(path.take_rules());
                }
                "n" => path.clear(),
                "Do" => {
                    if let Some(Object::Name(name)) = op.operands.first() {
                        if out.placement(name).is_none() {
                            out.placements.push((name.clone(), self.unit_square(&state)));
                        }
                    }
                }
                _ => {}
            }
        }

        out
    }

    fn user_to_page(&self, state: &GraphicsState, x: f32, y: f32) -> (f32, f32) {
        let (ux, uy) = state.ctm.apply(x, y);
        self.frame.to_page(ux, uy)
    }

    fn unit_square(&self, state: &GraphicsState) -> BBox {
        let corners = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
            .map(|(x, y)| self.user_to_page(state, x, y));
        let xs = corners.map(|p| p.0);
        let ys = corners.map(|p| p.1);
        BBox::new(
            xs.iter().copied().fold(f32::INFINITY, f32::min),
            ys.iter().copied().fold(f32::INFINITY, f32::min),
            xs.iter().copied().fold(f32::NEG_INFINITY, f32::max),
            ys.iter().copied().fold(f32::NEG_INFINITY, f32::max),
        )
    }

    /// Emit one character per code and advance the text matrix.
    fn show(
        &self,
        bytes: &[u8],
        state: &GraphicsState,
        text_matrix: &mut Matrix,
        chars: &mut Vec<Character>,
    ) {
        let font = self.fonts.get(&state.font).unwrap_or(&self.fallback_font);
        let step = if font.two_byte { 2 } else { 1 };

        for code_bytes in bytes.chunks(step) {
            let code = code_bytes
                .iter()
                .fold(0u32, |acc, b| (acc << 8) | u32::from(*b));
            let glyph_width = font.glyph_width(code) / 1000.0 * state.font_size;
            let is_space = step == 1 && code == 32;
            let advance = (glyph_width
                + state.char_spacing
                + if is_space { state.word_spacing } else { 0.0 })
                * state.horizontal_scale;

            let render = text_matrix.multiply(&state.ctm);
            let size = state.font_size * render.vertical_scale();
            let text = (self.decoder)(&state.font, code_bytes);

            if !text.is_empty() && !text.chars().all(char::is_control) && size > 0.0 {
                let start = render.apply(0.0, state.rise);
                let end = render.apply(glyph_width * state.horizontal_scale, state.rise);
                let (sx, baseline) = self.frame.to_page(start.0, start.1);
                let (ex, _) = self.frame.to_page(end.0, end.1);
                let bbox = BBox::new(
                    sx.min(ex),
                    baseline - ASCENT * size,
                    sx.max(ex),
                    baseline + DESCENT * size,
                );
                chars.push(Character::new(text, bbox, size, font.base_font.clone()));
            }

            *text_matrix = Matrix::translation(advance, 0.0).multiply(text_matrix);
        }
    }
}

/// Accumulates path edges until a painting operator commits them.
#[derive(Debug, Default)]
struct PathBuilder {
    start: Option<(f32, f32)>,
    current: Option<(f32, f32)>,
    edges: Vec<Segment>,
}

impl PathBuilder {
    fn move_to(&mut self, p: (f32, f32)) {
        self.start = Some(p);
        self.current = Some(p);
    }

    fn line_to(&mut self, p: (f32, f32)) {
        if let Some(from) = self.current {
            self.edges.push(Segment::between(from, p));
        }
        self.current = Some(p);
    }

    fn jump_to(&mut self, p: (f32, f32)) {
        self.current = Some(p);
    }

    fn close(&mut self) {
        if let (Some(from), Some(start)) = (self.current, self.start) {
            if from != start {
                self.edges.push(Segment::between(from, start));
            }
            self.current = Some(start);
        }
    }

    fn take_rules(&mut self) -> Vec<Segment> {
        let rules = self
            .edges
            .drain(..)
            .filter(|s| s.is_horizontal() || s.is_vertical())
            .collect();
        self.clear();
        rules
    }

    fn clear(&mut self) {
        self.start = None;
        self.current = None;
        self.edges.clear();
    }
}

/// Extract a number from a content stream operand.
fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
