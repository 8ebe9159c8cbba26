//! Page geometry.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in page coordinates.
///
/// The origin is the top-left corner of the page and `y` grows downward, so
/// `top <= bottom` for any well-formed box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub top: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub bottom: f32,
}

impl BBox {
    /// Create a new bounding box.
    pub fn new(x0: f32, top: f32, x1: f32, bottom: f32) -> Self {
        Self {
            x0,
            top,
            x1,
            bottom,
        }
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Horizontal centre.
    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    /// Vertical centre.
    pub fn center_y(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }

    /// Smallest box covering both boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            top: self.top.min(other.top),
            x1: self.x1.max(other.x1),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Strict interior overlap: boxes that merely touch do not overlap.
    pub fn overlaps(&self, other: &BBox) -> bool {
        self.x0 < other.x1
            && self.x1 > other.x0
            && self.top < other.bottom
            && self.bottom > other.top
    }

    /// Whether a point lies inside the box (edges included).
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.top && y <= self.bottom
    }

    /// Finite coordinates with non-negative extent.
    pub fn is_valid(&self) -> bool {
        [self.x0, self.top, self.x1, self.bottom]
            .iter()
            .all(|v| v.is_finite())
            && self.x0 <= self.x1
            && self.top <= self.bottom
    }

    /// Covering box of a sequence of boxes, `None` when empty.
    pub fn enclosing<'a, I>(boxes: I) -> Option<BBox>
    where
        I: IntoIterator<Item = &'a BBox>,
    {
        boxes
            .into_iter()
            .fold(None, |acc: Option<BBox>, b| match acc {
                Some(a) => Some(a.union(b)),
                None => Some(*b),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_and_dimensions() {
        let a = BBox::new(10.0, 10.0, 20.0, 20.0);
        let b = BBox::new(15.0, 5.0, 40.0, 12.0);
        let u = a.union(&b);
        assert_eq!(u, BBox::new(10.0, 5.0, 40.0, 20.0));
        assert_eq!(u.width(), 30.0);
        assert_eq!(u.height(), 15.0);
    }

    #[test]
    fn test_overlap_is_strict() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let touching = BBox::new(10.0, 0.0, 20.0, 10.0);
        let inside = BBox::new(2.0, 2.0, 3.0, 3.0);
        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&inside));
        assert!(inside.overlaps(&a));
    }

    #[test]
    fn test_validity() {
        assert!(BBox::new(0.0, 0.0, 1.0, 1.0).is_valid());
        assert!(!BBox::new(5.0, 0.0, 1.0, 1.0).is_valid());
        assert!(!BBox::new(0.0, f32::NAN, 1.0, 1.0).is_valid());
    }

    #[test]
    fn test_enclosing() {
        let boxes = [BBox::new(0.0, 0.0, 1.0, 1.0), BBox::new(3.0, -2.0, 4.0, 0.5)];
        assert_eq!(
            BBox::enclosing(boxes.iter()),
            Some(BBox::new(0.0, -2.0, 4.0, 1.0))
        );
        assert_eq!(BBox::enclosing(std::iter::empty()), None);
    }
}
