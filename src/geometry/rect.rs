use serde::{Deserialize, Serialize};

use super::Point;

/// Axis-aligned rectangle in TLWH form.
///
/// Used for contour bounding boxes and for the padded region of interest
/// of the occlusion resolver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left x coordinate
    pub x: f32,
    /// Top-left y coordinate
    pub y: f32,
    /// Width of the rectangle
    pub width: f32,
    /// Height of the rectangle
    pub height: f32,
}

impl Rect {
    /// Create a new Rect from top-left coordinates and dimensions (TLWH format).
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a Rect from TLBR format (top-left x, top-left y, bottom-right x, bottom-right y).
    #[inline]
    pub fn from_tlbr(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        }
    }

    /// Pixel-inclusive bounding box of a point set: a single pixel at
    /// `(x, y)` yields a 1x1 rectangle.
    pub fn bounding(points: &[Point]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };
        let (mut x1, mut y1, mut x2, mut y2) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            x1 = x1.min(p.x);
            y1 = y1.min(p.y);
            x2 = x2.max(p.x);
            y2 = y2.max(p.y);
        }
        Self::from_tlbr(x1, y1, x2 + 1.0, y2 + 1.0)
    }

    /// Convert to TLBR format: (x1, y1, x2, y2).
    #[inline]
    pub fn to_tlbr(&self) -> [f32; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }

    /// A rectangle with no positive extent is "no region".
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Smallest rectangle covering both. Empty rectangles are ignored.
    pub fn union(&self, other: &Rect) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let [ax1, ay1, ax2, ay2] = self.to_tlbr();
        let [bx1, by1, bx2, by2] = other.to_tlbr();
        Self::from_tlbr(ax1.min(bx1), ay1.min(by1), ax2.max(bx2), ay2.max(by2))
    }

    /// Grow the rectangle by `margin` on every side.
    pub fn pad(&self, margin: f32) -> Self {
        Self::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }

    /// Clamp to the `[0, width) x [0, height)` frame and snap to whole pixels.
    ///
    /// A rectangle that ends up with non-positive extent is replaced by
    /// `Rect::default()`.
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let [x1, y1, x2, y2] = self.to_tlbr();
        let x1 = x1.floor().max(0.0);
        let y1 = y1.floor().max(0.0);
        let x2 = x2.ceil().min(width as f32);
        let y2 = y2.ceil().min(height as f32);
        let clamped = Self::from_tlbr(x1, y1, x2, y2);
        if clamped.is_empty() {
            Self::default()
        } else {
            clamped
        }
    }

    /// Express the rectangle as fractions of the image dimensions.
    pub fn normalized(&self, width: u32, height: u32) -> Self {
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        Self::new(self.x / w, self.y / h, self.width / w, self.height / h)
    }
}
