use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use super::{Point, Rect};

/// Width and height of a rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    #[inline]
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn swapped(&self) -> Self {
        Self::new(self.height, self.width)
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    #[inline]
    pub fn long_side(&self) -> f32 {
        self.width.max(self.height)
    }

    #[inline]
    pub fn short_side(&self) -> f32 {
        self.width.min(self.height)
    }
}

/// Rectangle of any orientation.
///
/// `angle` is in degrees and points along the `width` edge. Rectangles
/// produced by [`RotatedRect::from_hull`] keep it in `[0, 90)`, so the same
/// physical rectangle always has one representation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotatedRect {
    pub center: Point,
    pub size: Size,
    pub angle: f32,
}

impl Default for RotatedRect {
    fn default() -> Self {
        Self::new(Point::origin(), Size::default(), 0.0)
    }
}

impl RotatedRect {
    #[inline]
    pub fn new(center: Point, size: Size, angle: f32) -> Self {
        Self {
            center,
            size,
            angle,
        }
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.size.area()
    }

    /// Corner points in order bottom-left, top-left, top-right, bottom-right
    /// of the unrotated rectangle.
    pub fn points(&self) -> [Point; 4] {
        let (sin, cos) = self.angle.to_radians().sin_cos();
        let a = sin * 0.5;
        let b = cos * 0.5;
        let (w, h) = (self.size.width, self.size.height);
        let c = self.center;

        let p0 = Point::new(c.x - a * h - b * w, c.y + b * h - a * w);
        let p1 = Point::new(c.x + a * h - b * w, c.y - b * h - a * w);
        let p2 = Point::new(2.0 * c.x - p0.x, 2.0 * c.y - p0.y);
        let p3 = Point::new(2.0 * c.x - p1.x, 2.0 * c.y - p1.y);
        [p0, p1, p2, p3]
    }

    /// Axis-aligned bounds of the corner points.
    pub fn bounding_rect(&self) -> Rect {
        Rect::bounding(&self.points())
    }

    /// Bring the angle into `[0, 90)`, swapping width and height when a
    /// quarter turn is folded away.
    pub fn canonical(mut self) -> Self {
        let mut angle = self.angle.rem_euclid(180.0);
        if angle >= 90.0 {
            angle -= 90.0;
            self.size = self.size.swapped();
        }
        self.angle = angle;
        self
    }

    /// Minimum-area enclosing rectangle of a convex hull (rotating calipers).
    ///
    /// One of the sides of the optimal rectangle is collinear with a hull
    /// edge, so every edge direction is tried. Ties keep the first edge.
    /// Fewer than three points yield an axis-aligned rectangle over their
    /// extents.
    pub fn from_hull(hull: &[Point]) -> Self {
        if hull.len() < 3 {
            return Self::axis_aligned(hull);
        }

        let mut best: Option<(f32, RotatedRect)> = None;
        let n = hull.len();
        for i in 0..n {
            let edge = hull[(i + 1) % n] - hull[i];
            let len = edge.norm();
            if len <= f32::EPSILON {
                continue;
            }
            let u = edge / len;
            let v = Vector2::new(-u.y, u.x);

            let (mut min_u, mut max_u) = (f32::MAX, f32::MIN);
            let (mut min_v, mut max_v) = (f32::MAX, f32::MIN);
            for p in hull {
                let d = *p - hull[i];
                let pu = d.dot(&u);
                let pv = d.dot(&v);
                min_u = min_u.min(pu);
                max_u = max_u.max(pu);
                min_v = min_v.min(pv);
                max_v = max_v.max(pv);
            }

            let width = max_u - min_u;
            let height = max_v - min_v;
            let area = width * height;
            if best.is_some_and(|(best_area, _)| area >= best_area - 1e-6) {
                continue;
            }

            let center = hull[i] + u * ((min_u + max_u) / 2.0) + v * ((min_v + max_v) / 2.0);
            let angle = u.y.atan2(u.x).to_degrees();
            let rect = RotatedRect::new(center, Size::new(width, height), angle).canonical();
            best = Some((area, rect));
        }

        best.map_or_else(|| Self::axis_aligned(hull), |(_, rect)| rect)
    }

    fn axis_aligned(points: &[Point]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };
        let (mut x1, mut y1, mut x2, mut y2) = (first.x, first.y, first.x, first.y);
        for p in points {
            x1 = x1.min(p.x);
            y1 = y1.min(p.y);
            x2 = x2.max(p.x);
            y2 = y2.max(p.y);
        }
        Self::new(
            Point::new((x1 + x2) / 2.0, (y1 + y2) / 2.0),
            Size::new(x2 - x1, y2 - y1),
            0.0,
        )
    }
}
