//! Shape fitting for accepted contours.

use imageproc::geometry::convex_hull;
use imageproc::point::Point as PixelPoint;

use super::contour::ContourCandidate;
use crate::geometry::{Point, Polygon, Rect, RotatedRect};

/// Geometry of one detected rectangle in the current frame.
#[derive(Debug, Clone)]
pub struct FittedShape {
    /// Full contour, pixel space. Used for restore containment checks.
    pub contour: Vec<Point>,
    /// Tight polygon, pixel space.
    pub points: Vec<Point>,
    /// Pixel-inclusive bounding box of the tight polygon.
    pub bounds: Rect,
    /// Minimum-area rectangle of the tight polygon.
    pub rotated: RotatedRect,
    /// Tight polygon in normalized image space.
    pub polygon: Polygon,
}

pub fn fit_shape(candidate: ContourCandidate, frame_width: u32, frame_height: u32) -> FittedShape {
    let ContourCandidate { contour, tight, .. } = candidate;
    FittedShape {
        bounds: Rect::bounding(&tight),
        rotated: RotatedRect::from_hull(&hull(&tight)),
        polygon: Polygon::normalized(&tight, frame_width, frame_height),
        points: tight,
        contour,
    }
}

fn hull(points: &[Point]) -> Vec<Point> {
    let pixels: Vec<PixelPoint<i32>> = points
        .iter()
        .map(|p| PixelPoint::new(p.x.round() as i32, p.y.round() as i32))
        .collect();
    convex_hull(pixels.as_slice())
        .into_iter()
        .map(|p| Point::new(p.x as f32, p.y as f32))
        .collect()
}
