//! Pure geometry over `nalgebra` points: axis-aligned and rotated rectangles
//! and polygons in pixel or normalized image space.

mod polygon;
mod rect;
mod rotated_rect;

pub use polygon::{Containment, Polygon, collision_batch, point_polygon_test, polygon_area};
pub use rect::Rect;
pub use rotated_rect::{RotatedRect, Size};

/// 2D point in pixel or normalized space.
pub type Point = nalgebra::Point2<f32>;
