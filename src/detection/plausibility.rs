//! Rectangle plausibility heuristic over polygon vertices.
//!
//! Pure over point lists so it can be tuned and tested without images.

use crate::geometry::Point;

/// Tolerances of the rectangle test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangleTolerance {
    /// Smallest exterior angle, in degrees, that counts as a right angle.
    pub min_angle: f32,
    /// Largest exterior angle, in degrees, that counts as a right angle.
    pub max_angle: f32,
    /// Largest ratio between the two edges meeting at a corner.
    pub max_edge_ratio: f32,
    /// Right-angle corners needed to accept the polygon.
    pub min_right_angles: usize,
}

impl Default for RectangleTolerance {
    fn default() -> Self {
        Self {
            min_angle: 80.0,
            max_angle: 100.0,
            max_edge_ratio: 4.0,
            min_right_angles: 3,
        }
    }
}

/// Count the vertices whose exterior angle lies in
/// `[min_angle, max_angle]` and whose adjacent edges are not too skewed.
pub fn count_right_angles(polygon: &[Point], tolerance: &RectangleTolerance) -> usize {
    let n = polygon.len();
    if n < 3 {
        return 0;
    }
    (0..n)
        .filter(|&i| {
            let prev = polygon[(i + n - 1) % n];
            let cur = polygon[i];
            let next = polygon[(i + 1) % n];
            is_right_corner(cur - prev, next - cur, tolerance)
        })
        .count()
}

fn is_right_corner(
    incoming: nalgebra::Vector2<f32>,
    outgoing: nalgebra::Vector2<f32>,
    tolerance: &RectangleTolerance,
) -> bool {
    let (len_in, len_out) = (incoming.norm(), outgoing.norm());
    if len_in <= f32::EPSILON || len_out <= f32::EPSILON {
        return false;
    }
    let ratio = len_in.max(len_out) / len_in.min(len_out);
    if ratio > tolerance.max_edge_ratio {
        return false;
    }
    let cos = (incoming.dot(&outgoing) / (len_in * len_out)).clamp(-1.0, 1.0);
    let exterior = cos.acos().to_degrees();
    (tolerance.min_angle..=tolerance.max_angle).contains(&exterior)
}

/// Accept a polygon of at least three vertices with enough right-angle
/// corners. Partially occluded quadrilaterals pass as long as
/// `min_right_angles` corners survive.
pub fn is_rectangle(polygon: &[Point], tolerance: &RectangleTolerance) -> bool {
    polygon.len() >= 3 && count_right_angles(polygon, tolerance) >= tolerance.min_right_angles
}
