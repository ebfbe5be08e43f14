use nalgebra::Vector2;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::Point;

const EDGE_EPSILON: f32 = 1e-4;

/// Where a point lies relative to a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    Inside,
    OnEdge,
    Outside,
}

impl Containment {
    /// Inside or on the boundary.
    #[inline]
    pub fn is_covered(self) -> bool {
        self != Containment::Outside
    }
}

/// Absolute shoelace area of a closed polygon.
pub fn polygon_area(points: &[Point]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let n = points.len();
    let twice: f32 = (0..n)
        .map(|i| {
            let (a, b) = (points[i], points[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice.abs() / 2.0
}

/// Locate `p` relative to the closed polygon `points` (even-odd rule).
pub fn point_polygon_test(points: &[Point], p: Point) -> Containment {
    let n = points.len();
    if n == 0 {
        return Containment::Outside;
    }
    if n == 1 {
        return if (points[0] - p).norm() <= EDGE_EPSILON {
            Containment::OnEdge
        } else {
            Containment::Outside
        };
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (points[j], points[i]);
        if distance_to_segment(p, a, b) <= EDGE_EPSILON {
            return Containment::OnEdge;
        }
        if (b.y > p.y) != (a.y > p.y) && p.x < (a.x - b.x) * (p.y - b.y) / (a.y - b.y) + b.x {
            inside = !inside;
        }
        j = i;
    }

    if inside {
        Containment::Inside
    } else {
        Containment::Outside
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq <= f32::EPSILON {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Vertex list in normalized `[0, 1] x [0, 1]` image-fraction space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Scale pixel-space vertices by the image dimensions.
    pub fn normalized(pixels: &[Point], width: u32, height: u32) -> Self {
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        Self::new(pixels.iter().map(|p| Point::new(p.x / w, p.y / h)).collect())
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Separating-axis collision test.
    ///
    /// Exact for convex polygons. Shapes that only touch along an edge do
    /// not collide.
    pub fn collides(&self, other: &Polygon) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        !(has_separating_axis(&self.points, &self.points, &other.points)
            || has_separating_axis(&other.points, &self.points, &other.points))
    }
}

fn has_separating_axis(edges_of: &[Point], a: &[Point], b: &[Point]) -> bool {
    let n = edges_of.len();
    if n < 2 {
        return false;
    }
    (0..n).any(|i| {
        let edge = edges_of[(i + 1) % n] - edges_of[i];
        if edge.norm_squared() <= f32::EPSILON * f32::EPSILON {
            return false;
        }
        let axis = Vector2::new(-edge.y, edge.x);
        let (min_a, max_a) = project(a, &axis);
        let (min_b, max_b) = project(b, &axis);
        max_a <= min_b || max_b <= min_a
    })
}

fn project(points: &[Point], axis: &Vector2<f32>) -> (f32, f32) {
    points
        .iter()
        .map(|p| p.coords.dot(axis))
        .fold((f32::MAX, f32::MIN), |(lo, hi), d| (lo.min(d), hi.max(d)))
}

/// Pairwise collision matrix of shape (M, N) between two polygon sets.
pub fn collision_batch(polygons_a: &[&Polygon], polygons_b: &[&Polygon]) -> Array2<bool> {
    let mut hits = Array2::from_elem((polygons_a.len(), polygons_b.len()), false);
    for (i, a) in polygons_a.iter().enumerate() {
        for (j, b) in polygons_b.iter().enumerate() {
            hits[[i, j]] = a.collides(b);
        }
    }
    hits
}
