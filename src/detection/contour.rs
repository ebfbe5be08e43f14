//! Contour extraction with loose and tight polygon approximations.

use image::GrayImage;
use imageproc::contours::{Contour, find_contours};
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point as PixelPoint;
use log::trace;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::geometry::{Point, polygon_area};

/// Which borders of the mask become contours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContourRetrieval {
    /// Only top-level outer borders.
    #[default]
    External,
    /// Outer borders and hole borders at every nesting level.
    All,
}

impl ContourRetrieval {
    fn accepts(self, contour: &Contour<i32>) -> bool {
        match self {
            Self::External => contour.parent.is_none(),
            Self::All => true,
        }
    }
}

/// Parameters of one extraction pass, resolved against the frame size.
#[derive(Debug, Clone, Copy)]
pub struct ExtractParams {
    pub retrieval: ContourRetrieval,
    /// Approximation tolerance of the loose polygon, as a fraction of the perimeter.
    pub loose_epsilon: f64,
    /// Approximation tolerance of the tight polygon, as a fraction of the perimeter.
    pub tight_epsilon: f64,
    /// Smallest accepted loose-polygon area in pixels.
    pub min_area: f32,
    /// Largest accepted loose-polygon area in pixels.
    pub max_area: f32,
    pub frame_width: u32,
    pub frame_height: u32,
}

/// A contour that passed the area filter, with both approximations.
///
/// The loose polygon only feeds the rectangle test; the tight polygon
/// becomes the reported geometry.
#[derive(Debug, Clone)]
pub struct ContourCandidate {
    pub contour: Vec<Point>,
    pub loose: Vec<Point>,
    pub tight: Vec<Point>,
}

/// Find contours in a binary mask (non-zero is foreground) and approximate
/// each at both tolerances. `offset` is added to every point.
pub fn extract_contours(
    mask: &GrayImage,
    params: &ExtractParams,
    offset: Vector2<f32>,
) -> Vec<ContourCandidate> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|contour| params.retrieval.accepts(contour))
        .filter_map(|contour| approximate(&contour.points, params, offset))
        .collect()
}

fn approximate(
    pixels: &[PixelPoint<i32>],
    params: &ExtractParams,
    offset: Vector2<f32>,
) -> Option<ContourCandidate> {
    if pixels.len() < 3 {
        return None;
    }
    let perimeter = arc_length(pixels, true);
    if perimeter <= 0.0 {
        return None;
    }

    let loose_tolerance = params.loose_epsilon * perimeter;
    let loose = simplify(pixels, loose_tolerance, offset);
    let area = polygon_area(&loose);
    if area < params.min_area || area > params.max_area {
        trace!(
            "rejected contour of area {area:.0}px outside [{:.0}, {:.0}]",
            params.min_area, params.max_area
        );
        return None;
    }

    let tight = simplify(pixels, params.tight_epsilon * perimeter, offset);
    if tight.len() < 3 {
        trace!("rejected contour: tight polygon collapsed to {} vertices", tight.len());
        return None;
    }

    Some(ContourCandidate {
        contour: to_points(pixels, offset),
        loose,
        tight,
    })
}

fn to_points(pixels: &[PixelPoint<i32>], offset: Vector2<f32>) -> Vec<Point> {
    pixels
        .iter()
        .map(|p| Point::new(p.x as f32, p.y as f32) + offset)
        .collect()
}

/// Douglas-Peucker over a closed curve.
///
/// The open-curve split starts at the first contour pixel, which leaves that
/// pixel and its neighbour as vertices even on a straight edge; those are
/// folded away afterwards.
fn simplify(pixels: &[PixelPoint<i32>], epsilon: f64, offset: Vector2<f32>) -> Vec<Point> {
    let mut points = to_points(&approximate_polygon_dp(pixels, epsilon, true), offset);
    points.dedup();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    prune_closed(points, epsilon as f32)
}

fn prune_closed(mut points: Vec<Point>, epsilon: f32) -> Vec<Point> {
    let mut changed = true;
    while changed && points.len() > 3 {
        changed = false;
        let n = points.len();
        for i in 0..n {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            if deviation(points[i], prev, next) <= epsilon {
                points.remove(i);
                changed = true;
                break;
            }
        }
    }
    points
}

fn deviation(p: Point, a: Point, b: Point) -> f32 {
    let ab = b - a;
    let len = ab.norm();
    if len <= f32::EPSILON {
        return (p - a).norm();
    }
    let ap = p - a;
    (ab.x * ap.y - ab.y * ap.x).abs() / len
}
