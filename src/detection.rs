//! Single-frame rectangle detection: contour extraction, the rectangle
//! plausibility filter and shape fitting, plus the binary-mask operations
//! the occlusion resolver builds on.

pub mod contour;
pub mod mask;
pub mod plausibility;
pub mod shape;

use image::GrayImage;
use log::trace;
use nalgebra::Vector2;

pub use contour::{ContourCandidate, ContourRetrieval, ExtractParams, extract_contours};
pub use mask::MorphologyOrder;
pub use plausibility::{RectangleTolerance, count_right_angles, is_rectangle};
pub use shape::{FittedShape, fit_shape};

/// Run contour extraction, the plausibility filter and the shape fitter over
/// `mask`. Contours found in a cropped mask are shifted by `offset` back into
/// frame coordinates.
pub fn detect_rectangles(
    mask: &GrayImage,
    params: &ExtractParams,
    tolerance: &RectangleTolerance,
    offset: Vector2<f32>,
) -> Vec<FittedShape> {
    extract_contours(mask, params, offset)
        .into_iter()
        .filter(|candidate| {
            let accepted = is_rectangle(&candidate.loose, tolerance);
            if !accepted {
                trace!(
                    "rejected contour with {} loose vertices: not rectangular",
                    candidate.loose.len()
                );
            }
            accepted
        })
        .map(|candidate| fit_shape(candidate, params.frame_width, params.frame_height))
        .collect()
}
