//! Per-frame output handed downstream.

use image::RgbImage;
use serde::Serialize;

use crate::frame::SourceKey;
use crate::geometry::{Point, Polygon, Rect, RotatedRect, Size};
use crate::tracker::track_state::TrackState;
use crate::tracker::tracked_object::TrackedObject;

/// Downstream view of one tracked object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlobRecord {
    pub id: u64,
    pub state: TrackState,
    /// Center as a fraction of the image dimensions
    pub center: Point,
    pub smoothed_center: Point,
    /// Accumulated orientation, degrees
    pub angle: f32,
    /// Pixel space
    pub shape: RotatedRect,
    pub size: Size,
    pub is_correct_size: bool,
    pub polygon: Polygon,
    pub bounding_area: Rect,
}

impl BlobRecord {
    pub fn from_object(object: &TrackedObject, width: u32, height: u32) -> Self {
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        Self {
            id: object.id,
            state: object.state,
            center: Point::new(object.center.x / w, object.center.y / h),
            smoothed_center: Point::new(object.smoothed_center.x / w, object.smoothed_center.y / h),
            angle: object.angle,
            shape: object.shape,
            size: object.size,
            is_correct_size: object.is_correct_size,
            polygon: object.polygon.clone(),
            bounding_area: object.bounds.normalized(width, height),
        }
    }
}

/// Everything the tracker produces for one frame.
#[derive(Debug, Clone, Default)]
pub struct FrameOutput {
    /// Source key of the frame the records were computed from
    pub source: SourceKey,
    pub blobs: Vec<BlobRecord>,
    /// Debug rendering, only when enabled in the configuration
    pub overlay: Option<RgbImage>,
}
