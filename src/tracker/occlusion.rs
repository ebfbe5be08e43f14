//! Depth-guided recovery of objects that vanished from the mask.
//!
//! An unmatched object may be hidden behind a hand or another device rather
//! than gone. The resolver reinstates the object's last silhouette from depth
//! evidence and re-runs detection in a padded region around it. Recovery is
//! abandoned when too little of the object is still visible or when depth
//! would have to fabricate almost the whole footprint.

use image::GrayImage;
use log::trace;
use nalgebra::Vector2;

use crate::detection::mask::{self, MorphologyOrder};
use crate::detection::{ExtractParams, FittedShape, RectangleTolerance, detect_rectangles};
use crate::geometry::{Rect, RotatedRect};
use crate::tracker::config::TrackerConfig;
use crate::tracker::matching::find_match;
use crate::tracker::tracked_object::TrackedObject;

/// Shared, read-only inputs of one frame's recovery tasks.
#[derive(Debug, Clone, Copy)]
pub struct OcclusionContext<'a> {
    /// Binary mask of the current frame as received.
    pub mask: &'a GrayImage,
    /// Current mask with every object matched this frame filled black.
    pub blanked: &'a GrayImage,
    /// Binary depth map at frame resolution.
    pub depth_map: &'a GrayImage,
    /// Objects as they were at the start of the frame.
    pub snapshot: &'a [TrackedObject],
    pub params: &'a ExtractParams,
    pub tolerance: &'a RectangleTolerance,
    pub max_distance: f32,
}

#[derive(Debug, Clone)]
pub struct OcclusionResolver {
    fix_mask_erode: u8,
    fix_mask_dilate: u8,
    fix_mask_order: MorphologyOrder,
    depth_patches_erode: u8,
    depth_patches_dilate: u8,
    depth_patches_order: MorphologyOrder,
    survive_pixel_threshold: usize,
    allowed_repair_pixels_ratio: f32,
    roi_padding: f32,
}

impl OcclusionResolver {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            fix_mask_erode: config.fix_mask_erode,
            fix_mask_dilate: config.fix_mask_dilate,
            fix_mask_order: config.fix_mask_order,
            depth_patches_erode: config.depth_patches_erode,
            depth_patches_dilate: config.depth_patches_dilate,
            depth_patches_order: config.depth_patches_order,
            survive_pixel_threshold: config.survive_pixel_threshold,
            allowed_repair_pixels_ratio: config.allowed_repair_pixels_ratio,
            roi_padding: config.occlusion_roi_padding as f32,
        }
    }

    /// Padded working region around the object's last footprint, clamped
    /// to the frame. Empty when the object lies entirely off-frame.
    pub fn region_of_interest(&self, object: &TrackedObject, width: u32, height: u32) -> Rect {
        object
            .bounds
            .union(&object.shape.bounding_rect())
            .pad(self.roi_padding)
            .clamp_to(width, height)
    }

    /// Try to re-find `object` in a frame synthesized from depth evidence.
    ///
    /// All buffers are private to the call and cover only the region of
    /// interest, so tasks for different objects can run concurrently.
    pub fn resolve(&self, object: &TrackedObject, ctx: &OcclusionContext<'_>) -> Option<FittedShape> {
        let (width, height) = ctx.mask.dimensions();
        let roi = self.region_of_interest(object, width, height);
        if roi.is_empty() {
            trace!("object {}: no region of interest inside the frame", object.id);
            return None;
        }
        let origin = Vector2::new(roi.x, roi.y);

        let mut footprint = GrayImage::new(roi.width as u32, roi.height as u32);
        let local_shape = RotatedRect::new(object.shape.center - origin, object.shape.size, object.shape.angle);
        mask::fill_rotated_rect(&mut footprint, &local_shape, 255);
        let footprint = mask::erode_dilate(
            &footprint,
            self.fix_mask_erode,
            self.fix_mask_dilate,
            self.fix_mask_order,
        );

        let depth_patches = mask::masked(&mask::crop(ctx.depth_map, &roi), &footprint);
        let origin_pixels = mask::masked(&mask::crop(ctx.mask, &roi), &footprint);

        let survived = mask::count_non_zero(&origin_pixels);
        if survived < self.survive_pixel_threshold {
            trace!(
                "object {}: {survived} pixels survived, below {}",
                object.id, self.survive_pixel_threshold
            );
            return None;
        }

        let original_area = object.original_area();
        if original_area <= 0.0 {
            return None;
        }
        let repaired = mask::count_non_zero(&depth_patches);
        let repaired_ratio = repaired as f32 / original_area * 100.0;
        if repaired_ratio > self.allowed_repair_pixels_ratio {
            trace!(
                "object {}: depth would repair {repaired_ratio:.1}% of the footprint, above {:.1}%",
                object.id, self.allowed_repair_pixels_ratio
            );
            return None;
        }

        let depth_patches = mask::erode_dilate(
            &depth_patches,
            self.depth_patches_erode,
            self.depth_patches_dilate,
            self.depth_patches_order,
        );
        let mut synthesized = mask::crop(ctx.blanked, &roi);
        mask::or_into(&mut synthesized, &depth_patches);

        let last_center = object.shape.center;
        let found = detect_rectangles(&synthesized, ctx.params, ctx.tolerance, origin)
            .into_iter()
            .filter(|shape| {
                find_match(shape, ctx.snapshot, ctx.max_distance)
                    .is_some_and(|i| ctx.snapshot[i].id == object.id)
            })
            .min_by(|a, b| {
                let da = (a.rotated.center - last_center).norm();
                let db = (b.rotated.center - last_center).norm();
                da.total_cmp(&db)
            });

        if found.is_none() {
            trace!("object {}: no rectangle re-identified in the synthesized frame", object.id);
        }
        found
    }
}
