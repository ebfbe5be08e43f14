//! Tracker tunables.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::detection::{ContourRetrieval, ExtractParams, MorphologyOrder, RectangleTolerance};
use crate::error::{Result, TrackerError};

/// Configuration for the BlobTracker.
///
/// Every field has a default, so a JSON document may set any subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Rectangle corner tolerance, degrees.
    pub min_angle: f32,
    pub max_angle: f32,
    /// Largest ratio between the two edges of a right-angle corner.
    pub max_edge_ratio: f32,
    /// Contour area bounds, percent of frame pixels.
    pub min_contour_area: f32,
    pub max_contour_area: f32,
    /// Polygon approximation tolerances, fractions of the contour perimeter.
    pub loose_epsilon: f64,
    pub tight_epsilon: f64,
    pub contour_retrieval: ContourRetrieval,
    /// Eviction timeout for objects that stopped matching.
    pub timeout_ms: u64,
    pub min_detect_right_angles: usize,
    /// Restore distance budget, percent of the image diagonal.
    pub max_restore_distance: f32,
    /// Exponential damping factor of the smoothed center, in `(0, 1]`.
    pub center_smoothing: f32,
    pub is_update_occluded_rectangles: bool,
    pub fix_mask_erode: u8,
    pub fix_mask_dilate: u8,
    pub fix_mask_order: MorphologyOrder,
    pub depth_patches_erode: u8,
    pub depth_patches_dilate: u8,
    pub depth_patches_order: MorphologyOrder,
    /// Non-zero depth at or below this value counts as foreground.
    pub depth_cutoff: u16,
    pub survive_pixel_threshold: usize,
    /// Percent of the original shape area that depth may repair.
    pub allowed_repair_pixels_ratio: f32,
    /// Pixels added on every side of the last bounds when re-detecting an
    /// occluded object.
    pub occlusion_roi_padding: u32,
    pub debug_overlay: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            min_angle: 80.0,
            max_angle: 100.0,
            max_edge_ratio: 4.0,
            min_contour_area: 5.0,
            max_contour_area: 10.0,
            loose_epsilon: 0.015,
            tight_epsilon: 0.05,
            contour_retrieval: ContourRetrieval::External,
            timeout_ms: 500,
            min_detect_right_angles: 3,
            max_restore_distance: 5.0,
            center_smoothing: 0.5,
            is_update_occluded_rectangles: true,
            fix_mask_erode: 1,
            fix_mask_dilate: 0,
            fix_mask_order: MorphologyOrder::ErodeThenDilate,
            depth_patches_erode: 1,
            depth_patches_dilate: 1,
            depth_patches_order: MorphologyOrder::ErodeThenDilate,
            depth_cutoff: 1000,
            survive_pixel_threshold: 5,
            allowed_repair_pixels_ratio: 95.0,
            occlusion_roi_padding: 20,
            debug_overlay: false,
        }
    }
}

impl TrackerConfig {
    /// Parse and validate a (possibly partial) JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=180.0).contains(&self.min_angle) || !(0.0..=180.0).contains(&self.max_angle) {
            return Err(TrackerError::config("corner angles must lie in [0, 180] degrees"));
        }
        if self.min_angle > self.max_angle {
            return Err(TrackerError::config(format!(
                "min_angle {} exceeds max_angle {}",
                self.min_angle, self.max_angle
            )));
        }
        if self.max_edge_ratio < 1.0 {
            return Err(TrackerError::config("max_edge_ratio must be at least 1"));
        }
        if self.min_contour_area < 0.0 || self.min_contour_area > self.max_contour_area {
            return Err(TrackerError::config(format!(
                "contour area bounds [{}, {}] are not a valid percentage range",
                self.min_contour_area, self.max_contour_area
            )));
        }
        if self.loose_epsilon <= 0.0 || self.tight_epsilon <= 0.0 {
            return Err(TrackerError::config("approximation tolerances must be positive"));
        }
        if self.max_restore_distance < 0.0 {
            return Err(TrackerError::config("max_restore_distance must not be negative"));
        }
        if !(self.center_smoothing > 0.0 && self.center_smoothing <= 1.0) {
            return Err(TrackerError::config("center_smoothing must lie in (0, 1]"));
        }
        if self.allowed_repair_pixels_ratio < 0.0 {
            return Err(TrackerError::config(
                "allowed_repair_pixels_ratio must not be negative",
            ));
        }
        Ok(())
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn rectangle_tolerance(&self) -> RectangleTolerance {
        RectangleTolerance {
            min_angle: self.min_angle,
            max_angle: self.max_angle,
            max_edge_ratio: self.max_edge_ratio,
            min_right_angles: self.min_detect_right_angles,
        }
    }

    /// Resolve the percentage area bounds against a frame size.
    pub fn extract_params(&self, width: u32, height: u32) -> ExtractParams {
        let pixels = width as f32 * height as f32;
        ExtractParams {
            retrieval: self.contour_retrieval,
            loose_epsilon: self.loose_epsilon,
            tight_epsilon: self.tight_epsilon,
            min_area: pixels * self.min_contour_area / 100.0,
            max_area: pixels * self.max_contour_area / 100.0,
            frame_width: width,
            frame_height: height,
        }
    }

    /// Restore distance budget in pixels for a frame size.
    pub fn restore_distance(&self, width: u32, height: u32) -> f32 {
        let diagonal = (width as f32).hypot(height as f32);
        diagonal * self.max_restore_distance / 100.0
    }
}
