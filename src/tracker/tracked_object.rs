//! A single tracked rectangular object and its id allocator.

use std::time::Duration;

use crate::detection::FittedShape;
use crate::geometry::{Point, Polygon, Rect, RotatedRect, Size};
use crate::tracker::stabilizer::{self, DeviceSize};
use crate::tracker::track_state::TrackState;

/// Monotonic id source owned by a tracker instance.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    /// Allocator handing out 1, 2, 3, ...
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The id the next call to `next_id` will return.
    pub fn peek(&self) -> u64 {
        self.next
    }
}

/// One physical device silhouette followed across frames.
#[derive(Debug, Clone)]
pub struct TrackedObject {
    /// Stable identifier for the object's lifetime
    pub id: u64,
    pub state: TrackState,
    /// Frame time of the last match, direct or through occlusion recovery
    pub last_update: Duration,
    pub center: Point,
    /// Exponentially damped center
    pub smoothed_center: Point,
    pub bounds: Rect,
    pub shape: RotatedRect,
    /// Raw fitted angle of the previous update
    pub last_angle: f32,
    /// Accumulated orientation in `[0, 360)`
    pub angle: f32,
    pub is_correct_size: bool,
    /// Dimensions in device order once calibrated, else the fitted size
    pub size: Size,
    /// Tight polygon in normalized image space
    pub polygon: Polygon,
    /// Tight polygon in pixel space
    pub points: Vec<Point>,
    /// Shape right before the device size correction was applied
    pub origin_depth_shape: RotatedRect,
    pub device: Option<DeviceSize>,
}

impl TrackedObject {
    /// Create a freshly detected object.
    pub fn new(id: u64, fitted: &FittedShape, now: Duration) -> Self {
        let shape = fitted.rotated;
        Self {
            id,
            state: TrackState::Tracked,
            last_update: now,
            center: shape.center,
            smoothed_center: shape.center,
            bounds: fitted.bounds,
            shape,
            last_angle: shape.angle,
            angle: shape.angle.rem_euclid(360.0),
            is_correct_size: false,
            size: shape.size,
            polygon: fitted.polygon.clone(),
            points: fitted.points.clone(),
            origin_depth_shape: shape,
            device: None,
        }
    }

    /// Apply a matched fit from the current frame.
    pub fn update(&mut self, fitted: &FittedShape, now: Duration, occluded: bool, smoothing: f32) {
        let raw = fitted.rotated;

        self.center = raw.center;
        self.smoothed_center += (raw.center - self.smoothed_center) * smoothing;
        self.bounds = fitted.bounds;
        self.polygon = fitted.polygon.clone();
        self.points = fitted.points.clone();

        self.angle = stabilizer::accumulate_angle(self.angle, self.last_angle, raw.angle);
        let size = stabilizer::stabilize_size(
            self.is_correct_size,
            self.shape.size,
            raw.size,
            self.last_angle,
            raw.angle,
        );
        self.shape = RotatedRect::new(raw.center, size, raw.angle);
        self.size = match &self.device {
            Some(device) if self.is_correct_size => stabilizer::device_ordered(size, device),
            _ => size,
        };
        self.last_angle = raw.angle;

        self.state = if occluded {
            TrackState::Occluded
        } else {
            TrackState::Tracked
        };
        self.last_update = now;
    }

    /// Freeze the dimensions to the device's physical aspect ratio.
    pub fn apply_device_size(&mut self, device: DeviceSize) {
        self.origin_depth_shape = self.shape;
        self.shape.size = stabilizer::correct_to_device(self.shape.size, &device);
        self.size = stabilizer::device_ordered(self.shape.size, &device);
        if let Some(orientation) = device.orientation {
            self.angle = orientation.rem_euclid(360.0);
        }
        self.is_correct_size = true;
        self.device = Some(device);
    }

    #[inline]
    pub fn reset_state(&mut self) {
        self.state = TrackState::NotTracked;
    }

    /// Whether the object has gone unmatched for longer than `timeout`.
    #[inline]
    pub fn is_expired(&self, now: Duration, timeout: Duration) -> bool {
        now.saturating_sub(self.last_update) > timeout
    }

    /// Area the object covered before any size correction.
    pub fn original_area(&self) -> f32 {
        if self.is_correct_size {
            self.origin_depth_shape.area()
        } else {
            self.shape.area()
        }
    }
}
