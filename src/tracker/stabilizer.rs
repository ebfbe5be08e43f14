//! Orientation and size stabilization for minimum-area rectangle fits.
//!
//! A rotated-rectangle fit is only defined up to quarter turns: the same
//! silhouette can come back as `(w, h, a)` or `(h, w, a +/- 90)` between
//! frames. These functions keep the reported angle and dimensions
//! continuous across such flips.

use serde::{Deserialize, Serialize};

use crate::geometry::Size;

/// Physical dimensions of a recognized device, in any unit, plus an
/// optional orientation hint in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceSize {
    pub width: f32,
    pub height: f32,
    pub orientation: Option<f32>,
}

impl DeviceSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            orientation: None,
        }
    }

    pub fn with_orientation(mut self, degrees: f32) -> Self {
        self.orientation = Some(degrees);
        self
    }

    /// Long side over short side, `None` for a degenerate device.
    pub fn aspect(&self) -> Option<f32> {
        let (long, short) = (self.width.max(self.height), self.width.min(self.height));
        (short > 0.0).then(|| long / short)
    }
}

/// Fold an angle delta into `[-45, 45]` by whole quarter turns.
pub fn wrap_quarter_turn(delta: f32) -> f32 {
    let mut delta = delta % 360.0;
    while delta > 45.0 {
        delta -= 90.0;
    }
    while delta < -45.0 {
        delta += 90.0;
    }
    delta
}

/// Advance the accumulated orientation by the wrapped change of the raw fit.
pub fn accumulate_angle(angle: f32, last_raw: f32, new_raw: f32) -> f32 {
    (angle + wrap_quarter_turn(new_raw - last_raw)).rem_euclid(360.0)
}

/// Dimensions to keep after a new fit.
///
/// Uncalibrated objects adopt the fit. Calibrated objects keep their frozen
/// dimensions and only swap them when the raw angle jumped by more than 45
/// degrees, which is the fit flipping orientation class.
pub fn stabilize_size(
    is_correct_size: bool,
    frozen: Size,
    fitted: Size,
    last_raw: f32,
    new_raw: f32,
) -> Size {
    if !is_correct_size {
        fitted
    } else if (new_raw - last_raw).abs() > 45.0 {
        frozen.swapped()
    } else {
        frozen
    }
}

/// Correct a fitted size to the device aspect ratio, keeping the long side
/// and which of width/height carries it.
pub fn correct_to_device(fitted: Size, device: &DeviceSize) -> Size {
    let Some(aspect) = device.aspect() else {
        return fitted;
    };
    let long = fitted.long_side();
    let short = long / aspect;
    if fitted.width >= fitted.height {
        Size::new(long, short)
    } else {
        Size::new(short, long)
    }
}

/// Arrange `size` so that `width` is the dimension matching the device width.
pub fn device_ordered(size: Size, device: &DeviceSize) -> Size {
    if device.width >= device.height {
        Size::new(size.long_side(), size.short_side())
    } else {
        Size::new(size.short_side(), size.long_side())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_quarter_turn() {
        assert_eq!(wrap_quarter_turn(0.0), 0.0);
        assert_eq!(wrap_quarter_turn(30.0), 30.0);
        assert_eq!(wrap_quarter_turn(45.0), 45.0);
        assert!((wrap_quarter_turn(-89.0) - 1.0).abs() < 1e-4);
        assert!((wrap_quarter_turn(88.0) + 2.0).abs() < 1e-4);
        assert!((wrap_quarter_turn(181.0) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_ambiguous_refit_does_not_jump() {
        // Raw fit went from 85 to -4: the same rectangle one quarter turn later.
        let angle = accumulate_angle(85.0, 85.0, -4.0);
        assert!((angle - 86.0).abs() < 1e-3);
    }

    #[test]
    fn test_accumulated_angle_wraps_at_360() {
        let angle = accumulate_angle(358.0, 10.0, 15.0);
        assert!((angle - 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_stabilize_size() {
        let frozen = Size::new(100.0, 60.0);
        let fitted = Size::new(120.0, 61.0);
        assert_eq!(stabilize_size(false, frozen, fitted, 10.0, 12.0), fitted);
        assert_eq!(stabilize_size(true, frozen, fitted, 10.0, 12.0), frozen);
        assert_eq!(stabilize_size(true, frozen, fitted, 88.0, 2.0), frozen.swapped());
    }

    #[test]
    fn test_correct_to_device() {
        let device = DeviceSize::new(160.0, 100.0);
        let corrected = correct_to_device(Size::new(64.0, 80.0), &device);
        assert!((corrected.width - 50.0).abs() < 1e-4);
        assert!((corrected.height - 80.0).abs() < 1e-4);
        assert_eq!(device_ordered(corrected, &device), Size::new(80.0, 50.0));

        let flat = DeviceSize::new(10.0, 0.0);
        assert_eq!(correct_to_device(Size::new(3.0, 4.0), &flat), Size::new(3.0, 4.0));
    }
}
