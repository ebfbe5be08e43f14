//! Builder for composing synthetic frames.

use std::time::Duration;

use image::{GrayImage, Luma};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect as PixelRect;

use crate::detection::mask;
use crate::frame::{DepthImage, Frame, SourceKey};
use crate::geometry::RotatedRect;

/// Builder for `Frame` objects drawn from rectangles.
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    mask: GrayImage,
    depth: Option<DepthImage>,
    source: SourceKey,
    timestamp: Duration,
}

impl FrameBuilder {
    /// Start from an all-background mask of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            mask: GrayImage::new(width, height),
            depth: None,
            source: SourceKey::default(),
            timestamp: Duration::ZERO,
        }
    }

    pub fn timestamp(mut self, timestamp: Duration) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn at_millis(self, millis: u64) -> Self {
        self.timestamp(Duration::from_millis(millis))
    }

    pub fn source(mut self, source: SourceKey) -> Self {
        self.source = source;
        self
    }

    /// Fill an axis-aligned rectangle (TLWH, pixels) as foreground.
    pub fn rect(mut self, x: i32, y: i32, width: u32, height: u32) -> Self {
        draw_filled_rect_mut(&mut self.mask, PixelRect::at(x, y).of_size(width, height), Luma([255]));
        self
    }

    /// Paint an axis-aligned rectangle back to background, e.g. an occluder.
    pub fn clear_rect(mut self, x: i32, y: i32, width: u32, height: u32) -> Self {
        draw_filled_rect_mut(&mut self.mask, PixelRect::at(x, y).of_size(width, height), Luma([0]));
        self
    }

    pub fn rotated_rect(mut self, rect: RotatedRect) -> Self {
        mask::fill_rotated_rect(&mut self.mask, &rect, 255);
        self
    }

    /// Fill the whole depth image with `value`.
    pub fn depth(mut self, value: u16) -> Self {
        let (width, height) = self.mask.dimensions();
        self.depth = Some(DepthImage::from_pixel(width, height, Luma([value])));
        self
    }

    /// Set the depth of an axis-aligned rectangle. Starts from missing
    /// depth (zero) when no depth image exists yet.
    pub fn depth_rect(mut self, x: i32, y: i32, width: u32, height: u32, value: u16) -> Self {
        let (w, h) = self.mask.dimensions();
        let depth = self.depth.get_or_insert_with(|| DepthImage::new(w, h));
        draw_filled_rect_mut(depth, PixelRect::at(x, y).of_size(width, height), Luma([value]));
        self
    }

    /// Build the final `Frame`.
    pub fn build(self) -> Frame {
        Frame {
            mask: self.mask,
            depth: self.depth,
            source: self.source,
            timestamp: self.timestamp,
        }
    }
}
