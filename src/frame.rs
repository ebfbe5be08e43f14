//! Frame input handed to the tracker by the capture stage.

use std::time::Duration;

use image::{GrayImage, ImageBuffer, Luma};
use serde::{Deserialize, Serialize};

/// Single-channel 16-bit depth image.
pub type DepthImage = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Which upstream stream the binary mask was derived from.
///
/// Detection treats every source alike. The key is only carried through to
/// `FrameOutput::source` so consumers can tell the streams apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKey {
    /// Thresholded depth-camera confidence image.
    #[default]
    Confidence,
    /// Thresholded RGB-derived mask.
    Rgb,
}

/// One frame of input: a binary mask, an optional depth image and the
/// capture timestamp relative to the start of the stream.
#[derive(Debug, Clone)]
pub struct Frame {
    pub mask: GrayImage,
    pub depth: Option<DepthImage>,
    pub source: SourceKey,
    pub timestamp: Duration,
}

impl Frame {
    pub fn new(mask: GrayImage, timestamp: Duration) -> Self {
        Self {
            mask,
            depth: None,
            source: SourceKey::default(),
            timestamp,
        }
    }

    pub fn with_depth(mut self, depth: DepthImage) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn with_source(mut self, source: SourceKey) -> Self {
        self.source = source;
        self
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.mask.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.mask.height()
    }
}
