//! TrackerPipeline for combining a frame source with tracking.

use image::RgbImage;
use log::error;

use crate::error::Result;
use crate::frame::Frame;
use crate::tracker::{BlobRecord, BlobTracker, TrackerConfig};

use super::FrameSource;

/// Result of one pipeline stage invocation.
#[derive(Debug, Clone)]
pub struct StageOutput {
    /// The input frame, passed through unmodified
    pub frame: Frame,
    pub blobs: Vec<BlobRecord>,
    pub overlay: Option<RgbImage>,
}

/// A pipeline stage that bundles a frame source with the blob tracker.
///
/// Tracker errors never escape a frame: they are logged and the stage hands
/// the unmodified input on with no records, so the next frame proceeds.
pub struct TrackerPipeline<S: FrameSource> {
    source: S,
    tracker: BlobTracker,
}

impl<S: FrameSource> TrackerPipeline<S> {
    /// Create a new tracking pipeline with the given source and tracker config.
    pub fn new(source: S, config: TrackerConfig) -> Result<Self> {
        Ok(Self {
            source,
            tracker: BlobTracker::new(config)?,
        })
    }

    /// Create a new tracking pipeline with default tracker configuration.
    pub fn with_default_config(source: S) -> Result<Self> {
        Self::new(source, TrackerConfig::default())
    }

    /// Track one frame.
    pub fn process_frame(&mut self, frame: Frame) -> StageOutput {
        match self.tracker.update(&frame) {
            Ok(output) => StageOutput {
                frame,
                blobs: output.blobs,
                overlay: output.overlay,
            },
            Err(err) => {
                error!("blob tracking failed for frame at {:?}: {err}", frame.timestamp);
                StageOutput {
                    frame,
                    blobs: Vec::new(),
                    overlay: None,
                }
            }
        }
    }

    /// Pull the next frame from the source and track it.
    ///
    /// Returns `Ok(None)` once the source is exhausted.
    pub fn process_next(&mut self) -> std::result::Result<Option<StageOutput>, S::Error> {
        Ok(self.source.next_frame()?.map(|frame| self.process_frame(frame)))
    }

    /// Get a reference to the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get a mutable reference to the underlying source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &BlobTracker {
        &self.tracker
    }

    /// Get a mutable reference to the underlying tracker.
    pub fn tracker_mut(&mut self) -> &mut BlobTracker {
        &mut self.tracker
    }
}
