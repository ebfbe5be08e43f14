//! Integration module for connecting frame sources with the blob tracker.
//!
//! This module provides the frame source seam, a builder for synthetic
//! frames and a pipeline stage that keeps running past bad frames.

mod builder;
mod pipeline;
mod source;

pub use builder::FrameBuilder;
pub use pipeline::{StageOutput, TrackerPipeline};
pub use source::FrameSource;
