//! Rectangular blob tracking with depth-guided occlusion recovery.
//!
//! Detects quadrilateral silhouettes in binary masks, keeps a persistent id
//! for each across frames and bridges short occlusions with a depth signal.

pub mod detection;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod integration;
pub mod overlay;
pub mod tracker;

pub use error::{Result, TrackerError};
pub use frame::{DepthImage, Frame, SourceKey};
pub use geometry::{Polygon, Rect, RotatedRect, Size};
pub use integration::{FrameBuilder, FrameSource, StageOutput, TrackerPipeline};
pub use tracker::{
    BlobRecord, BlobTracker, DeviceSize, FrameOutput, IdAllocator, TrackState, TrackedObject,
    TrackerConfig,
};
