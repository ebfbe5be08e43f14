mod blob_tracker;
mod config;
mod matching;
mod occlusion;
mod record;
mod stabilizer;
mod store;
mod track_state;
mod tracked_object;

pub use blob_tracker::BlobTracker;
pub use config::TrackerConfig;
pub use matching::{assign_matches, find_match, suppress_duplicates};
pub use occlusion::{OcclusionContext, OcclusionResolver};
pub use record::{BlobRecord, FrameOutput};
pub use stabilizer::{
    DeviceSize, accumulate_angle, correct_to_device, device_ordered, stabilize_size,
    wrap_quarter_turn,
};
pub use store::ObjectStore;
pub use track_state::TrackState;
pub use tracked_object::{IdAllocator, TrackedObject};
