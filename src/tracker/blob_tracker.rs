//! Main frame-level tracking algorithm.

use std::collections::BTreeMap;

use log::debug;
use nalgebra::Vector2;
use rayon::prelude::*;

use crate::detection::{ExtractParams, FittedShape, RectangleTolerance, detect_rectangles, mask};
use crate::error::{Result, TrackerError};
use crate::frame::Frame;
use crate::geometry::Polygon;
use crate::overlay;
use crate::tracker::config::TrackerConfig;
use crate::tracker::matching::{assign_matches, suppress_duplicates};
use crate::tracker::occlusion::{OcclusionContext, OcclusionResolver};
use crate::tracker::record::{BlobRecord, FrameOutput};
use crate::tracker::stabilizer::DeviceSize;
use crate::tracker::store::ObjectStore;
use crate::tracker::tracked_object::{IdAllocator, TrackedObject};

/// Per-frame thresholds resolved against the frame size.
struct FrameParams {
    extract: ExtractParams,
    tolerance: RectangleTolerance,
    max_distance: f32,
}

pub struct BlobTracker {
    store: ObjectStore,
    ids: IdAllocator,
    config: TrackerConfig,
    resolver: OcclusionResolver,
}

impl BlobTracker {
    pub fn new(config: TrackerConfig) -> Result<Self> {
        Self::with_id_allocator(config, IdAllocator::new())
    }

    /// Create a tracker drawing ids from `ids`.
    pub fn with_id_allocator(config: TrackerConfig, ids: IdAllocator) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store: ObjectStore::new(),
            ids,
            resolver: OcclusionResolver::new(&config),
            config,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Replace the tunables. Takes effect from the next frame.
    pub fn set_config(&mut self, config: TrackerConfig) -> Result<()> {
        config.validate()?;
        self.resolver = OcclusionResolver::new(&config);
        self.config = config;
        Ok(())
    }

    pub fn objects(&self) -> &[TrackedObject] {
        self.store.objects()
    }

    pub fn get(&self, id: u64) -> Option<&TrackedObject> {
        self.store.get(id)
    }

    /// Drop every tracked object. Ids keep counting up.
    pub fn clear(&mut self) {
        self.store.commit(Vec::new());
    }

    /// Freeze an object's dimensions to a recognized device's aspect ratio.
    pub fn apply_device_size(&mut self, id: u64, device: DeviceSize) -> Result<()> {
        let object = self.store.get_mut(id).ok_or(TrackerError::UnknownObject(id))?;
        object.apply_device_size(device);
        debug!(
            "object {id} calibrated to {}x{}: size {:?}",
            device.width, device.height, object.size
        );
        Ok(())
    }

    /// Process one frame and return a record for every object in the store.
    pub fn update(&mut self, frame: &Frame) -> Result<FrameOutput> {
        let (width, height) = frame.mask.dimensions();
        if width == 0 || height == 0 {
            return Err(TrackerError::EmptyFrame { width, height });
        }
        let now = frame.timestamp;

        // Step 1: Evict expired objects and start everyone unmatched
        let evicted = self.store.evict_expired(now, self.config.timeout());
        self.store.reset_states();

        // Step 2: Snapshot the store; nothing below reads the live list
        let snapshot = self.store.snapshot();
        let params = FrameParams {
            extract: self.config.extract_params(width, height),
            tolerance: self.config.rectangle_tolerance(),
            max_distance: self.config.restore_distance(width, height),
        };

        // Step 3: Primary detection on the real frame
        let shapes = detect_rectangles(&frame.mask, &params.extract, &params.tolerance, Vector2::zeros());
        let (matches, candidates) = assign_matches(shapes, &snapshot, params.max_distance);
        let mut staged: BTreeMap<u64, TrackedObject> = BTreeMap::new();
        for (i, shape) in &matches {
            let mut object = snapshot[*i].clone();
            object.update(shape, now, false, self.config.center_smoothing);
            staged.insert(object.id, object);
        }
        let matched = staged.len();

        // Step 4: Depth-guided recovery for objects that did not match
        let recovered = self.recover_occluded(frame, &snapshot, &params, &mut staged);

        // Step 5: Drop new candidates overlapping anything matched this frame
        let live: Vec<&Polygon> = staged.values().map(|o| &o.polygon).collect();
        let survivors = suppress_duplicates(candidates, &live);

        // Step 6: Commit
        let mut objects: Vec<TrackedObject> = snapshot
            .into_iter()
            .map(|object| staged.remove(&object.id).unwrap_or(object))
            .collect();
        for shape in &survivors {
            let object = TrackedObject::new(self.ids.next_id(), shape, now);
            debug!(
                "new object {} at ({:.1}, {:.1})",
                object.id, object.center.x, object.center.y
            );
            objects.push(object);
        }
        self.store.commit(objects);

        debug!(
            "frame at {:?}: {matched} matched, {recovered} recovered, {} created, {} evicted, {} of {} live",
            now,
            survivors.len(),
            evicted.len(),
            self.store.objects().iter().filter(|o| o.state.is_matched()).count(),
            self.store.len()
        );

        Ok(self.output(frame))
    }

    fn recover_occluded(
        &self,
        frame: &Frame,
        snapshot: &[TrackedObject],
        params: &FrameParams,
        staged: &mut BTreeMap<u64, TrackedObject>,
    ) -> usize {
        if !self.config.is_update_occluded_rectangles {
            return 0;
        }
        let Some(depth) = &frame.depth else {
            return 0;
        };
        let pending: Vec<&TrackedObject> = snapshot
            .iter()
            .filter(|object| !staged.contains_key(&object.id))
            .collect();
        if pending.is_empty() {
            return 0;
        }

        let (width, height) = frame.mask.dimensions();
        let depth_map = mask::threshold_depth(depth, self.config.depth_cutoff, width, height);
        let mut blanked = frame.mask.clone();
        for object in staged.values() {
            mask::fill_polygon(&mut blanked, &object.points, 0);
        }

        let ctx = OcclusionContext {
            mask: &frame.mask,
            blanked: &blanked,
            depth_map: &depth_map,
            snapshot,
            params: &params.extract,
            tolerance: &params.tolerance,
            max_distance: params.max_distance,
        };
        let resolver = &self.resolver;
        let found: Vec<(&TrackedObject, FittedShape)> = pending
            .par_iter()
            .filter_map(|&object| resolver.resolve(object, &ctx).map(|shape| (object, shape)))
            .collect();

        // Serialized merge of the per-object results
        let count = found.len();
        for (object, shape) in found {
            let mut object = object.clone();
            object.update(&shape, frame.timestamp, true, self.config.center_smoothing);
            debug!("object {} recovered through occlusion", object.id);
            staged.insert(object.id, object);
        }
        count
    }

    fn output(&self, frame: &Frame) -> FrameOutput {
        let (width, height) = frame.mask.dimensions();
        let objects = self.store.objects();
        FrameOutput {
            source: frame.source,
            blobs: objects
                .iter()
                .map(|object| BlobRecord::from_object(object, width, height))
                .collect(),
            overlay: self
                .config
                .debug_overlay
                .then(|| overlay::render(&frame.mask, objects)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use image::GrayImage;

    use super::*;
    use crate::detection::ContourRetrieval;
    use crate::frame::SourceKey;
    use crate::integration::FrameBuilder;
    use crate::tracker::TrackState;

    fn config() -> TrackerConfig {
        TrackerConfig {
            min_contour_area: 2.0,
            max_contour_area: 20.0,
            ..TrackerConfig::default()
        }
    }

    #[test]
    fn test_empty_frame_is_an_error() {
        let mut tracker = BlobTracker::new(config()).unwrap();
        let frame = Frame::new(GrayImage::new(0, 0), Duration::ZERO);
        assert!(matches!(
            tracker.update(&frame),
            Err(TrackerError::EmptyFrame { width: 0, height: 0 })
        ));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let bad = TrackerConfig {
            min_angle: 100.0,
            max_angle: 80.0,
            ..TrackerConfig::default()
        };
        assert!(BlobTracker::new(bad.clone()).is_err());
        let mut tracker = BlobTracker::new(config()).unwrap();
        assert!(tracker.set_config(bad).is_err());
        assert_eq!(tracker.config(), &config());
    }

    #[test]
    fn test_ids_come_from_injected_allocator() {
        let mut tracker = BlobTracker::with_id_allocator(config(), IdAllocator::starting_at(100)).unwrap();
        let frame = FrameBuilder::new(200, 200).rect(20, 20, 60, 50).rect(120, 120, 50, 40).build();
        let output = tracker.update(&frame).unwrap();
        let mut ids: Vec<u64> = output.blobs.iter().map(|b| b.id).collect();
        ids.sort();
        assert_eq!(ids, vec![100, 101]);
        assert!(output.blobs.iter().all(|b| b.state == TrackState::Tracked));
        assert!(output.overlay.is_none());
    }

    #[test]
    fn test_unknown_object_calibration() {
        let mut tracker = BlobTracker::new(config()).unwrap();
        assert!(matches!(
            tracker.apply_device_size(3, DeviceSize::new(16.0, 10.0)),
            Err(TrackerError::UnknownObject(3))
        ));
    }

    #[test]
    fn test_overlay_when_enabled() {
        let mut tracker = BlobTracker::new(TrackerConfig {
            debug_overlay: true,
            ..config()
        })
        .unwrap();
        let frame = FrameBuilder::new(200, 200).rect(20, 20, 60, 50).build();
        let output = tracker.update(&frame).unwrap();
        let overlay = output.overlay.expect("overlay requested");
        assert_eq!(overlay.dimensions(), (200, 200));
    }

    #[test]
    fn test_output_carries_source_key() {
        let mut tracker = BlobTracker::new(config()).unwrap();
        let frame = FrameBuilder::new(200, 200).source(SourceKey::Rgb).rect(20, 20, 60, 50).build();
        assert_eq!(tracker.update(&frame).unwrap().source, SourceKey::Rgb);
        let frame = FrameBuilder::new(200, 200).at_millis(33).rect(20, 20, 60, 50).build();
        assert_eq!(tracker.update(&frame).unwrap().source, SourceKey::Confidence);
    }

    #[test]
    fn test_nested_contours_keep_the_outer_shape() {
        let mut tracker = BlobTracker::new(TrackerConfig {
            contour_retrieval: ContourRetrieval::All,
            ..config()
        })
        .unwrap();
        let ring = |millis| {
            FrameBuilder::new(200, 200)
                .at_millis(millis)
                .rect(50, 50, 80, 70)
                .clear_rect(65, 65, 50, 40)
                .build()
        };

        let first = tracker.update(&ring(0)).unwrap();
        assert_eq!(first.blobs.len(), 1);
        let (id, size) = (first.blobs[0].id, first.blobs[0].shape.size);

        for millis in [33, 66] {
            let output = tracker.update(&ring(millis)).unwrap();
            assert_eq!(output.blobs.len(), 1);
            assert_eq!(output.blobs[0].id, id);
            assert_eq!(output.blobs[0].state, TrackState::Tracked);
            assert_eq!(output.blobs[0].shape.size, size);
        }
    }
}
