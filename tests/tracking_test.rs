use blobtrack_rs::detection::ContourRetrieval;
use blobtrack_rs::geometry::Point;
use blobtrack_rs::{
    BlobTracker, DeviceSize, FrameBuilder, IdAllocator, RotatedRect, Size, TrackState, TrackerConfig,
};

const W: u32 = 200;
const H: u32 = 200;

/// Defaults with a wider contour area window so test rectangles fit.
fn config() -> TrackerConfig {
    TrackerConfig {
        min_contour_area: 2.0,
        max_contour_area: 20.0,
        ..TrackerConfig::default()
    }
}

fn tracker() -> BlobTracker {
    BlobTracker::with_id_allocator(config(), IdAllocator::new()).unwrap()
}

fn angle_step(from: f32, to: f32) -> f32 {
    let d = (to - from).rem_euclid(360.0);
    d.min(360.0 - d)
}

#[test]
fn test_stable_without_motion() {
    let mut tracker = tracker();
    let mut first = None;

    for i in 0..10 {
        let frame = FrameBuilder::new(W, H)
            .at_millis(i * 33)
            .rotated_rect(RotatedRect::new(Point::new(100.0, 100.0), Size::new(70.0, 40.0), 25.0))
            .build();
        let output = tracker.update(&frame).unwrap();
        assert_eq!(output.blobs.len(), 1);
        let blob = output.blobs[0].clone();
        assert_eq!(blob.state, TrackState::Tracked);

        let (id, angle, size) = *first.get_or_insert((blob.id, blob.angle, blob.shape.size));
        assert_eq!(blob.id, id);
        assert!((blob.angle - angle).abs() < 1e-3);
        assert!((blob.shape.size.width - size.width).abs() < 1e-3);
        assert!((blob.shape.size.height - size.height).abs() < 1e-3);
    }
}

#[test]
fn test_restore_distance_boundary() {
    // Budget is 5% of the 282.8px diagonal, about 14.14px.
    let budget = config().restore_distance(W, H);
    assert!(budget > 14.0 && budget < 15.0);

    for (shift, keeps_id) in [(14, true), (15, false)] {
        let mut tracker = tracker();
        let first = tracker
            .update(&FrameBuilder::new(W, H).rect(60, 60, 60, 50).build())
            .unwrap();
        let id = first.blobs[0].id;

        let second = tracker
            .update(&FrameBuilder::new(W, H).at_millis(33).rect(60 + shift, 60, 60, 50).build())
            .unwrap();
        let tracked: Vec<_> = second
            .blobs
            .iter()
            .filter(|b| b.state == TrackState::Tracked)
            .collect();
        assert_eq!(tracked.len(), 1);
        if keeps_id {
            assert_eq!(tracked[0].id, id, "shift {shift} should keep the id");
            assert_eq!(second.blobs.len(), 1);
        } else {
            assert_ne!(tracked[0].id, id, "shift {shift} should create a new id");
            assert!(tracked[0].id > id);
            // The old object lingers unmatched until it times out.
            assert!(second.blobs.iter().any(|b| b.id == id && b.state == TrackState::NotTracked));
        }
    }
}

#[test]
fn test_angle_is_continuous_across_quarter_turn() {
    let mut tracker = tracker();
    let mut angles = Vec::new();

    for (i, degrees) in [84.0f32, 86.0, 88.0, 90.0, 92.0, 94.0].into_iter().enumerate() {
        let frame = FrameBuilder::new(W, H)
            .at_millis(i as u64 * 33)
            .rotated_rect(RotatedRect::new(Point::new(100.0, 100.0), Size::new(80.0, 50.0), degrees))
            .build();
        let output = tracker.update(&frame).unwrap();
        assert_eq!(output.blobs.len(), 1);
        angles.push(output.blobs[0].angle);
    }

    for pair in angles.windows(2) {
        assert!(angle_step(pair[0], pair[1]) < 6.0, "angle jumped: {angles:?}");
    }
    let total = angle_step(angles[0], angles[angles.len() - 1]);
    assert!((total - 10.0).abs() < 4.0, "total rotation {total}: {angles:?}");
}

#[test]
fn test_non_rectangles_are_ignored() {
    let mut tracker = tracker();
    let mut frame = FrameBuilder::new(W, H).build();
    imageproc::drawing::draw_polygon_mut(
        &mut frame.mask,
        &[
            imageproc::point::Point::new(30, 160),
            imageproc::point::Point::new(150, 160),
            imageproc::point::Point::new(90, 60),
        ],
        image::Luma([255]),
    );
    assert!(tracker.update(&frame).unwrap().blobs.is_empty());
}

#[test]
fn test_occluded_object_is_recovered_from_depth() {
    let mut tracker = tracker();
    let first = tracker
        .update(&FrameBuilder::new(W, H).rect(70, 70, 60, 50).depth(2000).build())
        .unwrap();
    let id = first.blobs[0].id;

    // A hand covers the right half: it vanishes from the mask and shows up
    // as near depth.
    let frame = FrameBuilder::new(W, H)
        .at_millis(33)
        .rect(70, 70, 30, 50)
        .depth(2000)
        .depth_rect(100, 60, 50, 70, 600)
        .build();
    let output = tracker.update(&frame).unwrap();

    assert_eq!(output.blobs.len(), 1, "{:?}", output.blobs);
    let blob = &output.blobs[0];
    assert_eq!(blob.id, id);
    assert_eq!(blob.state, TrackState::Occluded);
    assert!((blob.shape.center.x - 99.5).abs() < 2.0);
}

#[test]
fn test_no_phantom_when_depth_would_repair_everything() {
    let mut tracker = tracker();
    let first = tracker
        .update(&FrameBuilder::new(W, H).rect(70, 70, 60, 50).depth(2000).build())
        .unwrap();
    let id = first.blobs[0].id;

    // Only a sliver survives; depth would have to fabricate the rest.
    let frame = FrameBuilder::new(W, H)
        .at_millis(33)
        .rect(70, 70, 10, 10)
        .depth(600)
        .build();
    let output = tracker.update(&frame).unwrap();

    assert_eq!(output.blobs.len(), 1);
    assert_eq!(output.blobs[0].id, id);
    assert_eq!(output.blobs[0].state, TrackState::NotTracked);
}

#[test]
fn test_occlusion_recovery_can_be_disabled() {
    let mut tracker = BlobTracker::new(TrackerConfig {
        is_update_occluded_rectangles: false,
        ..config()
    })
    .unwrap();
    tracker
        .update(&FrameBuilder::new(W, H).rect(70, 70, 60, 50).depth(2000).build())
        .unwrap();
    let output = tracker
        .update(
            &FrameBuilder::new(W, H)
                .at_millis(33)
                .rect(70, 70, 30, 50)
                .depth(2000)
                .depth_rect(100, 60, 50, 70, 600)
                .build(),
        )
        .unwrap();
    assert!(output.blobs.iter().all(|b| b.state != TrackState::Occluded));
}

#[test]
fn test_timeout_eviction() {
    let mut tracker = tracker();
    tracker
        .update(&FrameBuilder::new(W, H).rect(60, 60, 60, 50).build())
        .unwrap();

    for (millis, present) in [(300, true), (500, true), (501, false)] {
        let output = tracker.update(&FrameBuilder::new(W, H).at_millis(millis).build()).unwrap();
        assert_eq!(!output.blobs.is_empty(), present, "at {millis}ms");
        if present {
            assert_eq!(output.blobs[0].state, TrackState::NotTracked);
        }
    }
    assert!(tracker.objects().is_empty());
}

#[test]
fn test_overlapping_new_candidates_do_not_both_survive() {
    // A thick rectangular ring yields an outer and a hole contour, both
    // rectangular and overlapping.
    let mut tracker = BlobTracker::new(TrackerConfig {
        contour_retrieval: ContourRetrieval::All,
        ..config()
    })
    .unwrap();
    let ring = |millis| {
        FrameBuilder::new(W, H)
            .at_millis(millis)
            .rect(50, 50, 80, 70)
            .clear_rect(65, 65, 50, 40)
            .build()
    };
    let output = tracker.update(&ring(0)).unwrap();
    assert_eq!(output.blobs.len(), 1);
    let (id, area) = (output.blobs[0].id, output.blobs[0].shape.area());
    assert!(area > 70.0 * 60.0);

    // Both contours contain the previous center; the outer one keeps the id.
    let output = tracker.update(&ring(33)).unwrap();
    assert_eq!(output.blobs.len(), 1);
    assert_eq!(output.blobs[0].id, id);
    assert_eq!(output.blobs[0].state, TrackState::Tracked);
    assert!((output.blobs[0].shape.area() - area).abs() < 1e-3);
}

#[test]
fn test_calibrated_object_does_not_grow() {
    let mut tracker = tracker();
    let first = tracker
        .update(&FrameBuilder::new(W, H).rect(40, 60, 64, 40).build())
        .unwrap();
    let id = first.blobs[0].id;
    tracker
        .apply_device_size(id, DeviceSize::new(16.0, 10.0))
        .unwrap();
    let frozen = tracker.get(id).unwrap().shape.size;

    // A second device pushed against the first merges into one silhouette.
    let output = tracker
        .update(&FrameBuilder::new(W, H).at_millis(33).rect(40, 60, 64, 40).rect(104, 60, 20, 40).build())
        .unwrap();
    let blob = output.blobs.iter().find(|b| b.id == id).expect("still tracked");
    assert!(blob.is_correct_size);
    assert_eq!(blob.shape.size, frozen);
    assert_eq!(blob.size, Size::new(frozen.long_side(), frozen.short_side()));
}

#[test]
fn test_records_are_normalized() {
    let mut tracker = tracker();
    let output = tracker
        .update(&FrameBuilder::new(W, H).rect(50, 50, 61, 51).build())
        .unwrap();
    let blob = &output.blobs[0];
    assert!((blob.center.x - 0.4).abs() < 1e-4);
    assert!((blob.center.y - 0.375).abs() < 1e-4);
    assert!((blob.bounding_area.width - 61.0 / 200.0).abs() < 1e-4);
    assert!(blob.polygon.points().iter().all(|p| (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y)));

    let json = serde_json::to_value(blob).unwrap();
    assert_eq!(json["state"], "tracked");
}
