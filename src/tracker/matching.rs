//! Identity matching and duplicate suppression.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use log::{debug, warn};

use crate::detection::FittedShape;
use crate::geometry::{Polygon, collision_batch, point_polygon_test};
use crate::tracker::tracked_object::TrackedObject;

/// Find the object a fresh shape re-identifies.
///
/// Only objects whose previous center lies inside or on the new contour are
/// eligible. Among those the nearest center wins, provided it is within
/// `max_distance` pixels. Returns the index into `objects`.
pub fn find_match(shape: &FittedShape, objects: &[TrackedObject], max_distance: f32) -> Option<usize> {
    objects
        .iter()
        .enumerate()
        .filter(|(_, object)| point_polygon_test(&shape.contour, object.shape.center).is_covered())
        .map(|(i, object)| (i, (object.shape.center - shape.rotated.center).norm()))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .filter(|&(_, distance)| distance <= max_distance)
        .map(|(i, _)| i)
}

/// Match every fresh shape against `objects`, one shape per object.
///
/// When several shapes re-identify the same object, such as the outer and
/// hole borders of a ring, the largest one keeps the match. Losing and
/// unmatched shapes come back as new candidates, in detection order, for
/// duplicate suppression. Matches are keyed by index into `objects`.
pub fn assign_matches(
    shapes: Vec<FittedShape>,
    objects: &[TrackedObject],
    max_distance: f32,
) -> (BTreeMap<usize, FittedShape>, Vec<FittedShape>) {
    let mut matches = BTreeMap::new();
    let mut candidates = Vec::new();

    for shape in shapes {
        let Some(i) = find_match(&shape, objects, max_distance) else {
            candidates.push(shape);
            continue;
        };
        match matches.entry(i) {
            Entry::Vacant(slot) => {
                slot.insert(shape);
            }
            Entry::Occupied(mut slot) => {
                debug!("object {}: several shapes in one frame, keeping the largest", objects[i].id);
                if shape.rotated.area() > slot.get().rotated.area() {
                    candidates.push(slot.insert(shape));
                } else {
                    candidates.push(shape);
                }
            }
        }
    }
    (matches, candidates)
}

/// Drop new candidates that collide with a live object or with a larger
/// candidate kept earlier in the same frame.
pub fn suppress_duplicates(mut candidates: Vec<FittedShape>, live: &[&Polygon]) -> Vec<FittedShape> {
    candidates.sort_by(|a, b| b.rotated.area().total_cmp(&a.rotated.area()));

    let polygons: Vec<&Polygon> = candidates.iter().map(|c| &c.polygon).collect();
    let against_live = collision_batch(&polygons, live);
    let among = collision_batch(&polygons, &polygons);

    let mut keep = vec![false; candidates.len()];
    for i in 0..candidates.len() {
        if against_live.row(i).iter().any(|&hit| hit) {
            warn!(
                "suppressing new candidate at ({:.1}, {:.1}): overlaps a tracked object",
                candidates[i].rotated.center.x, candidates[i].rotated.center.y
            );
            continue;
        }
        if (0..i).any(|j| keep[j] && among[[i, j]]) {
            warn!(
                "suppressing new candidate at ({:.1}, {:.1}): overlaps another new candidate",
                candidates[i].rotated.center.x, candidates[i].rotated.center.y
            );
            continue;
        }
        keep[i] = true;
    }

    candidates
        .into_iter()
        .zip(keep)
        .filter_map(|(candidate, kept)| kept.then_some(candidate))
        .collect()
}
