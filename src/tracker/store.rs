//! Authoritative list of tracked objects with timeout-based eviction.

use std::time::Duration;

use log::debug;

use crate::tracker::tracked_object::TrackedObject;

#[derive(Debug, Clone, Default)]
pub struct ObjectStore {
    objects: Vec<TrackedObject>,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every object unmatched for longer than `timeout`, returning their ids.
    pub fn evict_expired(&mut self, now: Duration, timeout: Duration) -> Vec<u64> {
        let mut evicted = Vec::new();
        self.objects.retain(|object| {
            if object.is_expired(now, timeout) {
                debug!("evicting object {} after {:?}", object.id, now.saturating_sub(object.last_update));
                evicted.push(object.id);
                false
            } else {
                true
            }
        });
        evicted
    }

    /// Every object starts the frame unmatched.
    pub fn reset_states(&mut self) {
        for object in &mut self.objects {
            object.reset_state();
        }
    }

    /// Read-only copy used for matching during one frame.
    pub fn snapshot(&self) -> Vec<TrackedObject> {
        self.objects.clone()
    }

    /// Replace the contents with the objects committed at frame end.
    pub fn commit(&mut self, objects: Vec<TrackedObject>) {
        self.objects = objects;
    }

    pub fn get(&self, id: u64) -> Option<&TrackedObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut TrackedObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn objects(&self) -> &[TrackedObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
