use parking_lot::RwLock;
use std::collections::HashMap;

use crate::model::{LocationId, Snapshot};

/// Append-only log of snapshots, grouped by location.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    snapshots: RwLock<HashMap<LocationId, Vec<Snapshot>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callers guarantee `snapshot.location_id` names a registered location.
    pub fn append(&self, snapshot: Snapshot) {
        self.snapshots.write().entry(snapshot.location_id).or_default().push(snapshot);
    }

    /// Snapshot with the greatest `observed_at`; on ties the later insert wins.
    pub fn latest(&self, location_id: LocationId) -> Option<Snapshot> {
        let snapshots = self.snapshots.read();
        snapshots
            .get(&location_id)?
            .iter()
            .fold(None, |best: Option<&Snapshot>, s| match best {
                Some(b) if b.observed_at > s.observed_at => Some(b),
                _ => Some(s),
            })
            .cloned()
    }

    pub fn count(&self, location_id: LocationId) -> usize {
        self.snapshots.read().get(&location_id).map_or(0, Vec::len)
    }

    /// Snapshots for a location in insertion order.
    pub fn history(&self, location_id: LocationId) -> Vec<Snapshot> {
        self.snapshots.read().get(&location_id).cloned().unwrap_or_default()
    }
}
