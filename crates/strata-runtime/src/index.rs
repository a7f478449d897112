use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use hashbrown::{HashMap, HashSet};
use strata_chunk::ChunkData;
use strata_world::ChunkCoord;

use crate::lock;

/// Shared handle to a populated chunk's voxels.
pub type ChunkHandle = Arc<RwLock<ChunkData>>;

/// Lifecycle of a chunk coordinate. No entry in the index means unloaded.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChunkState {
    /// Being read from disk or generated; edits go to the pending mailbox.
    Loading,
    /// Voxels and light are in place but the chunk is outside the view window.
    Populated,
    Active,
    /// Left the view window. Data stays resident.
    Inactive,
}

struct Slot {
    state: ChunkState,
    data: Option<ChunkHandle>,
}

struct IndexInner {
    slots: HashMap<ChunkCoord, Slot>,
    view: HashSet<ChunkCoord>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub loading: usize,
    pub populated: usize,
    pub active: usize,
    pub inactive: usize,
    pub loads_started: u64,
    pub loads_finished: u64,
}

/// Chunks that changed state when the view window moved.
#[derive(Debug, Default)]
pub(crate) struct ViewChange {
    pub activated: Vec<ChunkCoord>,
    pub deactivated: Vec<ChunkCoord>,
}

/// Coordinate to chunk map plus the current view window.
/// The lock is only held for lookups and state transitions.
pub struct WorldIndex {
    inner: Mutex<IndexInner>,
    loads_started: AtomicU64,
    loads_finished: AtomicU64,
}

impl WorldIndex {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(IndexInner {
                slots: HashMap::new(),
                view: HashSet::new(),
            }),
            loads_started: AtomicU64::new(0),
            loads_finished: AtomicU64::new(0),
        }
    }

    pub fn state(&self, c: ChunkCoord) -> Option<ChunkState> {
        lock(&self.inner).slots.get(&c).map(|s| s.state)
    }

    /// The chunk's voxels, once it is populated.
    pub fn handle(&self, c: ChunkCoord) -> Option<ChunkHandle> {
        lock(&self.inner).slots.get(&c).and_then(|s| s.data.clone())
    }

    /// Every populated chunk.
    pub fn handles(&self) -> HashMap<ChunkCoord, ChunkHandle> {
        lock(&self.inner)
            .slots
            .iter()
            .filter_map(|(c, s)| s.data.clone().map(|h| (*c, h)))
            .collect()
    }

    pub fn coords_in(&self, state: ChunkState) -> Vec<ChunkCoord> {
        let mut out: Vec<ChunkCoord> = lock(&self.inner)
            .slots
            .iter()
            .filter(|(_, s)| s.state == state)
            .map(|(c, _)| *c)
            .collect();
        out.sort();
        out
    }

    /// Claims an unloaded coordinate for loading. False if it already has an entry.
    pub(crate) fn begin_loading(&self, c: ChunkCoord) -> bool {
        let mut inner = lock(&self.inner);
        if inner.slots.contains_key(&c) {
            return false;
        }
        inner.slots.insert(
            c,
            Slot {
                state: ChunkState::Loading,
                data: None,
            },
        );
        self.loads_started.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Publishes a populated chunk. It goes straight to `Active` when inside the view window.
    pub(crate) fn finish_loading(&self, data: ChunkData) -> (ChunkHandle, ChunkState) {
        let c = data.coord;
        let handle = Arc::new(RwLock::new(data));
        let mut inner = lock(&self.inner);
        let state = if inner.view.contains(&c) {
            ChunkState::Active
        } else {
            ChunkState::Populated
        };
        inner.slots.insert(
            c,
            Slot {
                state,
                data: Some(Arc::clone(&handle)),
            },
        );
        self.loads_finished.fetch_add(1, Ordering::Relaxed);
        (handle, state)
    }

    /// Replaces the view window. Populated chunks entering it become `Active`;
    /// active chunks leaving it become `Inactive`.
    pub(crate) fn set_view(&self, view: HashSet<ChunkCoord>) -> ViewChange {
        let mut change = ViewChange::default();
        let mut inner = lock(&self.inner);
        let IndexInner { slots, view: old } = &mut *inner;
        for c in old.iter() {
            if view.contains(c) {
                continue;
            }
            if let Some(slot) = slots.get_mut(c) {
                if slot.state == ChunkState::Active {
                    slot.state = ChunkState::Inactive;
                    change.deactivated.push(*c);
                }
            }
        }
        for c in view.iter() {
            if let Some(slot) = slots.get_mut(c) {
                if matches!(slot.state, ChunkState::Populated | ChunkState::Inactive) {
                    slot.state = ChunkState::Active;
                    change.activated.push(*c);
                }
            }
        }
        *old = view;
        change.activated.sort();
        change.deactivated.sort();
        change
    }

    pub fn stats(&self) -> IndexStats {
        let mut stats = IndexStats {
            loads_started: self.loads_started.load(Ordering::Relaxed),
            loads_finished: self.loads_finished.load(Ordering::Relaxed),
            ..IndexStats::default()
        };
        for slot in lock(&self.inner).slots.values() {
            match slot.state {
                ChunkState::Loading => stats.loading += 1,
                ChunkState::Populated => stats.populated += 1,
                ChunkState::Active => stats.active += 1,
                ChunkState::Inactive => stats.inactive += 1,
            }
        }
        stats
    }
}

impl Default for WorldIndex {
    fn default() -> Self {
        Self::new()
    }
}
