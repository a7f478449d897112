use std::sync::Arc;

use hashbrown::HashMap;
use strata_blocks::BlockId;
use strata_chunk::VoxelState;
use strata_world::{VoxelMod, VoxelPos};

/// Read access to loaded voxels for block behaviours.
pub trait VoxelView {
    /// `None` when the position is outside the world or its chunk is not populated.
    fn voxel(&self, p: VoxelPos) -> Option<VoxelState>;
}

/// Per-tick logic for one block type.
///
/// Behaviours never write voxels themselves. They return edit requests that the
/// runtime applies through its edit path.
pub trait BlockBehaviour: Send + Sync {
    /// Whether the voxel at `p` should stay in its chunk's active set.
    fn is_active(&self, world: &dyn VoxelView, p: VoxelPos) -> bool;
    fn behave(&self, world: &dyn VoxelView, p: VoxelPos) -> Vec<VoxelMod>;
}

/// Behaviours keyed by block id.
#[derive(Clone, Default)]
pub struct BehaviourSet {
    by_id: HashMap<BlockId, Arc<dyn BlockBehaviour>>,
}

impl BehaviourSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: BlockId, behaviour: Arc<dyn BlockBehaviour>) {
        self.by_id.insert(id, behaviour);
    }

    #[inline]
    pub fn get(&self, id: BlockId) -> Option<&Arc<dyn BlockBehaviour>> {
        self.by_id.get(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
