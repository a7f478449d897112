use std::cell::RefCell;
use std::sync::RwLockWriteGuard;

use hashbrown::{HashMap, HashSet};
use strata_blocks::BlockId;
use strata_chunk::ChunkData;
use strata_lighting::LightField;
use strata_world::{ChunkCoord, VoxelPos, World};

use crate::index::ChunkHandle;
use crate::write;

/// Light field over shared chunk handles. Each chunk is write-locked the first
/// time the solver reaches it and stays locked until the field is dropped.
///
/// Only one field may exist at a time (the runtime's light lock), so chunk locks
/// are never taken in conflicting orders.
pub(crate) struct LockedField<'a> {
    world: World,
    handles: &'a HashMap<ChunkCoord, ChunkHandle>,
    guards: RefCell<HashMap<ChunkCoord, RwLockWriteGuard<'a, ChunkData>>>,
    touched: HashSet<ChunkCoord>,
}

impl<'a> LockedField<'a> {
    pub fn new(world: World, handles: &'a HashMap<ChunkCoord, ChunkHandle>) -> Self {
        Self {
            world,
            handles,
            guards: RefCell::new(HashMap::new()),
            touched: HashSet::new(),
        }
    }

    /// Chunks whose light changed. Releases every chunk lock.
    pub fn into_touched(self) -> HashSet<ChunkCoord> {
        self.touched
    }

    fn with_chunk<R>(&self, c: ChunkCoord, f: impl FnOnce(&mut ChunkData) -> R) -> Option<R> {
        let handles: &'a HashMap<ChunkCoord, ChunkHandle> = self.handles;
        let handle = handles.get(&c)?;
        let mut guards = self.guards.borrow_mut();
        let guard = guards.entry(c).or_insert_with(|| write(handle));
        Some(f(&mut **guard))
    }
}

impl LightField for LockedField<'_> {
    fn height(&self) -> i32 {
        self.world.chunk_height as i32
    }

    fn block(&self, p: VoxelPos) -> Option<BlockId> {
        let (c, x, y, z) = self.world.split(p)?;
        self.with_chunk(c, |ch| ch.get_local(x, y, z).id)
    }

    fn light(&self, p: VoxelPos) -> Option<u8> {
        let (c, x, y, z) = self.world.split(p)?;
        self.with_chunk(c, |ch| ch.get_local(x, y, z).light)
    }

    fn set_light(&mut self, p: VoxelPos, light: u8) {
        let Some((c, x, y, z)) = self.world.split(p) else {
            return;
        };
        let changed = self.with_chunk(c, |ch| {
            if ch.get_local(x, y, z).light == light {
                return false;
            }
            ch.set_light(x, y, z, light);
            true
        });
        if changed == Some(true) {
            self.touched.insert(c);
        }
    }
}
