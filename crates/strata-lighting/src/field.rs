use std::collections::{HashMap, HashSet};

use strata_blocks::BlockId;
use strata_chunk::ChunkData;
use strata_world::{ChunkCoord, VoxelPos, World};

use crate::LightField;

/// Light field over plainly owned chunks. Records which chunks had light change.
pub struct ChunkMapField<'a> {
    world: World,
    chunks: &'a mut HashMap<ChunkCoord, ChunkData>,
    touched: HashSet<ChunkCoord>,
}

impl<'a> ChunkMapField<'a> {
    pub fn new(world: World, chunks: &'a mut HashMap<ChunkCoord, ChunkData>) -> Self {
        Self {
            world,
            chunks,
            touched: HashSet::new(),
        }
    }

    /// Chunks whose light changed since this field was created.
    pub fn touched(&self) -> &HashSet<ChunkCoord> {
        &self.touched
    }

    fn locate(&self, p: VoxelPos) -> Option<(&ChunkData, usize, usize, usize)> {
        let (c, x, y, z) = self.world.split(p)?;
        self.chunks.get(&c).map(|ch| (ch, x, y, z))
    }
}

impl LightField for ChunkMapField<'_> {
    fn height(&self) -> i32 {
        self.world.chunk_height as i32
    }

    fn block(&self, p: VoxelPos) -> Option<BlockId> {
        self.locate(p).map(|(ch, x, y, z)| ch.get_local(x, y, z).id)
    }

    fn light(&self, p: VoxelPos) -> Option<u8> {
        self.locate(p).map(|(ch, x, y, z)| ch.get_local(x, y, z).light)
    }

    fn set_light(&mut self, p: VoxelPos, light: u8) {
        let Some((c, x, y, z)) = self.world.split(p) else {
            return;
        };
        if let Some(ch) = self.chunks.get_mut(&c) {
            if ch.get_local(x, y, z).light != light {
                ch.set_light(x, y, z, light);
                self.touched.insert(c);
            }
        }
    }
}
