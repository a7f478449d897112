//! Multi-voxel flora stamped through deferred placements.

use strata_blocks::{BlockId, Orientation};

use crate::noise::{NoiseSource, perlin_2d};
use crate::voxel::VoxelPos;
use crate::worldgen::WorldGenParams;

pub const FLORA_TREE: usize = 0;
pub const FLORA_CACTUS: usize = 1;

/// A pending world edit, applied once the chunk that owns `pos` exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoxelMod {
    pub pos: VoxelPos,
    pub id: BlockId,
    pub orientation: Orientation,
}

impl VoxelMod {
    #[inline]
    pub fn new(pos: VoxelPos, id: BlockId) -> Self {
        Self {
            pos,
            id,
            orientation: Orientation::default(),
        }
    }
}

fn flora_height(
    noise: &dyn NoiseSource,
    base: VoxelPos,
    offset: f32,
    scale: f32,
    min_height: i32,
    max_height: i32,
    chunk_width: usize,
) -> i32 {
    let n = perlin_2d(noise, base.x as f32, base.z as f32, offset, scale, chunk_width);
    ((max_height as f32 * n) as i32).max(min_height)
}

/// Appends the placements for flora `index` rooted at surface voxel `base`.
/// Unknown indices place nothing.
pub fn make_flora(
    index: usize,
    base: VoxelPos,
    min_height: i32,
    max_height: i32,
    noise: &dyn NoiseSource,
    params: &WorldGenParams,
    chunk_width: usize,
    out: &mut Vec<VoxelMod>,
) {
    match index {
        FLORA_TREE => {
            let h = flora_height(noise, base, 250.0, 3.0, min_height, max_height, chunk_width);
            make_tree(base, h, params.log, params.leaves, out);
        }
        FLORA_CACTUS => {
            let h = flora_height(noise, base, 23456.0, 2.0, min_height, max_height, chunk_width);
            make_cactus(base, h, params.cactus, out);
        }
        _ => {}
    }
}

/// Trunk for `1..height`, then a 7x7x7 canopy starting at `height`.
pub fn make_tree(base: VoxelPos, height: i32, log: BlockId, leaves: BlockId, out: &mut Vec<VoxelMod>) {
    for i in 1..height {
        out.push(VoxelMod::new(base.offset((0, i, 0)), log));
    }
    for x in -3..=3 {
        for y in 0..7 {
            for z in -3..=3 {
                out.push(VoxelMod::new(base.offset((x, height + y, z)), leaves));
            }
        }
    }
}

pub fn make_cactus(base: VoxelPos, height: i32, cactus: BlockId, out: &mut Vec<VoxelMod>) {
    for i in 1..=height {
        out.push(VoxelMod::new(base.offset((0, i, 0)), cactus));
    }
}
