//! Per-chunk voxel storage and chunk population.
#![forbid(unsafe_code)]

mod borders;

pub use borders::{BorderSide, NeighborBorders};

use std::collections::BTreeSet;

use strata_blocks::{AIR, BlockId, BlockRegistry, Orientation};
use strata_world::{ChunkCoord, TerrainGenerator, VoxelMod, VoxelPos, World};

/// One cell: block, facing, and light level `0..=15`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct VoxelState {
    pub id: BlockId,
    pub orientation: Orientation,
    pub light: u8,
}

impl VoxelState {
    pub const AIR: VoxelState = VoxelState {
        id: AIR,
        orientation: Orientation::North,
        light: 0,
    };

    #[inline]
    pub fn new(id: BlockId, orientation: Orientation) -> Self {
        Self {
            id,
            orientation,
            light: 0,
        }
    }
}

/// What a changing `modify` replaced; lighting and the active set need it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Modified {
    pub old_id: BlockId,
    pub old_opacity: u8,
    pub new_opacity: u8,
}

#[derive(Clone, Debug)]
pub struct ChunkData {
    pub coord: ChunkCoord,
    pub sx: usize,
    pub sy: usize,
    pub sz: usize,
    voxels: Vec<VoxelState>,
    // Local indices of voxels with a live behaviour; ordered for deterministic ticks.
    active: BTreeSet<usize>,
    dirty: bool,
}

impl ChunkData {
    pub fn new(coord: ChunkCoord, width: usize, height: usize) -> Self {
        Self {
            coord,
            sx: width,
            sy: height,
            sz: width,
            voxels: vec![VoxelState::AIR; width * height * width],
            active: BTreeSet::new(),
            dirty: false,
        }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        (y * self.sz + z) * self.sx + x
    }

    #[inline]
    fn unidx(&self, i: usize) -> (usize, usize, usize) {
        let x = i % self.sx;
        let z = (i / self.sx) % self.sz;
        let y = i / (self.sx * self.sz);
        (x, y, z)
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as usize) < self.sx
            && (y as usize) < self.sy
            && (z as usize) < self.sz
    }

    /// Bounds-checked read; `None` for anything outside this chunk.
    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> Option<VoxelState> {
        if !self.in_bounds(x, y, z) {
            return None;
        }
        Some(self.voxels[self.idx(x as usize, y as usize, z as usize)])
    }

    #[inline]
    pub fn get_local(&self, x: usize, y: usize, z: usize) -> VoxelState {
        self.voxels[self.idx(x, y, z)]
    }

    #[inline]
    pub fn light(&self, x: i32, y: i32, z: i32) -> Option<u8> {
        self.get(x, y, z).map(|v| v.light)
    }

    #[inline]
    pub fn set_light(&mut self, x: usize, y: usize, z: usize, light: u8) {
        let i = self.idx(x, y, z);
        self.voxels[i].light = light;
    }

    /// Writes id and orientation without any bookkeeping. Population only.
    #[inline]
    pub fn set_raw(&mut self, x: usize, y: usize, z: usize, id: BlockId, orientation: Orientation) {
        let i = self.idx(x, y, z);
        self.voxels[i].id = id;
        self.voxels[i].orientation = orientation;
    }

    /// Edit entry point. Returns `None` when out of bounds or when `id` is already there;
    /// otherwise replaces id and orientation and marks the chunk dirty.
    pub fn modify(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        id: BlockId,
        orientation: Orientation,
        reg: &BlockRegistry,
    ) -> Option<Modified> {
        if !self.in_bounds(x, y, z) {
            return None;
        }
        let i = self.idx(x as usize, y as usize, z as usize);
        let v = &mut self.voxels[i];
        if v.id == id {
            return None;
        }
        let out = Modified {
            old_id: v.id,
            old_opacity: reg.opacity(v.id),
            new_opacity: reg.opacity(id),
        };
        v.id = id;
        v.orientation = orientation;
        self.dirty = true;
        Some(out)
    }

    /// Local offset of a global position if it falls in this chunk's columns.
    #[inline]
    pub fn local_of(&self, p: VoxelPos) -> Option<(usize, usize, usize)> {
        let lx = p.x - self.coord.cx * self.sx as i32;
        let lz = p.z - self.coord.cz * self.sz as i32;
        if !self.in_bounds(lx, p.y, lz) {
            return None;
        }
        Some((lx as usize, p.y as usize, lz as usize))
    }

    #[inline]
    pub fn global_of(&self, x: usize, y: usize, z: usize) -> VoxelPos {
        VoxelPos::new(
            self.coord.cx * self.sx as i32 + x as i32,
            y as i32,
            self.coord.cz * self.sz as i32 + z as i32,
        )
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn set_active(&mut self, x: usize, y: usize, z: usize, active: bool) {
        let i = self.idx(x, y, z);
        if active {
            self.active.insert(i);
        } else {
            self.active.remove(&i);
        }
    }

    #[inline]
    pub fn is_active(&self, x: usize, y: usize, z: usize) -> bool {
        self.active.contains(&self.idx(x, y, z))
    }

    /// Local positions with a live behaviour, in index order.
    pub fn active_voxels(&self) -> Vec<(usize, usize, usize)> {
        self.active.iter().map(|&i| self.unidx(i)).collect()
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Block ids in storage order.
    pub fn ids(&self) -> Vec<u16> {
        self.voxels.iter().map(|v| v.id).collect()
    }

    /// Orientation bytes in storage order.
    pub fn orientations(&self) -> Vec<u8> {
        self.voxels.iter().map(|v| v.orientation.to_u8()).collect()
    }

    /// Rebuilds a chunk from stored ids and orientations. Light starts at 0.
    /// `None` if the arrays do not match the layout or an orientation byte is invalid.
    pub fn from_records(
        coord: ChunkCoord,
        width: usize,
        height: usize,
        ids: &[u16],
        orientations: &[u8],
    ) -> Option<Self> {
        let n = width * height * width;
        if ids.len() != n || orientations.len() != n {
            return None;
        }
        let mut voxels = Vec::with_capacity(n);
        for (&id, &o) in ids.iter().zip(orientations) {
            voxels.push(VoxelState::new(id, Orientation::from_u8(o)?));
        }
        Some(Self {
            coord,
            sx: width,
            sy: height,
            sz: width,
            voxels,
            active: BTreeSet::new(),
            dirty: false,
        })
    }
}

#[derive(Clone, Debug)]
pub struct ChunkGenerateResult {
    pub data: ChunkData,
    /// Flora placements rooted in this chunk. They may reach into neighbours.
    pub mods: Vec<VoxelMod>,
}

/// Fills a chunk from the terrain generator, one column profile per (x,z).
pub fn generate_chunk(generator: &TerrainGenerator, coord: ChunkCoord) -> ChunkGenerateResult {
    let world: &World = generator.world();
    let mut data = ChunkData::new(coord, world.chunk_width, world.chunk_height);
    let mut mods = Vec::new();
    let origin = world.chunk_origin(coord);
    for z in 0..data.sz {
        for x in 0..data.sx {
            let wx = origin.x + x as i32;
            let wz = origin.z + z as i32;
            let col = generator.column(wx, wz);
            for y in 0..data.sy {
                let id =
                    generator.block_in_column(&col, VoxelPos::new(wx, y as i32, wz), Some(&mut mods));
                data.set_raw(x, y, z, id, Orientation::North);
            }
        }
    }
    ChunkGenerateResult { data, mods }
}
