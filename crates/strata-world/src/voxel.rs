use serde::Deserialize;
use strata_geom::Vec3;

pub const CHUNK_WIDTH: usize = 16;
pub const CHUNK_HEIGHT: usize = 128;
pub const WORLD_SIZE_IN_CHUNKS: usize = 100;

/// Horizontal chunk grid coordinate. Chunks span the full world height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    #[inline]
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cz: self.cz + dz,
        }
    }

    #[inline]
    pub fn distance_sq(self, other: ChunkCoord) -> i64 {
        let dx = i64::from(self.cx - other.cx);
        let dz = i64::from(self.cz - other.cz);
        dx * dx + dz * dz
    }

    /// The four edge-adjacent chunks: -X, +X, -Z, +Z.
    #[inline]
    pub fn neighbors4(self) -> [ChunkCoord; 4] {
        [
            self.offset(-1, 0),
            self.offset(1, 0),
            self.offset(0, -1),
            self.offset(0, 1),
        ]
    }
}

impl From<(i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<ChunkCoord> for (i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cz)
    }
}

/// Global integer voxel position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct VoxelPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl VoxelPos {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn offset(self, d: (i32, i32, i32)) -> Self {
        Self::new(self.x + d.0, self.y + d.1, self.z + d.2)
    }

    #[inline]
    pub fn from_vec3(v: Vec3) -> Self {
        let (x, y, z) = v.floor_cell();
        Self::new(x, y, z)
    }
}

impl From<(i32, i32, i32)> for VoxelPos {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

/// World layout plus seed. Chunk coordinates run over `0..world_size_chunks` on both axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct World {
    pub chunk_width: usize,
    pub chunk_height: usize,
    pub world_size_chunks: usize,
    pub seed: i32,
}

impl Default for World {
    fn default() -> Self {
        Self {
            chunk_width: CHUNK_WIDTH,
            chunk_height: CHUNK_HEIGHT,
            world_size_chunks: WORLD_SIZE_IN_CHUNKS,
            seed: 0,
        }
    }
}

impl World {
    pub fn new(seed: i32) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn with_layout(chunk_width: usize, chunk_height: usize, world_size_chunks: usize, seed: i32) -> Self {
        Self {
            chunk_width,
            chunk_height,
            world_size_chunks,
            seed,
        }
    }

    /// Rejects layouts that have no voxels or whose voxel extent overflows `i32`.
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_width == 0 || self.chunk_height == 0 || self.world_size_chunks == 0 {
            return Err(format!(
                "world layout needs non-zero sizes, got chunk_width {}, chunk_height {}, world_size_chunks {}",
                self.chunk_width, self.chunk_height, self.world_size_chunks
            ));
        }
        let extent = self.chunk_width.checked_mul(self.world_size_chunks);
        if extent.is_none_or(|n| n > i32::MAX as usize) || self.chunk_height > i32::MAX as usize {
            return Err("world layout is too large for i32 voxel coordinates".to_string());
        }
        Ok(())
    }

    #[inline]
    pub fn world_size_voxels(&self) -> i32 {
        (self.chunk_width * self.world_size_chunks) as i32
    }

    #[inline]
    pub fn chunk_volume(&self) -> usize {
        self.chunk_width * self.chunk_height * self.chunk_width
    }

    #[inline]
    pub fn voxel_in_world(&self, p: VoxelPos) -> bool {
        let n = self.world_size_voxels();
        p.x >= 0 && p.x < n && p.y >= 0 && p.y < self.chunk_height as i32 && p.z >= 0 && p.z < n
    }

    #[inline]
    pub fn chunk_in_world(&self, c: ChunkCoord) -> bool {
        let n = self.world_size_chunks as i32;
        c.cx >= 0 && c.cx < n && c.cz >= 0 && c.cz < n
    }

    #[inline]
    pub fn chunk_of(&self, p: VoxelPos) -> ChunkCoord {
        let w = self.chunk_width as i32;
        ChunkCoord::new(p.x.div_euclid(w), p.z.div_euclid(w))
    }

    /// Splits a global position into its chunk and local offset; `None` outside the world.
    #[inline]
    pub fn split(&self, p: VoxelPos) -> Option<(ChunkCoord, usize, usize, usize)> {
        if !self.voxel_in_world(p) {
            return None;
        }
        let w = self.chunk_width as i32;
        Some((
            self.chunk_of(p),
            p.x.rem_euclid(w) as usize,
            p.y as usize,
            p.z.rem_euclid(w) as usize,
        ))
    }

    /// Global position of the chunk's (0,0,0) voxel.
    #[inline]
    pub fn chunk_origin(&self, c: ChunkCoord) -> VoxelPos {
        let w = self.chunk_width as i32;
        VoxelPos::new(c.cx * w, 0, c.cz * w)
    }

    #[inline]
    pub fn center_chunk(&self) -> ChunkCoord {
        let mid = (self.world_size_chunks / 2) as i32;
        ChunkCoord::new(mid, mid)
    }

    /// Player spawn point: world center, a little above typical terrain.
    pub fn spawn_position(&self) -> Vec3 {
        let mid = self.world_size_voxels() as f32 / 2.0;
        let y = self.chunk_height.saturating_sub(50) as f32;
        Vec3::new(mid, y, mid)
    }
}
