use strata_chunk::{ChunkData, NeighborBorders, VoxelState};

/// Voxel lookup for meshing: the chunk itself plus the captured layers of its loaded neighbours.
pub struct NeighborView<'a> {
    chunk: &'a ChunkData,
    borders: &'a NeighborBorders,
}

impl<'a> NeighborView<'a> {
    pub fn new(chunk: &'a ChunkData, borders: &'a NeighborBorders) -> Self {
        Self { chunk, borders }
    }

    /// `None` past the top or bottom of the world and across an unloaded seam.
    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> Option<VoxelState> {
        self.chunk
            .get(x, y, z)
            .or_else(|| self.borders.get(x, y, z))
    }
}
