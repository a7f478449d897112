use crate::{ChunkData, VoxelState};

/// The four horizontal sides of a chunk.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BorderSide {
    NegX = 0,
    PosX = 1,
    NegZ = 2,
    PosZ = 3,
}

impl BorderSide {
    pub const ALL: [BorderSide; 4] = [
        BorderSide::NegX,
        BorderSide::PosX,
        BorderSide::NegZ,
        BorderSide::PosZ,
    ];

    /// Chunk-grid step towards the neighbour on this side.
    #[inline]
    pub fn offset(self) -> (i32, i32) {
        match self {
            BorderSide::NegX => (-1, 0),
            BorderSide::PosX => (1, 0),
            BorderSide::NegZ => (0, -1),
            BorderSide::PosZ => (0, 1),
        }
    }

    #[inline]
    pub fn opposite(self) -> BorderSide {
        match self {
            BorderSide::NegX => BorderSide::PosX,
            BorderSide::PosX => BorderSide::NegX,
            BorderSide::NegZ => BorderSide::PosZ,
            BorderSide::PosZ => BorderSide::NegZ,
        }
    }
}

impl ChunkData {
    /// Copies this chunk's outermost voxel layer on `side`.
    /// X sides are laid out `y * sz + z`, Z sides `y * sx + x`.
    pub fn border_plane(&self, side: BorderSide) -> Vec<VoxelState> {
        let mut out = Vec::new();
        match side {
            BorderSide::NegX | BorderSide::PosX => {
                let x = if side == BorderSide::NegX { 0 } else { self.sx - 1 };
                out.reserve(self.sy * self.sz);
                for y in 0..self.sy {
                    for z in 0..self.sz {
                        out.push(self.get_local(x, y, z));
                    }
                }
            }
            BorderSide::NegZ | BorderSide::PosZ => {
                let z = if side == BorderSide::NegZ { 0 } else { self.sz - 1 };
                out.reserve(self.sy * self.sx);
                for y in 0..self.sy {
                    for x in 0..self.sx {
                        out.push(self.get_local(x, y, z));
                    }
                }
            }
        }
        out
    }
}

/// Snapshot of the voxel layers just outside a chunk, one per loaded neighbour.
/// A missing plane means the neighbour is not loaded.
#[derive(Clone, Debug)]
pub struct NeighborBorders {
    sx: usize,
    sy: usize,
    sz: usize,
    planes: [Option<Vec<VoxelState>>; 4],
}

impl NeighborBorders {
    pub fn empty(sx: usize, sy: usize, sz: usize) -> Self {
        Self {
            sx,
            sy,
            sz,
            planes: [None, None, None, None],
        }
    }

    /// Stores the neighbour's plane facing this chunk. Planes of the wrong size are ignored.
    pub fn set(&mut self, side: BorderSide, plane: Vec<VoxelState>) {
        let expect = match side {
            BorderSide::NegX | BorderSide::PosX => self.sy * self.sz,
            BorderSide::NegZ | BorderSide::PosZ => self.sy * self.sx,
        };
        if plane.len() == expect {
            self.planes[side as usize] = Some(plane);
        }
    }

    /// Captures every loaded neighbour plane through `neighbor`.
    pub fn capture(
        sx: usize,
        sy: usize,
        sz: usize,
        mut neighbor: impl FnMut(BorderSide) -> Option<Vec<VoxelState>>,
    ) -> Self {
        let mut b = Self::empty(sx, sy, sz);
        for side in BorderSide::ALL {
            if let Some(plane) = neighbor(side) {
                b.set(side, plane);
            }
        }
        b
    }

    #[inline]
    pub fn is_loaded(&self, side: BorderSide) -> bool {
        self.planes[side as usize].is_some()
    }

    /// Voxel one step outside the chunk, in the owning chunk's local frame.
    /// `None` if the position is not in a border layer or that neighbour is absent.
    pub fn get(&self, x: i32, y: i32, z: i32) -> Option<VoxelState> {
        if y < 0 || y as usize >= self.sy {
            return None;
        }
        let y = y as usize;
        let (sx, sz) = (self.sx as i32, self.sz as i32);
        let in_x = x >= 0 && x < sx;
        let in_z = z >= 0 && z < sz;
        let (side, i) = if in_z && (x == -1 || x == sx) {
            let side = if x == -1 { BorderSide::NegX } else { BorderSide::PosX };
            (side, y * self.sz + z as usize)
        } else if in_x && (z == -1 || z == sz) {
            let side = if z == -1 { BorderSide::NegZ } else { BorderSide::PosZ };
            (side, y * self.sx + x as usize)
        } else {
            return None;
        };
        self.planes[side as usize].as_ref().map(|p| p[i])
    }
}
