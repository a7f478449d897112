//! Edits waiting for their chunk, and which chunks an edit touches.
#![forbid(unsafe_code)]

use std::collections::HashMap;

use strata_world::{ChunkCoord, VoxelMod, VoxelPos, World};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingStats {
    pub chunk_entries: usize,
    pub voxel_mods: usize,
}

/// Per-chunk mailbox of voxel mods for chunks that are not populated yet.
/// Mods are kept in arrival order; when replayed, later entries win.
pub struct PendingEdits {
    world: World,
    inner: HashMap<ChunkCoord, Vec<VoxelMod>>,
}

impl PendingEdits {
    pub fn new(world: World) -> Self {
        Self {
            world,
            inner: HashMap::new(),
        }
    }

    pub fn stats(&self) -> PendingStats {
        PendingStats {
            chunk_entries: self.inner.len(),
            voxel_mods: self.inner.values().map(Vec::len).sum(),
        }
    }

    /// Queues `m` under the chunk that owns its position. Mods outside the world are dropped.
    pub fn push(&mut self, m: VoxelMod) -> bool {
        if !self.world.voxel_in_world(m.pos) {
            return false;
        }
        let c = self.world.chunk_of(m.pos);
        self.inner.entry(c).or_default().push(m);
        true
    }

    /// Removes and returns everything queued for `c`, oldest first.
    pub fn take(&mut self, c: ChunkCoord) -> Vec<VoxelMod> {
        self.inner.remove(&c).unwrap_or_default()
    }
}

/// Chunks whose meshes can change when the voxel at `p` changes: its own chunk,
/// plus the horizontal neighbours it touches when it sits on a chunk edge.
/// Coordinates outside the world are left out.
pub fn affected_chunks(world: &World, p: VoxelPos) -> Vec<ChunkCoord> {
    if !world.voxel_in_world(p) {
        return Vec::new();
    }
    let c = world.chunk_of(p);
    let w = world.chunk_width as i32;
    let lx = p.x - c.cx * w;
    let lz = p.z - c.cz * w;

    let mut out = vec![c];
    let mut push = |n: ChunkCoord| {
        if world.chunk_in_world(n) && !out.contains(&n) {
            out.push(n);
        }
    };
    if lx == 0 {
        push(c.offset(-1, 0));
    }
    if lx == w - 1 {
        push(c.offset(1, 0));
    }
    if lz == 0 {
        push(c.offset(0, -1));
    }
    if lz == w - 1 {
        push(c.offset(0, 1));
    }
    out
}
