//! Voxel light: sky columns, block emission, and incremental relighting across chunk seams.
#![forbid(unsafe_code)]

pub mod baseline;
mod field;

pub use field::ChunkMapField;

use std::collections::VecDeque;

use strata_blocks::{BlockId, BlockRegistry, Face, MAX_LIGHT};
use strata_world::VoxelPos;

/// Global voxel access for the light solver.
///
/// `None` means the position is not held by a loaded chunk. The solver never
/// propagates into, or reads light from, such positions.
pub trait LightField {
    /// Voxel rows per column.
    fn height(&self) -> i32;
    fn block(&self, p: VoxelPos) -> Option<BlockId>;
    fn light(&self, p: VoxelPos) -> Option<u8>;
    /// Writes to unloaded positions are dropped.
    fn set_light(&mut self, p: VoxelPos, light: u8);
}

/// Light a block with `light` hands to each neighbour.
#[inline]
pub fn cast_light(reg: &BlockRegistry, id: BlockId, light: u8) -> u8 {
    light
        .saturating_sub(reg.opacity(id))
        .max(source_level(reg, id))
        .saturating_sub(1)
}

/// Light a non-sky voxel holds with no help from its neighbours.
#[inline]
pub fn source_level(reg: &BlockRegistry, id: BlockId) -> u8 {
    reg.emission(id).min(MAX_LIGHT)
}

/// True when nothing from `p` up to the top of its column blocks light.
pub fn is_sky<F: LightField + ?Sized>(field: &F, reg: &BlockRegistry, p: VoxelPos) -> bool {
    for y in p.y..field.height() {
        match field.block(VoxelPos::new(p.x, y, p.z)) {
            Some(id) if reg.opacity(id) == 0 => {}
            _ => return false,
        }
    }
    true
}

/// Pending darken and spread steps.
#[derive(Default, Debug)]
pub struct LightWork {
    darken: VecDeque<(VoxelPos, u8)>,
    spread: VecDeque<VoxelPos>,
}

impl LightWork {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.darken.is_empty() && self.spread.is_empty()
    }

    /// Asks `p` to push its current light to its neighbours on the next run.
    #[inline]
    pub fn spread_from(&mut self, p: VoxelPos) {
        self.spread.push_back(p);
    }
}

/// Changes the light at `p` and queues the consequences.
/// A drop queues a darken step with the old cast; a level above 1 queues a spread.
pub fn set_light<F: LightField + ?Sized>(
    field: &mut F,
    reg: &BlockRegistry,
    work: &mut LightWork,
    p: VoxelPos,
    light: u8,
) {
    let (Some(id), Some(old)) = (field.block(p), field.light(p)) else {
        return;
    };
    if old == light {
        return;
    }
    field.set_light(p, light);
    if light < old {
        work.darken.push_back((p, cast_light(reg, id, old)));
    }
    if light > 1 {
        work.spread.push_back(p);
    }
}

/// Scans one column downward from `start_y`. Voxels stay at full light until the
/// first one with opacity; that voxel and everything below fall back to their own
/// emission. Writes go through [`set_light`], so the caller must [`run`] the work.
pub fn cast_natural_light<F: LightField + ?Sized>(
    field: &mut F,
    reg: &BlockRegistry,
    work: &mut LightWork,
    x: i32,
    z: i32,
    start_y: i32,
) {
    let top = start_y.min(field.height() - 1);
    let mut obstructed = false;
    for y in (0..=top).rev() {
        let p = VoxelPos::new(x, y, z);
        let Some(id) = field.block(p) else {
            return;
        };
        if reg.opacity(id) > 0 {
            obstructed = true;
        }
        let level = if obstructed {
            source_level(reg, id)
        } else {
            MAX_LIGHT
        };
        set_light(field, reg, work, p, level);
    }
}

/// Drains the work: every darken step first, then the flood.
///
/// Darkening drops each neighbour whose light could have come from the darkened
/// voxel to its own source level and re-enters the queue with that neighbour's old
/// cast. Brighter neighbours are queued to spread so the hole refills from them.
pub fn run<F: LightField + ?Sized>(field: &mut F, reg: &BlockRegistry, work: &mut LightWork) {
    while let Some((p, old_cast)) = work.darken.pop_front() {
        for face in Face::ALL {
            let n = p.offset(face.delta());
            let (Some(id), Some(nl)) = (field.block(n), field.light(n)) else {
                continue;
            };
            if nl <= old_cast {
                let src = source_level(reg, id);
                if nl > src {
                    field.set_light(n, src);
                    work.darken.push_back((n, cast_light(reg, id, nl)));
                }
                if src > 1 {
                    work.spread.push_back(n);
                }
            } else {
                work.spread.push_back(n);
            }
        }
    }
    while let Some(p) = work.spread.pop_front() {
        let (Some(id), Some(l)) = (field.block(p), field.light(p)) else {
            continue;
        };
        let cast = cast_light(reg, id, l);
        if cast == 0 {
            continue;
        }
        for face in Face::ALL {
            let n = p.offset(face.delta());
            if let Some(nl) = field.light(n) {
                if nl < cast {
                    field.set_light(n, cast);
                    work.spread.push_back(n);
                }
            }
        }
    }
}

/// Lights a freshly populated chunk whose columns start at `origin`.
/// Recasts every column, then lets loaded neighbours flood across the seams.
pub fn light_new_chunk<F: LightField + ?Sized>(
    field: &mut F,
    reg: &BlockRegistry,
    origin: VoxelPos,
    sx: usize,
    sz: usize,
) {
    let mut work = LightWork::new();
    let h = field.height();
    for dz in 0..sz as i32 {
        for dx in 0..sx as i32 {
            cast_natural_light(field, reg, &mut work, origin.x + dx, origin.z + dz, h - 1);
        }
    }
    let (x0, z0) = (origin.x, origin.z);
    let (x1, z1) = (origin.x + sx as i32, origin.z + sz as i32);
    for y in 0..h {
        for z in z0..z1 {
            work.spread_from(VoxelPos::new(x0 - 1, y, z));
            work.spread_from(VoxelPos::new(x1, y, z));
        }
        for x in x0..x1 {
            work.spread_from(VoxelPos::new(x, y, z0 - 1));
            work.spread_from(VoxelPos::new(x, y, z1));
        }
    }
    run(field, reg, &mut work);
    log::trace!(target: "lighting", "lit chunk at ({}, {})", origin.x, origin.z);
}

/// Repairs light after the block at `p` changed from `old_id`.
///
/// The edited voxel drops to its new source level, its old cast is retracted and
/// its neighbours refill it. When the opacity changed and the voxel above is the
/// column top or fully lit, the column below is recast.
pub fn relight_after_edit<F: LightField + ?Sized>(
    field: &mut F,
    reg: &BlockRegistry,
    p: VoxelPos,
    old_id: BlockId,
) {
    let (Some(new_id), Some(old_light)) = (field.block(p), field.light(p)) else {
        return;
    };
    let mut work = LightWork::new();
    let level = if is_sky(field, reg, p) {
        MAX_LIGHT
    } else {
        source_level(reg, new_id)
    };
    field.set_light(p, level);
    work.darken.push_back((p, cast_light(reg, old_id, old_light)));
    work.spread_from(p);
    for face in Face::ALL {
        work.spread_from(p.offset(face.delta()));
    }

    let above = VoxelPos::new(p.x, p.y + 1, p.z);
    let exposed = above.y >= field.height() || field.light(above) == Some(MAX_LIGHT);
    if reg.opacity(old_id) != reg.opacity(new_id) && exposed {
        cast_natural_light(field, reg, &mut work, p.x, p.z, p.y + 1);
    }
    run(field, reg, &mut work);
}
