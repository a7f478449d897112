//! Block behaviours shipped with the binary.

use std::sync::Arc;

use strata_blocks::{AIR, BlockId, BlockRegistry, Face};
use strata_runtime::{BehaviourSet, BlockBehaviour, VoxelView};
use strata_world::{VoxelMod, VoxelPos};

const SIDES: [Face; 4] = [Face::NegZ, Face::PosZ, Face::NegX, Face::PosX];

/// Grass creeps onto horizontally adjacent dirt, one voxel per tick.
/// Covered grass turns back into dirt.
pub struct GrassSpread {
    grass: BlockId,
    dirt: BlockId,
}

impl GrassSpread {
    pub fn from_registry(reg: &BlockRegistry) -> Option<Self> {
        Some(Self {
            grass: reg.id_by_name("grass")?,
            dirt: reg.id_by_name("dirt")?,
        })
    }

    fn dirt_neighbours(&self, world: &dyn VoxelView, p: VoxelPos) -> Vec<VoxelPos> {
        SIDES
            .iter()
            .map(|f| p.offset(f.delta()))
            .filter(|q| world.voxel(*q).is_some_and(|v| v.id == self.dirt))
            .collect()
    }
}

impl BlockBehaviour for GrassSpread {
    fn is_active(&self, world: &dyn VoxelView, p: VoxelPos) -> bool {
        !self.dirt_neighbours(world, p).is_empty()
    }

    fn behave(&self, world: &dyn VoxelView, p: VoxelPos) -> Vec<VoxelMod> {
        let above = p.offset(Face::PosY.delta());
        if world.voxel(above).is_some_and(|v| v.id != AIR) {
            return vec![VoxelMod::new(p, self.dirt)];
        }
        let targets = self.dirt_neighbours(world, p);
        if targets.is_empty() {
            return Vec::new();
        }
        let pick = targets[fastrand::usize(..targets.len())];
        vec![VoxelMod::new(pick, self.grass)]
    }
}

/// Every behaviour whose blocks exist in `reg`.
pub fn default_behaviours(reg: &BlockRegistry) -> BehaviourSet {
    let mut set = BehaviourSet::new();
    match GrassSpread::from_registry(reg) {
        Some(g) => set.register(g.grass, Arc::new(g)),
        None => log::warn!("no grass/dirt blocks registered; grass spread disabled"),
    }
    set
}
