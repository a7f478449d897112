use strata_blocks::{AIR, BlockId};

use crate::noise::{NoiseSource, PerlinNoise, perlin_2d, perlin_3d};
use crate::structures::{VoxelMod, make_flora};
use crate::voxel::{VoxelPos, World};
use crate::worldgen::WorldGenParams;

/// Per-(x,z) result of the biome pass, shared by every voxel in the column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnProfile {
    pub terrain_height: i32,
    pub biome: usize,
}

/// Deterministic position-to-block function for one seeded world.
pub struct TerrainGenerator {
    world: World,
    params: WorldGenParams,
    noise: Box<dyn NoiseSource>,
}

impl TerrainGenerator {
    pub fn new(world: World, params: WorldGenParams) -> Self {
        let noise = Box::new(PerlinNoise::new(world.seed));
        Self::with_noise(world, params, noise)
    }

    pub fn with_noise(world: World, params: WorldGenParams, noise: Box<dyn NoiseSource>) -> Self {
        Self {
            world,
            params,
            noise,
        }
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[inline]
    pub fn params(&self) -> &WorldGenParams {
        &self.params
    }

    /// Biome weighting at `(x, z)`: picks the strongest biome and averages the positive
    /// weighted heights on top of the solid ground level.
    pub fn column(&self, x: i32, z: i32) -> ColumnProfile {
        let noise = self.noise.as_ref();
        let cw = self.world.chunk_width;
        let (fx, fz) = (x as f32, z as f32);
        let mut sum = 0.0f32;
        let mut count = 0u32;
        let mut strongest_weight = 0.0f32;
        let mut strongest = 0usize;
        for (i, b) in self.params.biomes.iter().enumerate() {
            let weight = perlin_2d(noise, fx, fz, b.offset, b.scale, cw);
            if weight > strongest_weight {
                strongest_weight = weight;
                strongest = i;
            }
            let h = b.terrain_height * perlin_2d(noise, fx, fz, 0.0, b.terrain_scale, cw) * weight;
            if h > 0.0 {
                sum += h;
                count += 1;
            }
        }
        let avg = if count > 0 { sum / count as f32 } else { 0.0 };
        ColumnProfile {
            terrain_height: (avg + self.params.solid_ground_height as f32).floor() as i32,
            biome: strongest,
        }
    }

    /// Block id at `pos`, ignoring flora.
    pub fn generate(&self, pos: VoxelPos) -> BlockId {
        if !self.world.voxel_in_world(pos) {
            return AIR;
        }
        let col = self.column(pos.x, pos.z);
        self.block_in_column(&col, pos, None)
    }

    /// Block id at `pos`; flora rooted here is appended to `mods`.
    pub fn generate_with_flora(&self, pos: VoxelPos, mods: &mut Vec<VoxelMod>) -> BlockId {
        if !self.world.voxel_in_world(pos) {
            return AIR;
        }
        let col = self.column(pos.x, pos.z);
        self.block_in_column(&col, pos, Some(mods))
    }

    /// Classifies one voxel of a column computed by [`column`](Self::column).
    pub fn block_in_column(
        &self,
        col: &ColumnProfile,
        pos: VoxelPos,
        mods: Option<&mut Vec<VoxelMod>>,
    ) -> BlockId {
        let p = &self.params;
        if !self.world.voxel_in_world(pos) {
            return AIR;
        }
        if pos.y == 0 {
            return p.bedrock;
        }
        let th = col.terrain_height;
        let y = pos.y;
        let Some(biome) = p.biomes.get(col.biome) else {
            // No biomes configured: bare stone up to the ground level.
            return if y <= th {
                p.stone
            } else if y < p.sea_level {
                p.water
            } else {
                AIR
            };
        };

        let mut id = if y == th {
            biome.surface
        } else if y < th && y > th - 4 {
            biome.subsurface
        } else if y > th {
            return if y < p.sea_level { p.water } else { AIR };
        } else {
            p.stone
        };

        if y <= th - 4 {
            let noise = self.noise.as_ref();
            for lode in &biome.lodes {
                if y >= lode.min_height
                    && y <= lode.max_height
                    && perlin_3d(
                        noise,
                        pos.x as f32,
                        y as f32,
                        pos.z as f32,
                        lode.noise_offset,
                        lode.scale,
                    ) > lode.threshold
                {
                    id = lode.block;
                }
            }
        }

        if y == th {
            if let (Some(rule), Some(mods)) = (&biome.flora, mods) {
                let noise = self.noise.as_ref();
                let cw = self.world.chunk_width;
                let (fx, fz) = (pos.x as f32, pos.z as f32);
                if perlin_2d(noise, fx, fz, 0.0, rule.zone_scale, cw) > rule.zone_threshold
                    && perlin_2d(noise, fx, fz, 0.0, rule.placement_scale, cw)
                        > rule.placement_threshold
                {
                    make_flora(
                        rule.index,
                        pos,
                        rule.min_height,
                        rule.max_height,
                        noise,
                        p,
                        cw,
                        mods,
                    );
                }
            }
        }

        id
    }
}
