use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

use strata_blocks::{AIR, BlockId, BlockRegistry};

use crate::voxel::World;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct WorldGenConfig {
    #[serde(default)]
    pub world: World,
    #[serde(default)]
    pub terrain: Terrain,
    #[serde(default)]
    pub flora: FloraBlocks,
    #[serde(default)]
    pub biomes: Vec<BiomeDef>,
}

impl WorldGenConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: Self = toml::from_str(s)?;
        cfg.world.validate()?;
        Ok(cfg)
    }
}

pub fn load_config_from_path(path: &Path) -> Result<WorldGenConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    WorldGenConfig::from_toml_str(&s)
}

#[derive(Clone, Debug, Deserialize)]
pub struct Terrain {
    #[serde(default = "default_solid_ground")]
    pub solid_ground_height: i32,
    #[serde(default = "default_sea_level")]
    pub sea_level: i32,
    #[serde(default = "default_bedrock")]
    pub bedrock: String,
    #[serde(default = "default_stone")]
    pub stone: String,
    #[serde(default = "default_water")]
    pub water: String,
}
fn default_solid_ground() -> i32 {
    42
}
fn default_sea_level() -> i32 {
    51
}
fn default_bedrock() -> String {
    "bedrock".into()
}
fn default_stone() -> String {
    "stone".into()
}
fn default_water() -> String {
    "water".into()
}
impl Default for Terrain {
    fn default() -> Self {
        Self {
            solid_ground_height: default_solid_ground(),
            sea_level: default_sea_level(),
            bedrock: default_bedrock(),
            stone: default_stone(),
            water: default_water(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct FloraBlocks {
    #[serde(default = "default_log")]
    pub log: String,
    #[serde(default = "default_leaves")]
    pub leaves: String,
    #[serde(default = "default_cactus")]
    pub cactus: String,
}
fn default_log() -> String {
    "log".into()
}
fn default_leaves() -> String {
    "leaves".into()
}
fn default_cactus() -> String {
    "cactus".into()
}
impl Default for FloraBlocks {
    fn default() -> Self {
        Self {
            log: default_log(),
            leaves: default_leaves(),
            cactus: default_cactus(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct BiomeDef {
    pub name: String,
    #[serde(default)]
    pub offset: f32,
    #[serde(default = "default_one")]
    pub scale: f32,
    #[serde(default)]
    pub terrain_height: f32,
    #[serde(default = "default_one")]
    pub terrain_scale: f32,
    pub surface: String,
    pub subsurface: String,
    #[serde(default)]
    pub major_flora: usize,
    #[serde(default = "default_place_flora")]
    pub place_major_flora: bool,
    #[serde(default = "default_zone_scale")]
    pub flora_zone_scale: f32,
    #[serde(default = "default_zone_threshold")]
    pub flora_zone_threshold: f32,
    #[serde(default = "default_placement_scale")]
    pub flora_placement_scale: f32,
    #[serde(default = "default_placement_threshold")]
    pub flora_placement_threshold: f32,
    #[serde(default = "default_flora_min")]
    pub flora_min_height: i32,
    #[serde(default = "default_flora_max")]
    pub flora_max_height: i32,
    #[serde(default)]
    pub lodes: Vec<LodeDef>,
}
fn default_one() -> f32 {
    1.0
}
fn default_place_flora() -> bool {
    true
}
fn default_zone_scale() -> f32 {
    1.3
}
fn default_zone_threshold() -> f32 {
    0.6
}
fn default_placement_scale() -> f32 {
    15.0
}
fn default_placement_threshold() -> f32 {
    0.8
}
fn default_flora_min() -> i32 {
    5
}
fn default_flora_max() -> i32 {
    12
}

#[derive(Clone, Debug, Deserialize)]
pub struct LodeDef {
    pub name: String,
    pub block: String,
    pub min_height: i32,
    pub max_height: i32,
    #[serde(default = "default_one")]
    pub scale: f32,
    #[serde(default = "default_lode_threshold")]
    pub threshold: f32,
    #[serde(default)]
    pub noise_offset: f32,
}
fn default_lode_threshold() -> f32 {
    0.5
}

/// Ore rule with its block resolved. The height band is inclusive on both ends.
#[derive(Clone, Debug)]
pub struct Lode {
    pub name: String,
    pub block: BlockId,
    pub min_height: i32,
    pub max_height: i32,
    pub scale: f32,
    pub threshold: f32,
    pub noise_offset: f32,
}

#[derive(Clone, Debug)]
pub struct FloraRule {
    pub index: usize,
    pub zone_scale: f32,
    pub zone_threshold: f32,
    pub placement_scale: f32,
    pub placement_threshold: f32,
    pub min_height: i32,
    pub max_height: i32,
}

#[derive(Clone, Debug)]
pub struct Biome {
    pub name: String,
    pub offset: f32,
    pub scale: f32,
    pub terrain_height: f32,
    pub terrain_scale: f32,
    pub surface: BlockId,
    pub subsurface: BlockId,
    pub flora: Option<FloraRule>,
    /// Later entries win when several match.
    pub lodes: Vec<Lode>,
}

/// Runtime worldgen parameters with every block name resolved to an id.
#[derive(Clone, Debug)]
pub struct WorldGenParams {
    pub solid_ground_height: i32,
    pub sea_level: i32,
    pub bedrock: BlockId,
    pub stone: BlockId,
    pub water: BlockId,
    pub log: BlockId,
    pub leaves: BlockId,
    pub cactus: BlockId,
    pub biomes: Vec<Biome>,
}

fn resolve(reg: &BlockRegistry, name: &str) -> BlockId {
    match reg.id_by_name(name) {
        Some(id) => id,
        None if name == "air" => AIR,
        None => {
            log::warn!("worldgen: unknown block '{}', using air", name);
            AIR
        }
    }
}

impl WorldGenParams {
    pub fn from_config(cfg: &WorldGenConfig, reg: &BlockRegistry) -> Self {
        let biomes = cfg
            .biomes
            .iter()
            .map(|b| Biome {
                name: b.name.clone(),
                offset: b.offset,
                scale: b.scale,
                terrain_height: b.terrain_height,
                terrain_scale: b.terrain_scale,
                surface: resolve(reg, &b.surface),
                subsurface: resolve(reg, &b.subsurface),
                flora: b.place_major_flora.then(|| FloraRule {
                    index: b.major_flora,
                    zone_scale: b.flora_zone_scale,
                    zone_threshold: b.flora_zone_threshold,
                    placement_scale: b.flora_placement_scale,
                    placement_threshold: b.flora_placement_threshold,
                    min_height: b.flora_min_height,
                    max_height: b.flora_max_height,
                }),
                lodes: b
                    .lodes
                    .iter()
                    .map(|l| Lode {
                        name: l.name.clone(),
                        block: resolve(reg, &l.block),
                        min_height: l.min_height,
                        max_height: l.max_height,
                        scale: l.scale,
                        threshold: l.threshold,
                        noise_offset: l.noise_offset,
                    })
                    .collect(),
            })
            .collect();
        WorldGenParams {
            solid_ground_height: cfg.terrain.solid_ground_height,
            sea_level: cfg.terrain.sea_level,
            bedrock: resolve(reg, &cfg.terrain.bedrock),
            stone: resolve(reg, &cfg.terrain.stone),
            water: resolve(reg, &cfg.terrain.water),
            log: resolve(reg, &cfg.flora.log),
            leaves: resolve(reg, &cfg.flora.leaves),
            cactus: resolve(reg, &cfg.flora.cactus),
            biomes,
        }
    }
}
