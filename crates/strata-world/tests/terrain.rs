use std::path::PathBuf;

use strata_blocks::{AIR, BlockRegistry};
use strata_world::noise::ConstantNoise;
use strata_world::worldgen::{BiomeDef, LodeDef, load_config_from_path};
use strata_world::{TerrainGenerator, VoxelPos, World, WorldGenConfig, WorldGenParams};

fn assets() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets")
}

fn registry() -> BlockRegistry {
    BlockRegistry::load_from_path(assets().join("blocks.toml")).expect("registry")
}

fn biome(name: &str, surface: &str, subsurface: &str) -> BiomeDef {
    toml::from_str(&format!(
        "name = \"{name}\"\nsurface = \"{surface}\"\nsubsurface = \"{subsurface}\""
    ))
    .expect("biome")
}

fn lode(block: &str, min_height: i32, max_height: i32, threshold: f32) -> LodeDef {
    LodeDef {
        name: block.into(),
        block: block.into(),
        min_height,
        max_height,
        scale: 1.0,
        threshold,
        noise_offset: 0.0,
    }
}

fn flat_generator(reg: &BlockRegistry, noise: f32, mut b: BiomeDef) -> TerrainGenerator {
    let mut cfg = WorldGenConfig::default();
    cfg.terrain.solid_ground_height = 10;
    cfg.terrain.sea_level = 5;
    b.terrain_height = 0.0;
    b.place_major_flora = false;
    cfg.biomes.push(b);
    let world = World::with_layout(16, 32, 4, 42);
    let params = WorldGenParams::from_config(&cfg, reg);
    TerrainGenerator::with_noise(world, params, Box::new(ConstantNoise(noise)))
}

#[test]
fn flat_surface_layers() {
    let reg = registry();
    let generator = flat_generator(&reg, 0.5, biome("plains", "grass", "dirt"));
    let stone = reg.id_by_name("stone").unwrap();
    let dirt = reg.id_by_name("dirt").unwrap();
    let grass = reg.id_by_name("grass").unwrap();
    let bedrock = reg.id_by_name("bedrock").unwrap();
    for x in 0..16 {
        for z in 0..16 {
            let at = |y| generator.generate(VoxelPos::new(x, y, z));
            assert_eq!(at(0), bedrock);
            for y in 1..7 {
                assert_eq!(at(y), stone, "y={y}");
            }
            for y in 7..10 {
                assert_eq!(at(y), dirt, "y={y}");
            }
            assert_eq!(at(10), grass);
            for y in 11..32 {
                assert_eq!(at(y), AIR, "y={y}");
            }
        }
    }
}

#[test]
fn water_fills_below_sea_level() {
    let reg = registry();
    let mut cfg = WorldGenConfig::default();
    cfg.terrain.solid_ground_height = 10;
    cfg.terrain.sea_level = 20;
    cfg.biomes.push(BiomeDef {
        terrain_height: 0.0,
        place_major_flora: false,
        ..biome("plains", "sand", "sand")
    });
    let world = World::with_layout(16, 32, 4, 1);
    let generator = TerrainGenerator::with_noise(
        world,
        WorldGenParams::from_config(&cfg, &reg),
        Box::new(ConstantNoise(0.5)),
    );
    let water = reg.id_by_name("water").unwrap();
    assert_eq!(generator.generate(VoxelPos::new(3, 11, 3)), water);
    assert_eq!(generator.generate(VoxelPos::new(3, 19, 3)), water);
    assert_eq!(generator.generate(VoxelPos::new(3, 20, 3)), AIR);
}

#[test]
fn outside_world_is_air() {
    let reg = registry();
    let generator = flat_generator(&reg, 0.5, biome("plains", "grass", "dirt"));
    assert_eq!(generator.generate(VoxelPos::new(-1, 3, 0)), AIR);
    assert_eq!(generator.generate(VoxelPos::new(0, 3, 64)), AIR);
    assert_eq!(generator.generate(VoxelPos::new(0, -1, 0)), AIR);
    assert_eq!(generator.generate(VoxelPos::new(0, 32, 0)), AIR);
}

#[test]
fn later_lodes_win_and_band_is_inclusive() {
    let reg = registry();
    let mut b = biome("plains", "grass", "dirt");
    b.lodes = vec![
        lode("sand", 1, 6, 0.5),
        lode("cobblestone", 2, 4, 0.5),
        lode("bricks", 1, 6, 0.9),
    ];
    let generator = flat_generator(&reg, 0.7, b);
    let sand = reg.id_by_name("sand").unwrap();
    let cobble = reg.id_by_name("cobblestone").unwrap();
    let at = |y| generator.generate(VoxelPos::new(5, y, 5));
    assert_eq!(at(1), sand);
    assert_eq!(at(2), cobble);
    assert_eq!(at(4), cobble);
    assert_eq!(at(5), sand);
    assert_eq!(at(6), sand);
    // Lodes never touch the subsurface band.
    assert_eq!(at(7), reg.id_by_name("dirt").unwrap());
}

#[test]
fn flora_is_queued_only_at_the_surface() {
    let reg = registry();
    let mut cfg = WorldGenConfig::default();
    cfg.terrain.solid_ground_height = 10;
    cfg.terrain.sea_level = 5;
    let mut b = biome("forest", "grass", "dirt");
    b.terrain_height = 0.0;
    b.flora_zone_threshold = 0.5;
    b.flora_placement_threshold = 0.5;
    b.flora_min_height = 4;
    b.flora_max_height = 4;
    cfg.biomes.push(b);
    let generator = TerrainGenerator::with_noise(
        World::with_layout(16, 32, 4, 7),
        WorldGenParams::from_config(&cfg, &reg),
        Box::new(ConstantNoise(0.9)),
    );
    let mut mods = Vec::new();
    generator.generate_with_flora(VoxelPos::new(8, 9, 8), &mut mods);
    assert!(mods.is_empty());
    generator.generate_with_flora(VoxelPos::new(8, 10, 8), &mut mods);
    let log = reg.id_by_name("log").unwrap();
    let logs: Vec<_> = mods.iter().filter(|m| m.id == log).collect();
    assert_eq!(logs.len(), 3);
    assert!(mods.iter().all(|m| m.pos.y > 10));
}

#[test]
fn generation_is_deterministic_per_seed() {
    let reg = registry();
    let cfg = load_config_from_path(&assets().join("worldgen.toml")).expect("worldgen config");
    let params = WorldGenParams::from_config(&cfg, &reg);
    let world = World { seed: 42, ..cfg.world };
    let a = TerrainGenerator::new(world, params.clone());
    let b = TerrainGenerator::new(world, params);
    for i in 0..400 {
        let p = VoxelPos::new(800 + (i * 7) % 64, (i * 13) % 128, 800 + (i * 11) % 64);
        assert_eq!(a.generate(p), b.generate(p), "{p:?}");
    }
}

#[test]
fn assets_config_resolves_every_name() {
    let reg = registry();
    let cfg = load_config_from_path(&assets().join("worldgen.toml")).expect("worldgen config");
    assert_eq!(cfg.world.chunk_width, 16);
    assert_eq!(cfg.world.chunk_height, 128);
    let params = WorldGenParams::from_config(&cfg, &reg);
    assert_eq!(params.biomes.len(), 3);
    assert_eq!(params.water, 14);
    assert_eq!(params.log, 6);
    assert_eq!(params.leaves, 11);
    assert_eq!(params.cactus, 12);
    let desert = &params.biomes[1];
    assert_eq!(desert.surface, reg.id_by_name("sand").unwrap());
    assert_eq!(desert.flora.as_ref().map(|f| f.index), Some(1));
}

#[test]
fn degenerate_world_layouts_are_rejected() {
    assert!(WorldGenConfig::from_toml_str("[world]\nchunk_width = 0\n").is_err());
    assert!(WorldGenConfig::from_toml_str("[world]\nchunk_height = 0\n").is_err());
    assert!(WorldGenConfig::from_toml_str("[world]\nworld_size_chunks = 0\n").is_err());
    assert!(
        WorldGenConfig::from_toml_str("[world]\nchunk_width = 65536\nworld_size_chunks = 65536\n").is_err()
    );
    let cfg = WorldGenConfig::from_toml_str("[world]\nchunk_width = 8\n").unwrap();
    assert_eq!(cfg.world.chunk_width, 8);
    assert!(World::with_layout(16, 128, 100, 0).validate().is_ok());
}
