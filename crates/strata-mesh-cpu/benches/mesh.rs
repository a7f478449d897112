use std::path::PathBuf;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use strata_blocks::BlockRegistry;
use strata_chunk::{NeighborBorders, generate_chunk};
use strata_lighting::{ChunkMapField, light_new_chunk};
use strata_mesh_cpu::build_chunk_mesh;
use strata_world::worldgen::load_config_from_path;
use strata_world::{ChunkCoord, TerrainGenerator, World, WorldGenParams};

fn assets() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets")
}

fn bench_build_chunk_mesh(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_chunk_mesh");
    let reg = BlockRegistry::load_from_path(assets().join("blocks.toml")).unwrap();
    let cfg = load_config_from_path(&assets().join("worldgen.toml")).unwrap();
    let world = World {
        seed: 1337,
        ..cfg.world
    };
    let generator = TerrainGenerator::new(world, WorldGenParams::from_config(&cfg, &reg));
    let coord = world.center_chunk();
    let mut chunks = std::collections::HashMap::new();
    chunks.insert(coord, generate_chunk(&generator, coord).data);
    {
        let mut field = ChunkMapField::new(world, &mut chunks);
        light_new_chunk(
            &mut field,
            &reg,
            world.chunk_origin(coord),
            world.chunk_width,
            world.chunk_width,
        );
    }
    let chunk = &chunks[&coord];
    let borders = NeighborBorders::empty(chunk.sx, chunk.sy, chunk.sz);

    group.bench_function("terrain_16x128x16", |b| {
        b.iter(|| black_box(build_chunk_mesh(chunk, &borders, &reg)))
    });
    group.bench_function("generate_light_mesh_16x128x16", |b| {
        b.iter(|| {
            let mut one = std::collections::HashMap::new();
            one.insert(coord, generate_chunk(&generator, coord).data);
            let mut field = ChunkMapField::new(world, &mut one);
            light_new_chunk(&mut field, &reg, world.chunk_origin(coord), 16, 16);
            black_box(build_chunk_mesh(&one[&ChunkCoord::new(coord.cx, coord.cz)], &borders, &reg))
        })
    });
    group.finish();
}

criterion_group!(benches, bench_build_chunk_mesh);
criterion_main!(benches);
