use std::path::PathBuf;

use strata_blocks::{BlockRegistry, Orientation};
use strata_chunk::{BorderSide, ChunkData, NeighborBorders, VoxelState};
use strata_mesh_cpu::{ChunkMesh, NORMALIZED_TILE_SIZE, RenderPass, build_chunk_mesh, tile_uv};
use strata_world::ChunkCoord;

const W: usize = 4;
const H: usize = 6;

fn registry() -> BlockRegistry {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    BlockRegistry::load_from_path(root.join("../../assets/blocks.toml")).unwrap()
}

fn id(reg: &BlockRegistry, name: &str) -> u16 {
    reg.id_by_name(name).unwrap()
}

fn air_borders() -> NeighborBorders {
    // Square chunks: every side plane is H * W.
    NeighborBorders::capture(W, H, W, |_side: BorderSide| Some(vec![VoxelState::AIR; H * W]))
}

fn normals(mesh: &ChunkMesh) -> Vec<[f32; 3]> {
    mesh.normals
        .chunks(3)
        .step_by(4)
        .map(|n| [n[0], n[1], n[2]])
        .collect()
}

#[test]
fn lone_block_in_air_emits_six_faces() {
    let reg = registry();
    let mut c = ChunkData::new(ChunkCoord::new(0, 0), W, H);
    c.set_raw(1, 2, 1, id(&reg, "stone"), Orientation::North);
    let mesh = build_chunk_mesh(&c, &air_borders(), &reg);
    assert_eq!(mesh.vertex_count(), 24);
    assert_eq!(mesh.triangle_count(RenderPass::Opaque), 12);
    assert!(mesh.transparent.is_empty() && mesh.liquid.is_empty());
    assert_eq!(mesh.colors.len(), 24 * 4);
    assert_eq!(mesh.uvs.len(), 24 * 2);
    assert!(mesh.opaque.iter().all(|&i| (i as usize) < mesh.vertex_count()));
}

#[test]
fn solid_cube_shows_only_its_shell() {
    let reg = registry();
    let stone = id(&reg, "stone");
    let mut c = ChunkData::new(ChunkCoord::new(0, 0), W, H);
    for y in 0..3 {
        for z in 0..3 {
            for x in 0..3 {
                c.set_raw(x, y, z, stone, Orientation::North);
            }
        }
    }
    let full = build_chunk_mesh(&c, &air_borders(), &reg);
    // 3x3x3 cube: the bottom layer sits on the world floor, so 5 sides of 9 faces.
    assert_eq!(full.triangle_count(RenderPass::Opaque), 5 * 9 * 2);
    assert_eq!(full.vertex_count(), 5 * 9 * 4);
}

#[test]
fn unloaded_neighbours_defer_the_seam_face() {
    let reg = registry();
    let mut c = ChunkData::new(ChunkCoord::new(0, 0), W, H);
    c.set_raw(0, 2, 1, id(&reg, "stone"), Orientation::North);
    let none = NeighborBorders::empty(W, H, W);
    let mesh = build_chunk_mesh(&c, &none, &reg);
    assert_eq!(mesh.triangle_count(RenderPass::Opaque), 10);
    assert!(!normals(&mesh).contains(&[-1.0, 0.0, 0.0]));

    let mesh = build_chunk_mesh(&c, &air_borders(), &reg);
    assert_eq!(mesh.triangle_count(RenderPass::Opaque), 12);
}

#[test]
fn stacked_water_hides_the_lower_top_face() {
    let reg = registry();
    let water = id(&reg, "water");
    let mut c = ChunkData::new(ChunkCoord::new(0, 0), W, H);
    c.set_raw(1, 1, 1, water, Orientation::North);
    c.set_raw(1, 2, 1, water, Orientation::North);
    let mesh = build_chunk_mesh(&c, &air_borders(), &reg);
    assert!(mesh.opaque.is_empty() && mesh.transparent.is_empty());
    assert_eq!(mesh.triangle_count(RenderPass::Liquid), 11 * 2);
    let ups = normals(&mesh).iter().filter(|n| **n == [0.0, 1.0, 0.0]).count();
    assert_eq!(ups, 1);
    // Liquids keep the template uv instead of an atlas tile.
    assert!(mesh.uvs.iter().all(|&u| u == 0.0 || u == 1.0));
}

#[test]
fn glass_goes_to_the_transparent_list() {
    let reg = registry();
    let mut c = ChunkData::new(ChunkCoord::new(0, 0), W, H);
    c.set_raw(1, 1, 1, id(&reg, "glass"), Orientation::North);
    c.set_raw(2, 1, 1, id(&reg, "stone"), Orientation::North);
    let mesh = build_chunk_mesh(&c, &air_borders(), &reg);
    // Glass drops the face against the stone; the stone still draws the face behind the glass.
    assert_eq!(mesh.triangle_count(RenderPass::Transparent), 5 * 2);
    assert_eq!(mesh.triangle_count(RenderPass::Opaque), 6 * 2);
}

#[test]
fn vertex_alpha_is_the_light_in_front_of_the_face() {
    let reg = registry();
    let mut c = ChunkData::new(ChunkCoord::new(0, 0), W, H);
    let stone = id(&reg, "stone");
    for z in 0..W {
        for x in 0..W {
            c.set_raw(x, 0, z, stone, Orientation::North);
        }
    }
    c.set_light(2, 1, 2, 12);
    let mesh = build_chunk_mesh(&c, &air_borders(), &reg);
    let tops: Vec<_> = (0..mesh.vertex_count())
        .filter(|&i| mesh.normals[i * 3 + 1] == 1.0)
        .collect();
    assert_eq!(tops.len(), W * W * 4);
    let lit: Vec<_> = tops
        .iter()
        .filter(|&&i| mesh.colors[i * 4 + 3] == 0.75)
        .map(|&i| (mesh.positions[i * 3], mesh.positions[i * 3 + 2]))
        .collect();
    assert_eq!(lit.len(), 4);
    assert!(lit.iter().all(|&(x, z)| (2.0..=3.0).contains(&x) && (2.0..=3.0).contains(&z)));
}

#[test]
fn orientation_turns_the_front_face() {
    let reg = registry();
    let stone = id(&reg, "stone");
    let furnace = id(&reg, "furnace");
    let mut c = ChunkData::new(ChunkCoord::new(0, 0), W, H);
    for y in 0..3 {
        for z in 0..3 {
            for x in 0..3 {
                c.set_raw(x, y, z, stone, Orientation::North);
            }
        }
    }
    // Open only the -X side of the centre voxel.
    c.set_raw(1, 1, 1, furnace, Orientation::East);
    c.set_raw(0, 1, 1, 0, Orientation::North);
    let mesh = build_chunk_mesh(&c, &NeighborBorders::empty(W, H, W), &reg);

    let furnace_faces: Vec<usize> = (0..mesh.vertex_count() / 4)
        .filter(|&f| {
            let p = &mesh.positions[f * 12..f * 12 + 12];
            p.chunks(3).all(|v| (1.0..=2.0).contains(&v[0]) && (1.0..=2.0).contains(&v[1]))
                && p.chunks(3).all(|v| (1.0..=2.0).contains(&v[2]))
        })
        .filter(|&f| mesh.normals[f * 12] == -1.0)
        .collect();
    assert_eq!(furnace_faces.len(), 1);
    let f = furnace_faces[0];
    // East turns the front three quarters: +Z ends up facing -X.
    let [u0, v0] = tile_uv(22, [0.0, 0.0]);
    let uv = &mesh.uvs[f * 8..f * 8 + 8];
    assert!(uv.chunks(2).any(|t| (t[0] - u0).abs() < 1e-6 && (t[1] - v0).abs() < 1e-6));
    assert!(uv.chunks(2).all(|t| t[0] >= u0 - 1e-6 && t[0] <= u0 + NORMALIZED_TILE_SIZE + 1e-6));
    // Every vertex of that face lies on the x = 1 plane.
    assert!(mesh.positions[f * 12..f * 12 + 12].chunks(3).all(|v| (v[0] - 1.0).abs() < 1e-6));
}

#[test]
fn slab_uses_its_own_template() {
    let reg = registry();
    let mut c = ChunkData::new(ChunkCoord::new(0, 0), W, H);
    c.set_raw(1, 1, 1, id(&reg, "slab"), Orientation::North);
    let mesh = build_chunk_mesh(&c, &air_borders(), &reg);
    assert_eq!(mesh.triangle_count(RenderPass::Transparent), 12);
    let max_y = mesh.positions.chunks(3).map(|p| p[1]).fold(f32::MIN, f32::max);
    assert_eq!(max_y, 1.5);
}

#[test]
fn air_chunk_is_empty() {
    let reg = registry();
    let c = ChunkData::new(ChunkCoord::new(3, 4), W, H);
    let mesh = build_chunk_mesh(&c, &air_borders(), &reg);
    assert!(mesh.is_empty());
    assert_eq!(mesh.coord, ChunkCoord::new(3, 4));
}

#[test]
fn lone_block_with_every_neighbour_unloaded_emits_nothing() {
    let reg = registry();
    let mut c = ChunkData::new(ChunkCoord::new(0, 0), 1, 1);
    c.set_raw(0, 0, 0, id(&reg, "stone"), Orientation::North);
    let mesh = build_chunk_mesh(&c, &NeighborBorders::empty(1, 1, 1), &reg);
    assert!(mesh.is_empty());
    assert_eq!(mesh.vertex_count(), 0);
    for pass in [RenderPass::Opaque, RenderPass::Transparent, RenderPass::Liquid] {
        assert_eq!(mesh.triangle_count(pass), 0);
    }
}
