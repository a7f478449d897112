use proptest::prelude::*;
use std::path::PathBuf;
use strata_blocks::{BlockRegistry, Orientation};
use strata_chunk::{BorderSide, ChunkData, NeighborBorders, VoxelState, generate_chunk};
use strata_world::noise::ConstantNoise;
use strata_world::{ChunkCoord, TerrainGenerator, VoxelPos, World, WorldGenConfig, WorldGenParams};

fn registry() -> BlockRegistry {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    BlockRegistry::load_from_path(root.join("../../assets/blocks.toml")).unwrap()
}

fn width() -> impl Strategy<Value = usize> {
    1usize..=6
}

fn height() -> impl Strategy<Value = usize> {
    1usize..=8
}

proptest! {
    // idx maps each (x,y,z) within bounds to unique in-range indices
    #[test]
    fn idx_is_unique_and_in_range(cx in -50i32..50, cz in -50i32..50, w in width(), h in height()) {
        let c = ChunkData::new(ChunkCoord::new(cx, cz), w, h);
        let expect = w * h * w;
        let mut seen = vec![false; expect];
        for y in 0..h { for z in 0..w { for x in 0..w {
            let i = c.idx(x, y, z);
            prop_assert!(i < expect);
            prop_assert!(!seen[i]);
            seen[i] = true;
        }}}
        prop_assert!(seen.into_iter().all(|b| b));
    }

    // get() rejects every out-of-range coordinate instead of wrapping
    #[test]
    fn get_is_bounds_checked(w in width(), h in height(), x in -3i32..10, y in -3i32..12, z in -3i32..10) {
        let c = ChunkData::new(ChunkCoord::new(0, 0), w, h);
        let inside = x >= 0 && z >= 0 && y >= 0 && (x as usize) < w && (z as usize) < w && (y as usize) < h;
        prop_assert_eq!(c.get(x, y, z).is_some(), inside);
    }

    // local_of and global_of invert each other for positions in the chunk's columns
    #[test]
    fn local_global_inverse(cx in 0i32..20, cz in 0i32..20, w in width(), h in height(), seed in any::<u32>()) {
        let c = ChunkData::new(ChunkCoord::new(cx, cz), w, h);
        let x = seed as usize % w;
        let z = (seed as usize / 7) % w;
        let y = (seed as usize / 131) % h;
        let g = c.global_of(x, y, z);
        prop_assert_eq!(c.local_of(g), Some((x, y, z)));
        prop_assert_eq!(c.local_of(VoxelPos::new(g.x + w as i32, g.y, g.z)), None);
    }

    // Stored ids and orientations rebuild an identical grid
    #[test]
    fn records_rebuild_identical_grid(ids in prop::collection::vec(0u16..17, 2 * 3 * 2), ors in prop::collection::vec(0u8..6, 2 * 3 * 2)) {
        let coord = ChunkCoord::new(4, 9);
        let a = ChunkData::from_records(coord, 2, 3, &ids, &ors).expect("valid");
        prop_assert_eq!(a.ids(), ids.clone());
        prop_assert_eq!(a.orientations(), ors.clone());
        let b = ChunkData::from_records(coord, 2, 3, &a.ids(), &a.orientations()).expect("valid");
        for y in 0..3 { for z in 0..2 { for x in 0..2 {
            prop_assert_eq!(a.get_local(x, y, z), b.get_local(x, y, z));
        }}}
    }
}

#[test]
fn from_records_rejects_bad_input() {
    let c = ChunkCoord::new(0, 0);
    assert!(ChunkData::from_records(c, 2, 2, &[0; 7], &[1; 8]).is_none());
    assert!(ChunkData::from_records(c, 2, 2, &[0; 8], &[1; 7]).is_none());
    let mut ors = [1u8; 8];
    ors[3] = 9;
    assert!(ChunkData::from_records(c, 2, 2, &[0; 8], &ors).is_none());
}

#[test]
fn modify_same_id_is_noop() {
    let reg = registry();
    let mut c = ChunkData::new(ChunkCoord::new(0, 0), 4, 8);
    assert!(c.modify(1, 1, 1, 0, Orientation::North, &reg).is_none());
    assert!(!c.is_dirty());

    let stone = reg.id_by_name("stone").unwrap();
    let m = c.modify(1, 1, 1, stone, Orientation::East, &reg).expect("changed");
    assert_eq!(m.old_id, 0);
    assert_eq!(m.old_opacity, 0);
    assert_eq!(m.new_opacity, 15);
    assert!(c.is_dirty());
    assert_eq!(c.get(1, 1, 1).unwrap().orientation, Orientation::East);

    c.clear_dirty();
    // Same id with a different orientation is still a no-op.
    assert!(c.modify(1, 1, 1, stone, Orientation::West, &reg).is_none());
    assert!(!c.is_dirty());
    assert_eq!(c.get(1, 1, 1).unwrap().orientation, Orientation::East);
    assert!(c.modify(9, 1, 1, stone, Orientation::North, &reg).is_none());
}

#[test]
fn active_set_is_ordered_and_toggles() {
    let mut c = ChunkData::new(ChunkCoord::new(0, 0), 4, 4);
    c.set_active(3, 2, 1, true);
    c.set_active(0, 0, 0, true);
    c.set_active(0, 0, 0, true);
    assert_eq!(c.active_count(), 2);
    assert_eq!(c.active_voxels(), vec![(0, 0, 0), (3, 2, 1)]);
    c.set_active(0, 0, 0, false);
    assert!(!c.is_active(0, 0, 0));
    assert!(c.is_active(3, 2, 1));
}

#[test]
fn neighbor_borders_route_to_planes() {
    let mut west = ChunkData::new(ChunkCoord::new(0, 0), 4, 3);
    west.set_raw(3, 2, 1, 5, Orientation::North);
    let mut north = ChunkData::new(ChunkCoord::new(1, 1), 4, 3);
    north.set_raw(2, 1, 0, 7, Orientation::South);

    let b = NeighborBorders::capture(4, 3, 4, |side| match side {
        BorderSide::NegX => Some(west.border_plane(side.opposite())),
        BorderSide::PosZ => Some(north.border_plane(side.opposite())),
        _ => None,
    });
    assert!(b.is_loaded(BorderSide::NegX));
    assert!(!b.is_loaded(BorderSide::PosX));
    assert_eq!(b.get(-1, 2, 1).map(|v| v.id), Some(5));
    assert_eq!(b.get(-1, 0, 0), Some(VoxelState::AIR));
    assert_eq!(b.get(2, 1, 4).map(|v| (v.id, v.orientation)), Some((7, Orientation::South)));
    assert_eq!(b.get(4, 1, 1), None);
    assert_eq!(b.get(-1, 3, 1), None);
    assert_eq!(b.get(-1, 1, -1), None);
    assert_eq!(b.get(1, 1, 1), None);
}

#[test]
fn generate_chunk_matches_point_generator() {
    let reg = registry();
    let mut cfg = WorldGenConfig::default();
    cfg.terrain.solid_ground_height = 10;
    cfg.terrain.sea_level = 5;
    cfg.biomes.push(
        toml::from_str(
            "name = \"p\"\nsurface = \"grass\"\nsubsurface = \"dirt\"\nplace_major_flora = false",
        )
        .unwrap(),
    );
    let world = World::with_layout(8, 16, 4, 42);
    let generator = TerrainGenerator::with_noise(
        world,
        WorldGenParams::from_config(&cfg, &reg),
        Box::new(ConstantNoise(0.5)),
    );
    let coord = ChunkCoord::new(1, 2);
    let out = generate_chunk(&generator, coord);
    assert!(out.mods.is_empty());
    assert!(!out.data.is_dirty());
    for y in 0..16 { for z in 0..8 { for x in 0..8 {
        let g = out.data.global_of(x, y, z);
        assert_eq!(out.data.get_local(x, y, z).id, generator.generate(g), "{g:?}");
    }}}
    assert_eq!(out.data.get_local(0, 10, 0).id, reg.id_by_name("grass").unwrap());
}
