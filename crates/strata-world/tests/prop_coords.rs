use proptest::prelude::*;
use strata_world::{ChunkCoord, VoxelPos, World};

fn world() -> World {
    World::with_layout(16, 64, 8, 0)
}

proptest! {
    // split() and chunk_origin() recompose to the original position
    #[test]
    fn split_recomposes(x in 0i32..128, y in 0i32..64, z in 0i32..128) {
        let w = world();
        let p = VoxelPos::new(x, y, z);
        let (c, lx, ly, lz) = w.split(p).expect("inside");
        prop_assert!(lx < 16 && lz < 16 && ly < 64);
        prop_assert!(w.chunk_in_world(c));
        let o = w.chunk_origin(c);
        prop_assert_eq!(VoxelPos::new(o.x + lx as i32, ly as i32, o.z + lz as i32), p);
    }

    // Positions outside the world never split
    #[test]
    fn outside_never_splits(x in -300i32..300, y in -10i32..100, z in -300i32..300) {
        let w = world();
        let p = VoxelPos::new(x, y, z);
        let inside = (0..128).contains(&x) && (0..64).contains(&y) && (0..128).contains(&z);
        prop_assert_eq!(w.split(p).is_some(), inside);
    }

    // chunk_of agrees with floor division for negative coordinates too
    #[test]
    fn chunk_of_floors(x in -1000i32..1000, z in -1000i32..1000) {
        let c = world().chunk_of(VoxelPos::new(x, 0, z));
        prop_assert_eq!(c, ChunkCoord::new((x as f64 / 16.0).floor() as i32, (z as f64 / 16.0).floor() as i32));
    }
}

#[test]
fn center_and_spawn() {
    let w = World::new(1);
    assert_eq!(w.center_chunk(), ChunkCoord::new(50, 50));
    let s = w.spawn_position();
    assert_eq!(w.chunk_of(VoxelPos::from_vec3(s)), w.center_chunk());
}
