use proptest::prelude::*;
use std::collections::HashMap;
use strata_blocks::{BlockId, BlockRegistry, Orientation};
use strata_chunk::ChunkData;
use strata_lighting::{ChunkMapField, baseline, light_new_chunk, relight_after_edit};
use strata_world::{ChunkCoord, VoxelPos, World};

const W: usize = 3;
const H: usize = 6;

fn registry() -> BlockRegistry {
    BlockRegistry::from_toml_str(
        r#"
[[blocks]]
name = "air"
solid = false

[[blocks]]
name = "stone"

[[blocks]]
name = "leaves"
transparent = true
opacity = 3

[[blocks]]
name = "water"
solid = false
liquid = true
opacity = 1

[[blocks]]
name = "lamp"
emission = 13

[[blocks]]
name = "torch"
solid = false
emission = 9
"#,
    )
    .unwrap()
}

fn world() -> World {
    World::with_layout(W, H, 4, 0)
}

const COORDS: [ChunkCoord; 2] = [ChunkCoord::new(0, 0), ChunkCoord::new(1, 0)];

fn assert_matches_baseline(reg: &BlockRegistry, chunks: &HashMap<ChunkCoord, ChunkData>) -> Result<(), TestCaseError> {
    let mut expect = chunks.clone();
    let mut field = ChunkMapField::new(world(), &mut expect);
    baseline::recompute_all(&mut field, reg, (0, 0), ((2 * W) as i32, W as i32));
    for c in COORDS {
        for y in 0..H {
            for z in 0..W {
                for x in 0..W {
                    prop_assert_eq!(
                        chunks[&c].get_local(x, y, z).light,
                        expect[&c].get_local(x, y, z).light,
                        "{:?} ({},{},{})", c, x, y, z
                    );
                }
            }
        }
    }
    Ok(())
}

fn block() -> impl Strategy<Value = BlockId> {
    prop_oneof![4 => Just(0u16), 3 => Just(1u16), 1 => Just(2u16), 1 => Just(3u16), 1 => Just(4u16), 1 => Just(5u16)]
}

fn edit() -> impl Strategy<Value = (i32, i32, i32, BlockId)> {
    (0..(2 * W) as i32, 0..H as i32, 0..W as i32, block())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // Loading chunks one at a time and then editing keeps light equal to a full recompute
    #[test]
    fn incremental_matches_full_recompute(
        ids in prop::collection::vec(block(), 2 * W * H * W),
        edits in prop::collection::vec(edit(), 1..12),
    ) {
        let reg = registry();
        let w = world();
        let mut chunks = HashMap::new();
        for (i, c) in COORDS.into_iter().enumerate() {
            let n = W * H * W;
            let ors = vec![Orientation::North.to_u8(); n];
            let data = ChunkData::from_records(c, W, H, &ids[i * n..(i + 1) * n], &ors).unwrap();
            chunks.insert(c, data);
            let mut field = ChunkMapField::new(w, &mut chunks);
            light_new_chunk(&mut field, &reg, w.chunk_origin(c), W, W);
        }
        assert_matches_baseline(&reg, &chunks)?;

        for (x, y, z, id) in edits {
            let p = VoxelPos::new(x, y, z);
            let (c, lx, ly, lz) = w.split(p).unwrap();
            let changed = chunks
                .get_mut(&c)
                .unwrap()
                .modify(lx as i32, ly as i32, lz as i32, id, Orientation::North, &reg);
            if let Some(m) = changed {
                let mut field = ChunkMapField::new(w, &mut chunks);
                relight_after_edit(&mut field, &reg, p, m.old_id);
            }
            assert_matches_baseline(&reg, &chunks)?;
        }
    }
}
