//! From-scratch light solve used to check the incremental path.

use strata_blocks::{BlockRegistry, Face, MAX_LIGHT};
use strata_world::VoxelPos;

use crate::{LightField, cast_light, source_level};

/// Recomputes light for columns `x0..x1` by `z0..z1`.
///
/// Every voxel is reset to its source (full for open sky, emission otherwise) and
/// relaxed until no neighbour can raise it. Unloaded positions are skipped.
pub fn recompute_all<F: LightField + ?Sized>(
    field: &mut F,
    reg: &BlockRegistry,
    (x0, z0): (i32, i32),
    (x1, z1): (i32, i32),
) {
    let h = field.height();
    for z in z0..z1 {
        for x in x0..x1 {
            let mut open = true;
            for y in (0..h).rev() {
                let p = VoxelPos::new(x, y, z);
                let Some(id) = field.block(p) else {
                    break;
                };
                if reg.opacity(id) > 0 {
                    open = false;
                }
                let level = if open { MAX_LIGHT } else { source_level(reg, id) };
                field.set_light(p, level);
            }
        }
    }

    let inside = |p: VoxelPos| p.x >= x0 && p.x < x1 && p.z >= z0 && p.z < z1;
    loop {
        let mut changed = false;
        for y in 0..h {
            for z in z0..z1 {
                for x in x0..x1 {
                    let p = VoxelPos::new(x, y, z);
                    let (Some(id), Some(l)) = (field.block(p), field.light(p)) else {
                        continue;
                    };
                    let cast = cast_light(reg, id, l);
                    if cast == 0 {
                        continue;
                    }
                    for face in Face::ALL {
                        let n = p.offset(face.delta());
                        if !inside(n) {
                            continue;
                        }
                        if matches!(field.light(n), Some(nl) if nl < cast) {
                            field.set_light(n, cast);
                            changed = true;
                        }
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }
}
