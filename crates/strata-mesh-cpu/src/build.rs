use strata_blocks::{BlockRegistry, BlockType, Face};
use strata_chunk::{ChunkData, NeighborBorders, VoxelState};
use strata_geom::{VOXEL_PIVOT, Vec3};

use crate::atlas::tile_uv;
use crate::mesh_build::{ChunkMesh, RenderPass};
use crate::neighbors::NeighborView;

/// Builds the render buffers for `chunk`.
///
/// A face is emitted only when the voxel it faces is known and transparent. Faces
/// towards unloaded neighbours are skipped; that neighbour's own build, or this
/// chunk's rebuild once it loads, covers the seam.
pub fn build_chunk_mesh(
    chunk: &ChunkData,
    borders: &NeighborBorders,
    reg: &BlockRegistry,
) -> ChunkMesh {
    let view = NeighborView::new(chunk, borders);
    let mut mesh = ChunkMesh::new(chunk.coord);
    mesh.reserve_quads(chunk.sx * chunk.sz * 2);
    for y in 0..chunk.sy {
        for z in 0..chunk.sz {
            for x in 0..chunk.sx {
                let v = chunk.get_local(x, y, z);
                let Some(ty) = reg.get(v.id) else {
                    continue;
                };
                if !ty.is_meshed() {
                    continue;
                }
                emit_voxel(&mut mesh, &view, reg, ty, v, (x as i32, y as i32, z as i32));
            }
        }
    }
    log::trace!(
        target: "mesh",
        "chunk ({}, {}): {} verts, {} opaque / {} transparent / {} liquid tris",
        chunk.coord.cx,
        chunk.coord.cz,
        mesh.vertex_count(),
        mesh.triangle_count(RenderPass::Opaque),
        mesh.triangle_count(RenderPass::Transparent),
        mesh.triangle_count(RenderPass::Liquid)
    );
    mesh
}

#[inline]
fn pass_for(ty: &BlockType) -> RenderPass {
    if !ty.transparent {
        RenderPass::Opaque
    } else if ty.liquid {
        RenderPass::Liquid
    } else {
        RenderPass::Transparent
    }
}

fn emit_voxel(
    mesh: &mut ChunkMesh,
    view: &NeighborView<'_>,
    reg: &BlockRegistry,
    ty: &BlockType,
    v: VoxelState,
    (x, y, z): (i32, i32, i32),
) {
    let turns = v.orientation.yaw_quarter_turns();
    let origin = Vec3::new(x as f32, y as f32, z as f32);
    let pass = pass_for(ty);
    for face in Face::ALL {
        let tpl = ty.mesh.face(face);
        if tpl.is_empty() {
            continue;
        }
        // Template faces are authored facing north; the neighbour that hides
        // them is the one in the rotated direction.
        let dir = face.rotated(turns);
        let (dx, dy, dz) = dir.delta();
        let Some(n) = view.get(x + dx, y + dy, z + dz) else {
            continue;
        };
        let Some(nty) = reg.get(n.id) else {
            continue;
        };
        if !nty.transparent {
            continue;
        }
        if ty.liquid && dir == Face::PosY && nty.liquid {
            continue;
        }

        let light = n.light as f32 / 16.0;
        let normal = dir.normal();
        let base = mesh.vertex_count() as u32;
        for vert in &tpl.verts {
            let pos = origin + vert.pos.rotate_yaw_about(VOXEL_PIVOT, turns);
            let uv = if ty.liquid {
                vert.uv
            } else {
                tile_uv(ty.texture(face), vert.uv)
            };
            mesh.push_vertex(pos, normal, uv, light);
        }
        mesh.push_tris(pass, base, &tpl.tris);
    }
}
