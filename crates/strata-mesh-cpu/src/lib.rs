//! CPU meshing: face-culled chunk geometry with per-vertex light.
#![forbid(unsafe_code)]

mod atlas;
mod build;
mod mesh_build;
mod neighbors;

pub use atlas::{ATLAS_SIZE_IN_BLOCKS, NORMALIZED_TILE_SIZE, tile_uv};
pub use build::build_chunk_mesh;
pub use mesh_build::{ChunkMesh, RenderPass};
pub use neighbors::NeighborView;
