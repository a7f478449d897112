//! Block types, mesh templates, and the registry that ties them to ids.
#![forbid(unsafe_code)]

pub mod config;
pub mod mesh;
pub mod registry;
pub mod types;

pub use mesh::{FaceTemplate, MeshTemplate, VertData};
pub use registry::{BlockRegistry, BlockType, MAX_LIGHT};
pub use types::{AIR, BlockId, Face, FaceRole, Orientation};
