//! World layout, coordinates, noise, and terrain generation.
#![forbid(unsafe_code)]

pub mod noise;
pub mod structures;
pub mod terrain;
pub mod voxel;
pub mod worldgen;

pub use noise::{NoiseSource, PerlinNoise};
pub use structures::VoxelMod;
pub use terrain::TerrainGenerator;
pub use voxel::{ChunkCoord, VoxelPos, World};
pub use worldgen::{WorldGenConfig, WorldGenParams};
