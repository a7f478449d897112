use serde::{Deserialize, Serialize};
use strata_chunk::ChunkData;
use strata_world::{ChunkCoord, World};

use crate::PersistError;

/// Contents of `world.toml`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldRecord {
    pub name: String,
    pub seed: i32,
    pub chunk_width: usize,
    pub chunk_height: usize,
}

impl WorldRecord {
    pub fn new(name: impl Into<String>, world: &World) -> Self {
        Self {
            name: name.into(),
            seed: world.seed,
            chunk_width: world.chunk_width,
            chunk_height: world.chunk_height,
        }
    }

    /// Rejects a record saved with a different chunk layout than `world`.
    pub fn check_layout(&self, world: &World) -> Result<(), PersistError> {
        if self.chunk_width != world.chunk_width || self.chunk_height != world.chunk_height {
            return Err(PersistError::Mismatch {
                what: "chunk layout",
                expected: format!("{}x{}", world.chunk_width, world.chunk_height),
                found: format!("{}x{}", self.chunk_width, self.chunk_height),
            });
        }
        Ok(())
    }
}

/// One saved chunk. `x`/`z` are the chunk's global voxel origin. Light is not stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub x: i32,
    pub z: i32,
    pub width: u32,
    pub height: u32,
    pub ids: Vec<u16>,
    pub orientations: Vec<u8>,
}

impl ChunkRecord {
    pub fn from_chunk(chunk: &ChunkData) -> Self {
        let origin = chunk.global_of(0, 0, 0);
        Self {
            x: origin.x,
            z: origin.z,
            width: chunk.sx as u32,
            height: chunk.sy as u32,
            ids: chunk.ids(),
            orientations: chunk.orientations(),
        }
    }

    /// Chunk coordinate under `world`'s layout.
    pub fn coord(&self, world: &World) -> ChunkCoord {
        let w = world.chunk_width as i32;
        ChunkCoord::new(self.x.div_euclid(w), self.z.div_euclid(w))
    }

    /// Rebuilds the voxel grid. Fails when the record was written for another layout
    /// or its arrays are damaged.
    pub fn into_chunk(self, world: &World) -> Result<ChunkData, PersistError> {
        if self.width as usize != world.chunk_width || self.height as usize != world.chunk_height {
            return Err(PersistError::Mismatch {
                what: "chunk size",
                expected: format!("{}x{}", world.chunk_width, world.chunk_height),
                found: format!("{}x{}", self.width, self.height),
            });
        }
        let coord = self.coord(world);
        let origin = world.chunk_origin(coord);
        if origin.x != self.x || origin.z != self.z {
            return Err(PersistError::Mismatch {
                what: "chunk origin",
                expected: format!("{},{}", origin.x, origin.z),
                found: format!("{},{}", self.x, self.z),
            });
        }
        ChunkData::from_records(
            coord,
            world.chunk_width,
            world.chunk_height,
            &self.ids,
            &self.orientations,
        )
        .ok_or_else(|| PersistError::Mismatch {
            what: "voxel arrays",
            expected: format!("{} valid voxels", world.chunk_volume()),
            found: format!("{} ids / {} orientations", self.ids.len(), self.orientations.len()),
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>, PersistError> {
        bincode::serialize(self).map_err(PersistError::Encode)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PersistError> {
        bincode::deserialize(bytes).map_err(PersistError::Decode)
    }
}
