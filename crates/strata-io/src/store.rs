use std::fs;
use std::path::{Path, PathBuf};

use strata_chunk::ChunkData;
use strata_world::{ChunkCoord, World};

use crate::{ChunkRecord, PersistError, WorldRecord};

const WORLD_FILE: &str = "world.toml";
const CHUNK_DIR: &str = "chunks";

/// One world's directory: `<save_dir>/<name>/world.toml` and `chunks/<x>-<z>.chunk`.
#[derive(Debug)]
pub struct WorldStore {
    root: PathBuf,
    world: World,
    record: WorldRecord,
}

impl WorldStore {
    /// Opens the world `name` under `save_dir`, creating it when absent.
    ///
    /// An existing record keeps its seed; `world` supplies the layout, which must match.
    pub fn open(save_dir: impl AsRef<Path>, name: &str, world: World) -> Result<Self, PersistError> {
        let root = save_dir.as_ref().join(name);
        let path = root.join(WORLD_FILE);
        if path.exists() {
            let text = fs::read_to_string(&path)?;
            let record: WorldRecord = toml::from_str(&text)?;
            record.check_layout(&world)?;
            let world = World {
                seed: record.seed,
                ..world
            };
            log::info!(target: "events", "opened world '{}' (seed {})", record.name, record.seed);
            return Ok(Self {
                root,
                world,
                record,
            });
        }
        Self::create(root, name, world)
    }

    /// Starts a new world `name`, moving any existing directory aside to `<name>.old-<n>`.
    pub fn create_fresh(save_dir: impl AsRef<Path>, name: &str, world: World) -> Result<Self, PersistError> {
        let save_dir = save_dir.as_ref();
        let root = save_dir.join(name);
        if root.exists() {
            let mut n = 0u32;
            let aside = loop {
                let candidate = save_dir.join(format!("{name}.old-{n}"));
                if !candidate.exists() {
                    break candidate;
                }
                n += 1;
            };
            fs::rename(&root, &aside)?;
            log::warn!(target: "events", "moved old world '{}' to {}", name, aside.display());
        }
        Self::create(root, name, world)
    }

    fn create(root: PathBuf, name: &str, world: World) -> Result<Self, PersistError> {
        fs::create_dir_all(root.join(CHUNK_DIR))?;
        let record = WorldRecord::new(name, &world);
        let store = Self {
            root,
            world,
            record,
        };
        store.save_world()?;
        log::info!(target: "events", "created world '{}' (seed {})", name, world.seed);
        Ok(store)
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Layout plus the seed the world was created with.
    #[inline]
    pub fn world(&self) -> World {
        self.world
    }

    #[inline]
    pub fn record(&self) -> &WorldRecord {
        &self.record
    }

    pub fn save_world(&self) -> Result<(), PersistError> {
        let text = toml::to_string(&self.record)?;
        write_atomic(&self.root.join(WORLD_FILE), text.as_bytes())
    }

    pub fn chunk_path(&self, coord: ChunkCoord) -> PathBuf {
        let o = self.world.chunk_origin(coord);
        self.root.join(CHUNK_DIR).join(format!("{}-{}.chunk", o.x, o.z))
    }

    pub fn save_chunk(&self, record: &ChunkRecord) -> Result<(), PersistError> {
        let bytes = record.encode()?;
        write_atomic(&self.chunk_path(record.coord(&self.world)), &bytes)
    }

    /// `Ok(None)` when the chunk was never saved; an error when the file is unreadable or damaged.
    pub fn load_chunk(&self, coord: ChunkCoord) -> Result<Option<ChunkData>, PersistError> {
        let path = self.chunk_path(coord);
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record = ChunkRecord::decode(&bytes)?;
        let found = record.coord(&self.world);
        if found != coord {
            return Err(PersistError::Mismatch {
                what: "chunk file",
                expected: format!("{coord:?}"),
                found: format!("{found:?}"),
            });
        }
        record.into_chunk(&self.world).map(Some)
    }

    /// Coordinates of every saved chunk file with a well-formed name.
    pub fn saved_chunks(&self) -> Result<Vec<ChunkCoord>, PersistError> {
        let mut out = Vec::new();
        let w = self.world.chunk_width as i32;
        for entry in fs::read_dir(self.root.join(CHUNK_DIR))? {
            let name = entry?.file_name();
            let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".chunk")) else {
                continue;
            };
            let Some((x, z)) = parse_origin(stem) else {
                continue;
            };
            if x % w == 0 && z % w == 0 {
                out.push(ChunkCoord::new(x / w, z / w));
            }
        }
        out.sort();
        Ok(out)
    }
}

// Origins are never negative inside the world, so the first '-' splits x from z.
fn parse_origin(stem: &str) -> Option<(i32, i32)> {
    let (x, z) = stem.split_once('-')?;
    Some((x.parse().ok()?, z.parse().ok()?))
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PersistError> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
