use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Runtime settings from `engine.toml`. Every field has a default, so an empty file is valid.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Chunks within this radius of the player are active and meshed.
    pub view_distance: i32,
    /// Chunks within this radius are populated ahead of the player. Never below `view_distance`.
    pub load_distance: i32,
    /// Generation and meshing workers. 0 picks one less than the available cores.
    pub worker_threads: usize,
    pub tick_length_ms: u64,
    pub save_dir: PathBuf,
    pub world_name: String,
    /// Overrides the worldgen seed for new worlds. Existing worlds keep their saved seed.
    pub seed: Option<i32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            view_distance: 5,
            load_distance: 7,
            worker_threads: 0,
            tick_length_ms: 1000,
            save_dir: PathBuf::from("saves"),
            world_name: "world".to_string(),
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        Ok(toml::from_str(s)?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    #[inline]
    pub fn effective_load_distance(&self) -> i32 {
        self.load_distance.max(self.view_distance)
    }

    pub fn effective_workers(&self) -> usize {
        if self.worker_threads > 0 {
            return self.worker_threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get().saturating_sub(1))
            .unwrap_or(1)
            .max(1)
    }
}
