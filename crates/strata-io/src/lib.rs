//! World and chunk persistence: a TOML world record plus one bincode file per saved chunk.
#![forbid(unsafe_code)]

mod error;
mod record;
mod store;
mod worker;

pub use error::PersistError;
pub use record::{ChunkRecord, WorldRecord};
pub use store::WorldStore;
pub use worker::{IoWorker, LoadCallback, SaveFailure};
