use std::io;

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("chunk encode failed: {0}")]
    Encode(#[source] bincode::Error),
    #[error("chunk decode failed: {0}")]
    Decode(#[source] bincode::Error),
    #[error("world record: {0}")]
    WorldToml(String),
    #[error("saved {what} does not match: expected {expected}, found {found}")]
    Mismatch {
        what: &'static str,
        expected: String,
        found: String,
    },
}

impl From<toml::de::Error> for PersistError {
    fn from(e: toml::de::Error) -> Self {
        PersistError::WorldToml(e.to_string())
    }
}

impl From<toml::ser::Error> for PersistError {
    fn from(e: toml::ser::Error) -> Self {
        PersistError::WorldToml(e.to_string())
    }
}
