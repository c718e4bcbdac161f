use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("NBT error in {path}: {source}")]
    Nbt {
        path: PathBuf,
        #[source]
        source: limbo_nbt::NbtError,
    },

    #[error("invalid coordinates: {0:?}")]
    BadCoordinates(String),

    #[error("invalid direction: {0:?}")]
    BadDirection(String),

    #[error("invalid map tile {path}: {reason}")]
    BadMapTile { path: PathBuf, reason: String },

    #[error("no worlds could be loaded")]
    NoWorlds,

    #[error("no worlds loaded for version family {0}")]
    EmptyFamily(String),
}

impl WorldError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WorldError::Io {
            path: path.into(),
            source,
        }
    }
}
