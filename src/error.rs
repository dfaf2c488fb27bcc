//! Crate-wide error type.

use thiserror::Error;

/// Errors surfaced by the scatter core, the status store and config loading.
#[derive(Debug, Error)]
pub enum Error {
    /// A point index from the public API does not exist in the current load.
    #[error("point index {index} out of range (current load has {len} points)")]
    PointIndexOutOfRange { index: usize, len: usize },

    /// A plotted-item tag that is not one of the known kinds.
    #[error("unknown plotted item kind {0:?}")]
    UnknownItemKind(String),

    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("config json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
