use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexError>;

/// Fatal, per-call failures while building, saving or loading an index.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("document root {0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("failed to create document root {path}: {source}")]
    CreateRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to enumerate document root {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("index file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("index file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("index file {path} is inconsistent: {reason}")]
    Inconsistent { path: PathBuf, reason: String },

    #[error("failed to serialize index: {0}")]
    Json(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("result limit must be at least 1")]
    InvalidLimit,

    #[error("indexing failed: {0}")]
    Index(#[from] IndexError),
}

/// Why a single document could not be read.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("{0} is not valid UTF-8 text")]
    Decode(PathBuf),

    #[error("path {0} is not valid UTF-8")]
    NonUtf8Path(PathBuf),

    #[error("{0} is outside the document root")]
    OutsideRoot(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReadError {
    pub(crate) fn from_io(path: PathBuf, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ReadError::NotFound(path),
            std::io::ErrorKind::PermissionDenied => ReadError::PermissionDenied(path),
            std::io::ErrorKind::InvalidData => ReadError::Decode(path),
            _ => ReadError::Io { path, source: err },
        }
    }
}
