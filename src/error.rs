use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure to list a directory during a refresh pass.
///
/// These never escape the refresh engine: the affected node is treated as
/// childless and the error is only logged and counted.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("access denied: {path}")]
    AccessDenied { path: PathBuf },

    #[error("path vanished before it could be listed: {path}")]
    NotFound { path: PathBuf },

    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("failed to list {path}: {source}")]
    Other {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        let path = path.to_path_buf();
        match err.kind() {
            io::ErrorKind::PermissionDenied => ScanError::AccessDenied { path },
            io::ErrorKind::NotFound => ScanError::NotFound { path },
            io::ErrorKind::NotADirectory => ScanError::NotADirectory { path },
            _ => ScanError::Other { path, source: err },
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ScanError::AccessDenied { path }
            | ScanError::NotFound { path }
            | ScanError::NotADirectory { path }
            | ScanError::Other { path, .. } => path,
        }
    }
}

/// Startup configuration problems. All of these are fatal before the first frame.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("weight table is empty")]
    EmptyWeightTable,

    #[error("weight table declares {declared} buckets but supplies {supplied}")]
    WeightTableGap { declared: usize, supplied: usize },

    #[error("weight for {bucket} children must be a finite number >= 1.0, got {value}")]
    InvalidWeight { bucket: usize, value: f64 },

    #[error("large weight {large} is below table entry {value}")]
    LargeWeightTooSmall { large: f64, value: f64 },

    #[error("depth limit must be at least 1")]
    ZeroDepthLimit,

    #[error("child distance must be positive, got {0}")]
    InvalidChildDistance(f32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// The filesystem watcher could not be created or attached to a root.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to create filesystem watcher: {0}")]
    Create(#[source] notify::Error),

    #[error("failed to watch {path}: {source}")]
    Attach {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}
