use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// The terminal host owns the screen, so it falls back to a temp file.
    pub fn file_or_default(path: Option<&Path>, default_name: &str) -> Self {
        match path {
            Some(path) => LogTarget::File(path.to_path_buf()),
            None => LogTarget::File(std::env::temp_dir().join(default_name)),
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. `RUST_LOG` overrides the default level.
///
/// Calling this twice is harmless; the second subscriber is discarded.
pub fn init(target: &LogTarget) -> io::Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .compact();

    let result = match target {
        LogTarget::Stderr => builder.with_writer(io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };
    if result.is_err() {
        tracing::debug!("logging already initialised");
    }
    Ok(())
}
