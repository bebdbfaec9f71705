use clap::Parser;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Animated radial view of a directory tree.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Args {
    /// Directory to visualize (defaults to the current directory)
    pub path: Option<PathBuf>,

    /// Maximum depth to scan; overrides the config file
    #[arg(long, short = 'd')]
    pub depth_limit: Option<usize>,

    /// TOML config file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Rescan automatically when the filesystem changes
    #[arg(long, short = 'w')]
    pub watch: bool,

    /// Write logs to this file instead of the default destination
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// The root to open, made absolute against the working directory.
    pub fn root_path(&self) -> io::Result<PathBuf> {
        let path = self.path.as_deref().unwrap_or_else(|| Path::new("."));
        absolute(path)
    }

    /// Apply command-line overrides on top of a loaded config.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(depth_limit) = self.depth_limit {
            config.depth_limit = depth_limit;
        }
    }
}

/// Join a relative path onto the working directory and drop `.` segments.
///
/// Symlinks are left alone so the displayed names match what was typed.
pub fn absolute(path: &Path) -> io::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(joined
        .components()
        .filter(|c| !matches!(c, std::path::Component::CurDir))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["fsview"]);
        assert!(args.path.is_none());
        assert!(!args.watch);
        assert_eq!(args.root_path().unwrap(), std::env::current_dir().unwrap());
    }

    #[test]
    fn test_flags() {
        let args = Args::parse_from([
            "fsview",
            "/tmp/somewhere",
            "--depth-limit",
            "3",
            "--watch",
            "--config",
            "fsview.toml",
        ]);
        assert_eq!(args.path.as_deref(), Some(Path::new("/tmp/somewhere")));
        assert_eq!(args.config.as_deref(), Some(Path::new("fsview.toml")));
        assert!(args.watch);

        let mut config = Config::default();
        args.apply_overrides(&mut config);
        assert_eq!(config.depth_limit, 3);
    }

    #[test]
    fn test_absolute_strips_current_dir() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(absolute(Path::new("./a/./b")).unwrap(), cwd.join("a/b"));
        assert_eq!(absolute(Path::new("/x/./y")).unwrap(), PathBuf::from("/x/y"));
    }
}
