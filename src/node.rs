use glam::Vec2;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// One filesystem entry in the visualization tree.
///
/// Structure (children, parent) lives in the arena that owns this record; the
/// record itself only carries per-node state.
#[derive(Debug, Clone)]
pub struct FsNode {
    pub path: PathBuf,
    /// Display name; lossy form of `key`.
    pub name: String,
    /// File name within the parent directory. Identity key for diffing.
    pub key: OsString,
    /// Rechecked on every refresh pass.
    pub is_dir: bool,
    pub depth: usize,
    /// Scanning stops once `depth + 1 >= depth_limit`.
    pub depth_limit: usize,
    /// Rendered (animated) location.
    pub position: Vec2,
    /// Layout-computed goal the position eases toward.
    pub target_position: Vec2,
    /// Seconds accumulated by the animation pass; drives child precession.
    pub clock: f64,
    pub weight: f64,
    /// Whether this node holds the selection.
    pub is_target: bool,
}

impl FsNode {
    pub fn new(path: PathBuf, depth: usize, depth_limit: usize, weight: f64) -> Self {
        let key = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| path.as_os_str().to_os_string());
        let name = key.to_string_lossy().to_string();
        let is_dir = path.is_dir();

        Self {
            path,
            name,
            key,
            is_dir,
            depth,
            depth_limit,
            position: Vec2::ZERO,
            target_position: Vec2::ZERO,
            clock: 0.0,
            weight,
            is_target: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a refresh pass may list this node's directory.
    pub fn within_depth_limit(&self) -> bool {
        self.depth + 1 < self.depth_limit
    }

    /// Drawing size hint; shrinks with depth down to a single pixel.
    pub fn radius_hint(&self) -> f32 {
        let size = 1 + 2 * (4 - self.depth as i64);
        size.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_and_key_from_path() {
        let node = FsNode::new(PathBuf::from("/does/not/exist/report.txt"), 2, 5, 1.0);
        assert_eq!(node.name, "report.txt");
        assert_eq!(node.key, OsString::from("report.txt"));
        assert!(!node.is_dir);
        assert!(!node.is_target);
    }

    #[test]
    fn test_filesystem_root_keeps_full_path_as_name() {
        let node = FsNode::new(PathBuf::from("/"), 0, 5, 1.0);
        assert_eq!(node.name, "/");
    }

    #[test]
    fn test_depth_limit_boundary() {
        let mut node = FsNode::new(PathBuf::from("/x"), 3, 5, 1.0);
        assert!(node.within_depth_limit());
        node.depth = 4;
        assert!(!node.within_depth_limit());
    }

    #[test]
    fn test_radius_hint_shrinks_with_depth() {
        let mut node = FsNode::new(PathBuf::from("/x"), 0, 5, 1.0);
        assert_eq!(node.radius_hint(), 9.0);
        node.depth = 3;
        assert_eq!(node.radius_hint(), 3.0);
        node.depth = 4;
        assert_eq!(node.radius_hint(), 1.0);
        node.depth = 9;
        assert_eq!(node.radius_hint(), 1.0);
    }
}
