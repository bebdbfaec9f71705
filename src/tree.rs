use indextree::{Arena, NodeId};
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::crawler::{FileCrawler, ScanStats};
use crate::node::FsNode;
use crate::weight::WeightTable;

/// Notifications raised while the tree destroys nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    /// The node holding the selection was destroyed.
    TargetLost { path: PathBuf },
}

/// Depth-limited mirror of a directory hierarchy, stored in an arena.
///
/// The arena owns every node; parent links are plain indices, so a child can
/// find its siblings without a second owning reference.
pub struct FileTree {
    arena: Arena<FsNode>,
    root: NodeId,
    weights: WeightTable,
    events: Vec<TreeEvent>,
}

impl FileTree {
    /// Create a tree holding only an unscanned root.
    pub fn new<P: AsRef<Path>>(root_path: P, depth_limit: usize, weights: WeightTable) -> Self {
        let mut arena = Arena::new();
        let root_node = FsNode::new(root_path.as_ref().to_path_buf(), 0, depth_limit, weights.leaf());
        let root = arena.new_node(root_node);

        Self {
            arena,
            root,
            weights,
            events: Vec::new(),
        }
    }

    /// Create a tree and scan it down to the depth limit.
    pub fn scan<P: AsRef<Path>>(root_path: P, depth_limit: usize, weights: WeightTable) -> Self {
        let mut tree = Self::new(root_path, depth_limit, weights);
        tree.refresh(tree.root);
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_path(&self) -> &Path {
        &self.arena[self.root].get().path
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    /// Whether `id` refers to a live node.
    ///
    /// Stale ids whose slot was reused by a newer node are rejected too.
    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.get(id).is_some() && !id.is_removed(&self.arena)
    }

    pub fn node(&self, id: NodeId) -> Option<&FsNode> {
        if !self.contains(id) {
            return None;
        }
        Some(self.arena[id].get())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut FsNode> {
        if !self.contains(id) {
            return None;
        }
        Some(self.arena[id].get_mut())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        if !self.contains(id) {
            return None;
        }
        id.parent(&self.arena)
    }

    /// Children of `id` in stored order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        if !self.contains(id) {
            return Vec::new();
        }
        id.children(&self.arena).collect()
    }

    pub fn child_named(&self, id: NodeId, name: impl AsRef<OsStr>) -> Option<NodeId> {
        let name = name.as_ref();
        self.children(id)
            .into_iter()
            .find(|&c| self.arena[c].get().key == name)
    }

    /// Every live node under the root, pre-order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &FsNode)> + '_ {
        self.root
            .descendants(&self.arena)
            .map(move |id| (id, self.arena[id].get()))
    }

    pub fn node_count(&self) -> usize {
        self.root.descendants(&self.arena).count()
    }

    /// Take the events raised since the last drain.
    pub fn drain_events(&mut self) -> Vec<TreeEvent> {
        std::mem::take(&mut self.events)
    }

    /// Reconcile the subtree at `id` against disk, then recompute the weight of
    /// every ancestor.
    pub fn refresh(&mut self, id: NodeId) -> ScanStats {
        if !self.contains(id) {
            return ScanStats::default();
        }

        let mut crawler = FileCrawler::new();
        self.refresh_node(id, &mut crawler);

        let ancestors: Vec<NodeId> = id.ancestors(&self.arena).skip(1).collect();
        for ancestor in ancestors {
            self.recompute_weight(ancestor);
        }

        let stats = crawler.finish();
        debug!(
            path = %self.arena[id].get().path.display(),
            dirs = stats.dirs_listed,
            entries = stats.entries_seen,
            errors = stats.errors,
            elapsed_ms = stats.duration.as_millis() as u64,
            "refresh complete"
        );
        stats
    }

    fn refresh_node(&mut self, id: NodeId, crawler: &mut FileCrawler) {
        let node = self.arena[id].get();
        let path = node.path.clone();
        let depth = node.depth;
        let depth_limit = node.depth_limit;
        let spawn = node.position;
        let within_limit = node.within_depth_limit();

        // An entry can change kind between passes under the same name.
        let is_dir = path.is_dir();
        self.arena[id].get_mut().is_dir = is_dir;

        if !within_limit || !is_dir {
            self.clear_children(id);
            self.recompute_weight(id);
            return;
        }

        let entries = match crawler.list(&path) {
            Ok(entries) => entries,
            Err(err) => {
                if id == self.root {
                    warn!(error = %err, "cannot list root, showing it empty");
                } else {
                    debug!(error = %err, "treating unreadable directory as empty");
                }
                Vec::new()
            }
        };

        // Pull the current children out; matched ones get re-appended in
        // listing order below.
        let mut existing: HashMap<OsString, NodeId> = HashMap::new();
        for child in self.children(id) {
            child.detach(&mut self.arena);
            existing.insert(self.arena[child].get().key.clone(), child);
        }

        let mut reused = Vec::new();
        for entry in entries {
            match existing.remove(&entry.name) {
                Some(child) => {
                    id.append(child, &mut self.arena);
                    reused.push(child);
                }
                None => {
                    let mut fresh = FsNode::new(entry.path, depth + 1, depth_limit, self.weights.leaf());
                    fresh.position = spawn;
                    fresh.target_position = spawn;
                    let child = self.arena.new_node(fresh);
                    id.append(child, &mut self.arena);
                    self.refresh_node(child, crawler);
                }
            }
        }

        for (_, stale) in existing {
            self.drop_subtree(stale);
        }

        for child in reused {
            self.refresh_node(child, crawler);
        }

        self.recompute_weight(id);
    }

    fn recompute_weight(&mut self, id: NodeId) {
        let child_weights: Vec<f64> = id
            .children(&self.arena)
            .map(|c| self.arena[c].get().weight)
            .collect();
        let weight = self.weights.weigh(child_weights.len(), child_weights);
        self.arena[id].get_mut().weight = weight;
    }

    fn clear_children(&mut self, id: NodeId) {
        for child in self.children(id) {
            self.drop_subtree(child);
        }
    }

    /// Destroy `id` and everything below it, reporting a lost selection.
    fn drop_subtree(&mut self, id: NodeId) {
        let lost: Vec<PathBuf> = id
            .descendants(&self.arena)
            .map(|d| self.arena[d].get())
            .filter(|n| n.is_target)
            .map(|n| n.path.clone())
            .collect();
        for path in lost {
            self.events.push(TreeEvent::TargetLost { path });
        }
        id.remove_subtree(&mut self.arena);
    }

    /// Unlink `id` from its parent and hand it back as a free-standing subtree.
    ///
    /// Returns `None` for the root or a dead id.
    pub fn detach(&mut self, id: NodeId) -> Option<NodeId> {
        if !self.contains(id) || id == self.root {
            return None;
        }
        let parent = id.parent(&self.arena)?;
        id.detach(&mut self.arena);
        self.recompute_weight(parent);
        Some(id)
    }

    /// Destroy the current root's subtree, then make `new_root` the root.
    ///
    /// `new_root` must already be detached; otherwise nothing happens.
    pub fn install_root(&mut self, new_root: NodeId) -> bool {
        if new_root == self.root || !self.contains(new_root) || new_root.parent(&self.arena).is_some() {
            return false;
        }
        let old_root = self.root;
        self.drop_subtree(old_root);
        self.root = new_root;
        true
    }

    /// Set `id` to `depth` and every descendant to its parent's depth + 1.
    pub fn set_depth_recursive(&mut self, id: NodeId, depth: usize, depth_limit: usize) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        node.depth = depth;
        node.depth_limit = depth_limit;

        for child in self.children(id) {
            self.set_depth_recursive(child, depth + 1, depth_limit);
        }
    }

    /// Destroy the whole tree and return the events it raised.
    pub fn discard(mut self) -> Vec<TreeEvent> {
        let root = self.root;
        self.drop_subtree(root);
        self.events
    }

    pub(crate) fn arena_mut(&mut self) -> &mut Arena<FsNode> {
        &mut self.arena
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};

    fn names(tree: &FileTree, id: NodeId) -> Vec<String> {
        tree.children(id)
            .into_iter()
            .map(|c| tree.node(c).unwrap().name.clone())
            .collect()
    }

    #[test]
    fn test_tree_basic() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("file1.txt")).unwrap();
        fs::create_dir(dir.path().join("dir1")).unwrap();
        File::create(dir.path().join("dir1/file2.txt")).unwrap();

        let tree = FileTree::scan(dir.path(), 5, WeightTable::default());
        let root = tree.root();

        assert_eq!(names(&tree, root), vec!["dir1", "file1.txt"]);
        assert_eq!(tree.node_count(), 4);

        let dir1 = tree.child_named(root, "dir1").unwrap();
        assert!(tree.node(dir1).unwrap().is_dir);
        assert_eq!(tree.node(dir1).unwrap().depth, 1);
        assert_eq!(tree.parent(dir1), Some(root));
        assert_eq!(names(&tree, dir1), vec!["file2.txt"]);
    }

    #[test]
    fn test_depth_limit_stops_scan() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b/c")).unwrap();

        // Depth limit 2: root (0) lists, depth 1 does not.
        let tree = FileTree::scan(dir.path(), 2, WeightTable::default());
        let a = tree.child_named(tree.root(), "a").unwrap();
        assert!(tree.children(a).is_empty());
        assert_eq!(tree.node_count(), 2);
    }

    #[test]
    fn test_depth_limit_one_scans_nothing() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("x")).unwrap();

        let tree = FileTree::scan(dir.path(), 1, WeightTable::default());
        assert!(tree.children(tree.root()).is_empty());
    }

    #[test]
    fn test_file_root_is_childless() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("only.txt");
        File::create(&file).unwrap();

        let tree = FileTree::scan(&file, 5, WeightTable::default());
        assert!(tree.children(tree.root()).is_empty());
        assert_eq!(tree.node(tree.root()).unwrap().weight, 1.0);
    }

    #[test]
    fn test_missing_root_is_childless() {
        let dir = tempfile::tempdir().unwrap();
        let tree = FileTree::scan(dir.path().join("nope"), 5, WeightTable::default());
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_refresh_keeps_matched_children() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("a")).unwrap();
        File::create(dir.path().join("b")).unwrap();

        let mut tree = FileTree::scan(dir.path(), 5, WeightTable::default());
        let root = tree.root();
        let a = tree.child_named(root, "a").unwrap();
        let b = tree.child_named(root, "b").unwrap();
        tree.node_mut(a).unwrap().position = glam::Vec2::new(12.0, -4.0);

        File::create(dir.path().join("c")).unwrap();
        tree.refresh(root);

        assert_eq!(names(&tree, root), vec!["a", "b", "c"]);
        assert_eq!(tree.child_named(root, "a"), Some(a));
        assert_eq!(tree.child_named(root, "b"), Some(b));
        assert_eq!(tree.node(a).unwrap().position, glam::Vec2::new(12.0, -4.0));
        let c = tree.child_named(root, "c").unwrap();
        assert_ne!(c, a);
        assert_ne!(c, b);
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub/inner")).unwrap();
        File::create(dir.path().join("sub/one")).unwrap();
        File::create(dir.path().join("top")).unwrap();

        let mut tree = FileTree::scan(dir.path(), 5, WeightTable::default());
        let snapshot = |tree: &FileTree| -> Vec<(NodeId, f64, glam::Vec2)> {
            tree.iter().map(|(id, n)| (id, n.weight, n.position)).collect()
        };

        tree.refresh(tree.root());
        let first = snapshot(&tree);
        tree.refresh(tree.root());
        assert_eq!(first, snapshot(&tree));
    }

    #[test]
    fn test_removed_entry_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("gone")).unwrap();
        File::create(dir.path().join("gone/inside")).unwrap();
        File::create(dir.path().join("kept")).unwrap();

        let mut tree = FileTree::scan(dir.path(), 5, WeightTable::default());
        let gone = tree.child_named(tree.root(), "gone").unwrap();
        let inside = tree.child_named(gone, "inside").unwrap();

        fs::remove_dir_all(dir.path().join("gone")).unwrap();
        tree.refresh(tree.root());

        assert!(!tree.contains(gone));
        assert!(!tree.contains(inside));
        assert_eq!(names(&tree, tree.root()), vec!["kept"]);
        assert!(tree.drain_events().is_empty());
    }

    #[test]
    fn test_dropping_target_raises_event() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("d")).unwrap();
        File::create(dir.path().join("d/selected")).unwrap();

        let mut tree = FileTree::scan(dir.path(), 5, WeightTable::default());
        let d = tree.child_named(tree.root(), "d").unwrap();
        let selected = tree.child_named(d, "selected").unwrap();
        tree.node_mut(selected).unwrap().is_target = true;

        // Removing the ancestor directory must still report the nested target.
        fs::remove_dir_all(dir.path().join("d")).unwrap();
        tree.refresh(tree.root());

        assert_eq!(
            tree.drain_events(),
            vec![TreeEvent::TargetLost {
                path: dir.path().join("d/selected")
            }]
        );
        assert!(tree.drain_events().is_empty());
    }

    #[test]
    fn test_weight_follows_child_count() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        for i in 0..5 {
            File::create(dir.path().join(format!("sub/f{}", i))).unwrap();
        }

        let mut tree = FileTree::scan(dir.path(), 5, WeightTable::default());
        let root = tree.root();
        let sub = tree.child_named(root, "sub").unwrap();
        assert_eq!(tree.node(sub).unwrap().weight, 3.6);
        // The large child boosts the root.
        assert_eq!(tree.node(root).unwrap().weight, 4.6);

        fs::remove_file(dir.path().join("sub/f0")).unwrap();
        fs::remove_file(dir.path().join("sub/f1")).unwrap();
        tree.refresh(root);

        assert_eq!(tree.node(sub).unwrap().weight, 3.2);
        assert_eq!(tree.node(root).unwrap().weight, 3.0);
    }

    #[test]
    fn test_refresh_of_inner_node_updates_ancestors() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        File::create(dir.path().join("sub/only")).unwrap();

        let mut tree = FileTree::scan(dir.path(), 5, WeightTable::default());
        let root = tree.root();
        let sub = tree.child_named(root, "sub").unwrap();
        assert_eq!(tree.node(root).unwrap().weight, 3.0);

        for i in 0..4 {
            File::create(dir.path().join(format!("sub/extra{}", i))).unwrap();
        }
        tree.refresh(sub);

        assert_eq!(tree.node(sub).unwrap().weight, 3.6);
        assert_eq!(tree.node(root).unwrap().weight, 4.6);
    }

    #[test]
    fn test_detach_and_install_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("keep/deeper")).unwrap();
        File::create(dir.path().join("sibling")).unwrap();

        let mut tree = FileTree::scan(dir.path(), 5, WeightTable::default());
        let old_root = tree.root();
        let keep = tree.child_named(old_root, "keep").unwrap();
        let deeper = tree.child_named(keep, "deeper").unwrap();
        let sibling = tree.child_named(old_root, "sibling").unwrap();

        assert_eq!(tree.detach(old_root), None);
        assert_eq!(tree.detach(keep), Some(keep));
        assert_eq!(tree.parent(keep), None);
        assert!(tree.install_root(keep));

        assert_eq!(tree.root(), keep);
        assert!(!tree.contains(old_root));
        assert!(!tree.contains(sibling));
        assert!(tree.contains(deeper));
        assert_eq!(tree.parent(deeper), Some(keep));
    }

    #[test]
    fn test_install_root_requires_detached_node() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("child")).unwrap();

        let mut tree = FileTree::scan(dir.path(), 5, WeightTable::default());
        let child = tree.child_named(tree.root(), "child").unwrap();
        assert!(!tree.install_root(child));
        assert!(!tree.install_root(tree.root()));
    }

    #[test]
    fn test_set_depth_recursive() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b/c")).unwrap();

        let mut tree = FileTree::scan(dir.path(), 6, WeightTable::default());
        let a = tree.child_named(tree.root(), "a").unwrap();
        let b = tree.child_named(a, "b").unwrap();
        let c = tree.child_named(b, "c").unwrap();

        tree.set_depth_recursive(b, 0, 3);
        assert_eq!(tree.node(b).unwrap().depth, 0);
        assert_eq!(tree.node(c).unwrap().depth, 1);
        assert_eq!(tree.node(c).unwrap().depth_limit, 3);
        assert_eq!(tree.node(a).unwrap().depth, 1);
    }

    #[test]
    fn test_discard_reports_target() {
        let dir = tempfile::tempdir().unwrap();
        let mut tree = FileTree::scan(dir.path(), 5, WeightTable::default());
        let root = tree.root();
        tree.node_mut(root).unwrap().is_target = true;

        let events = tree.discard();
        assert_eq!(events.len(), 1);
    }
}
