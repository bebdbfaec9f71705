use glam::Vec2;
use indextree::NodeId;
use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};
use std::path::Path;
use tracing::{debug, info, trace};

use crate::animation::animate;
use crate::config::{Config, BASE_CHILD_DISTANCE, DEFAULT_LABEL_DEPTH};
use crate::error::ConfigResult;
use crate::node::FsNode;
use crate::render_tree::{collect_views, NodeView};
use crate::tree::{FileTree, TreeEvent};
use crate::weight::WeightTable;

/// Distance along each axis a fresh root starts from the origin.
const SPAWN_OFFSET: f32 = 300.0;

/// Discrete commands the host derives from input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavCommand {
    MoveToChild,
    MoveToParent,
    MovePreviousSibling,
    MoveNextSibling,
    /// Make the selection the new root, dropping everything outside it.
    Reroot,
    /// Rebuild the tree from the filesystem parent of the current root.
    Ascend,
    Rescan,
}

type TargetLostHook = Box<dyn FnMut(&Path)>;

/// Coordinating context: owns the tree and the single selection.
///
/// Exactly one node carries `is_target` at any time. Every command that moves
/// the selection clears the old flag and sets the new one in the same step,
/// and any command that destroys the selected node falls back to the root.
pub struct Navigator {
    tree: FileTree,
    selection: NodeId,
    depth_limit: usize,
    base_distance: f32,
    label_depth: usize,
    queue: VecDeque<NavCommand>,
    on_target_lost: Option<TargetLostHook>,
}

impl Navigator {
    /// Build and fully scan a tree at `root_path` with default settings.
    pub fn new<P: AsRef<Path>>(root_path: P, depth_limit: usize) -> Self {
        Self::build(
            root_path.as_ref(),
            depth_limit,
            WeightTable::default(),
            BASE_CHILD_DISTANCE,
            DEFAULT_LABEL_DEPTH,
        )
    }

    pub fn with_config<P: AsRef<Path>>(root_path: P, config: &Config) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::build(
            root_path.as_ref(),
            config.depth_limit,
            config.weight_table()?,
            config.base_child_distance,
            config.label_depth,
        ))
    }

    fn build(
        root_path: &Path,
        depth_limit: usize,
        weights: WeightTable,
        base_distance: f32,
        label_depth: usize,
    ) -> Self {
        let tree = spawn_tree(root_path, depth_limit, weights);
        let mut navigator = Self {
            selection: tree.root(),
            tree,
            depth_limit,
            base_distance,
            label_depth,
            queue: VecDeque::new(),
            on_target_lost: None,
        };
        navigator.mark_root_selected();
        navigator
    }

    /// Register the hook called with the path of a destroyed selected node.
    ///
    /// By the time it runs the selection has not been repaired yet; it is
    /// moved to the root right after the hook returns.
    pub fn on_target_lost<F>(&mut self, hook: F)
    where
        F: FnMut(&Path) + 'static,
    {
        self.on_target_lost = Some(Box::new(hook));
    }

    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn root_path(&self) -> &Path {
        self.tree.root_path()
    }

    pub fn selection(&self) -> NodeId {
        self.selection
    }

    pub fn selected_node(&self) -> Option<&FsNode> {
        self.tree.node(self.selection)
    }

    pub fn depth_limit(&self) -> usize {
        self.depth_limit
    }

    /// Read-only view of every node for drawing.
    pub fn views(&self) -> Vec<NodeView<'_>> {
        collect_views(&self.tree, self.label_depth)
    }

    /// Defer a command until the next `tick`.
    pub fn queue(&mut self, command: NavCommand) {
        self.queue.push_back(command);
    }

    /// Apply queued commands, then advance animation by `dt` seconds.
    pub fn tick(&mut self, dt: f64) {
        while let Some(command) = self.queue.pop_front() {
            self.apply(command);
        }
        animate(&mut self.tree, self.base_distance, dt);
    }

    /// Execute one command now. Returns false when it was a no-op.
    pub fn apply(&mut self, command: NavCommand) -> bool {
        let applied = match command {
            NavCommand::MoveToChild => self.move_to_child(),
            NavCommand::MoveToParent => self.move_to_parent(),
            NavCommand::MovePreviousSibling => self.move_to_sibling(false),
            NavCommand::MoveNextSibling => self.move_to_sibling(true),
            NavCommand::Reroot => self.reroot(),
            NavCommand::Ascend => self.ascend(),
            NavCommand::Rescan => {
                let root = self.tree.root();
                self.tree.refresh(root);
                true
            }
        };
        if !applied {
            trace!(?command, "command not applicable");
        }

        let events = self.tree.drain_events();
        self.handle_events(events);
        applied
    }

    fn move_to_child(&mut self) -> bool {
        match self.tree.children(self.selection).first() {
            Some(&first) => self.select(first),
            None => false,
        }
    }

    fn move_to_parent(&mut self) -> bool {
        match self.tree.parent(self.selection) {
            Some(parent) => self.select(parent),
            None => false,
        }
    }

    fn move_to_sibling(&mut self, forward: bool) -> bool {
        let Some(parent) = self.tree.parent(self.selection) else {
            return false;
        };
        let siblings = self.tree.children(parent);
        let count = siblings.len();
        if count < 2 {
            return false;
        }
        let Some(index) = siblings.iter().position(|&s| s == self.selection) else {
            return false;
        };

        let next = if forward {
            (index + 1) % count
        } else {
            (index + count - 1) % count
        };
        self.select(siblings[next])
    }

    fn reroot(&mut self) -> bool {
        let selection = self.selection;
        if selection == self.tree.root() {
            return false;
        }
        let Some(detached) = self.tree.detach(selection) else {
            return false;
        };
        if !self.tree.install_root(detached) {
            return false;
        }

        if let Some(node) = self.tree.node_mut(detached) {
            node.position = Vec2::ZERO;
            node.target_position = Vec2::ZERO;
        }
        self.tree.set_depth_recursive(detached, 0, self.depth_limit);
        self.tree.refresh(detached);

        info!(root = %self.tree.root_path().display(), "rerooted");
        true
    }

    fn ascend(&mut self) -> bool {
        let parent = self
            .tree
            .root_path()
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf);
        let Some(parent) = parent else {
            return false;
        };

        let weights = self.tree.weights().clone();
        let old = std::mem::replace(&mut self.tree, spawn_tree(&parent, self.depth_limit, weights));
        let events = old.discard();
        self.handle_events(events);

        self.selection = self.tree.root();
        self.mark_root_selected();
        info!(root = %parent.display(), "ascended");
        true
    }

    fn select(&mut self, id: NodeId) -> bool {
        if id == self.selection || !self.tree.contains(id) {
            return false;
        }
        if let Some(old) = self.tree.node_mut(self.selection) {
            old.is_target = false;
        }
        if let Some(new) = self.tree.node_mut(id) {
            new.is_target = true;
        }
        self.selection = id;
        true
    }

    fn handle_events(&mut self, events: Vec<TreeEvent>) {
        let mut lost = false;
        for event in events {
            match event {
                TreeEvent::TargetLost { path } => {
                    debug!(path = %path.display(), "selected node destroyed");
                    if let Some(hook) = self.on_target_lost.as_mut() {
                        hook(&path);
                    }
                    lost = true;
                }
            }
        }

        if lost || !self.tree.contains(self.selection) {
            self.selection = self.tree.root();
            self.mark_root_selected();
        }
    }

    fn mark_root_selected(&mut self) {
        let root = self.tree.root();
        if let Some(node) = self.tree.node_mut(root) {
            node.is_target = true;
        }
    }
}

/// Scan a new tree whose root flies in from one of the four diagonals.
fn spawn_tree(root_path: &Path, depth_limit: usize, weights: WeightTable) -> FileTree {
    let mut tree = FileTree::scan(root_path, depth_limit, weights);
    let root = tree.root();
    let offset = spawn_offset(root_path);
    if let Some(node) = tree.node_mut(root) {
        node.position = offset;
        node.target_position = Vec2::ZERO;
    }
    tree
}

fn spawn_offset(path: &Path) -> Vec2 {
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    let bits = hasher.finish();

    let x = if bits & 1 == 0 { -SPAWN_OFFSET } else { SPAWN_OFFSET };
    let y = if bits & 2 == 0 { -SPAWN_OFFSET } else { SPAWN_OFFSET };
    Vec2::new(x, y)
}
