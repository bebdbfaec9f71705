use glam::Vec2;
use indextree::NodeId;
use std::path::Path;

use crate::tree::FileTree;

/// What a host needs to draw one node.
#[derive(Debug, Clone)]
pub struct NodeView<'a> {
    pub id: NodeId,
    pub path: &'a Path,
    pub name: &'a str,
    pub position: Vec2,
    pub radius: f32,
    pub is_dir: bool,
    pub depth: usize,
    pub selected: bool,
    /// Shallow nodes and the selection are labelled; the rest are dots.
    pub show_label: bool,
}

/// Flatten the tree into draw order (parents before children).
pub fn collect_views(tree: &FileTree, label_depth: usize) -> Vec<NodeView<'_>> {
    tree.iter()
        .map(|(id, node)| NodeView {
            id,
            path: &node.path,
            name: &node.name,
            position: node.position,
            radius: node.radius_hint(),
            is_dir: node.is_dir,
            depth: node.depth,
            selected: node.is_target,
            show_label: node.depth <= label_depth || node.is_target,
        })
        .collect()
}
