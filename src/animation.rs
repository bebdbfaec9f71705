use glam::Vec2;
use indextree::NodeId;

use crate::radial_layout::{base_angle, child_distance, child_target, partition_sectors};
use crate::tree::FileTree;

/// Fraction of the remaining distance covered per second of `dt`.
pub const EASE_RATE: f32 = 2.0;

/// Move `current` toward `target` by `EASE_RATE * dt` of the remaining gap.
///
/// This is a geometric ease, not a physical spring: a larger `dt` converges
/// faster, the step never overshoots while `dt < 0.5`, and at `dt == 0.5` it
/// lands exactly on the target.
pub fn ease_toward(current: Vec2, target: Vec2, dt: f32) -> Vec2 {
    current + (target - current) * (EASE_RATE * dt)
}

/// Advance the whole tree by `dt` seconds.
///
/// Each node first eases toward its own target, then hands its children new
/// targets around its updated position, then recurses. Targets are therefore
/// refreshed top-down once per frame before any child moves.
pub fn animate(tree: &mut FileTree, base_distance: f32, dt: f64) {
    let root = tree.root();
    animate_node(tree, root, base_distance, dt);
}

fn animate_node(tree: &mut FileTree, id: NodeId, base_distance: f32, dt: f64) {
    let Some(node) = tree.node_mut(id) else {
        return;
    };
    node.position = ease_toward(node.position, node.target_position, dt as f32);
    node.clock += dt;

    let position = node.position;
    let start_angle = base_angle(node.clock);
    let distance = child_distance(base_distance, node.depth);

    let children = tree.children(id);
    let weights: Vec<f64> = children
        .iter()
        .filter_map(|&c| tree.node(c).map(|n| n.weight))
        .collect();
    let sectors = partition_sectors(&weights, start_angle);

    let arena = tree.arena_mut();
    for (&child, sector) in children.iter().zip(&sectors) {
        arena[child].get_mut().target_position = child_target(position, sector, distance);
    }

    for child in children {
        animate_node(tree, child, base_distance, dt);
    }
}
