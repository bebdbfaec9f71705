use glam::Vec2;
use std::f64::consts::TAU;

/// Guards the weight total against division by zero for childless nodes.
pub const WEIGHT_EPSILON: f64 = 0.0001;

/// Seconds of animation clock per radian of precession.
pub const PRECESSION_PERIOD: f64 = 50.0;

/// Angular sector claimed by one child around its parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sector {
    /// Angle in radians where the sector begins
    pub start: f64,
    /// Angular width in radians
    pub share: f64,
}

impl Sector {
    /// Direction the child is placed along: the middle of its sector.
    pub fn center(&self) -> f64 {
        self.start + self.share / 2.0
    }
}

/// Starting angle of a node's child arrangement; rotates slowly with time.
pub fn base_angle(clock: f64) -> f64 {
    clock / PRECESSION_PERIOD
}

/// Split the full circle between children in proportion to their weights.
///
/// Sectors are laid out in input order starting at `start_angle`, each one
/// beginning where the previous ended, so the shares sum to 2π.
pub fn partition_sectors(weights: &[f64], start_angle: f64) -> Vec<Sector> {
    let total: f64 = weights.iter().sum::<f64>().max(WEIGHT_EPSILON);
    let angle_per_weight = TAU / total;

    let mut running = start_angle;
    weights
        .iter()
        .map(|&weight| {
            let share = angle_per_weight * weight;
            let sector = Sector {
                start: running,
                share,
            };
            running += share;
            sector
        })
        .collect()
}

/// Distance from a node at `depth` to its children.
///
/// Falls off with the square of depth so deep subtrees stay compact.
pub fn child_distance(base_distance: f32, depth: usize) -> f32 {
    let scaler = ((depth + 1) * (depth + 1)) as f32;
    base_distance / scaler
}

pub fn unit_vector(angle: f64) -> Vec2 {
    Vec2::new(angle.cos() as f32, angle.sin() as f32)
}

/// Target position of a child placed in `sector` around `parent_position`.
pub fn child_target(parent_position: Vec2, sector: &Sector, distance: f32) -> Vec2 {
    parent_position + unit_vector(sector.center()) * distance
}
