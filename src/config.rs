use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::weight::{WeightTable, DEFAULT_WEIGHT_LARGE, DEFAULT_WEIGHT_TABLE};

pub const DEFAULT_DEPTH_LIMIT: usize = 5;
pub const DEFAULT_LABEL_DEPTH: usize = 1;
pub const BASE_CHILD_DISTANCE: f32 = 380.0;
pub const DEFAULT_WINDOW_WIDTH: f32 = 1200.0;
pub const DEFAULT_WINDOW_HEIGHT: f32 = 1200.0;

/// Settings loaded from an optional TOML file. Every key has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub depth_limit: usize,
    pub base_child_distance: f32,
    /// Labels are drawn for nodes at this depth or shallower.
    pub label_depth: usize,
    pub weights: WeightConfig,
    pub window: WindowConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeightConfig {
    pub table: Vec<f64>,
    /// Declared bucket count; the table must supply exactly this many values.
    pub buckets: Option<usize>,
    pub large: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            depth_limit: DEFAULT_DEPTH_LIMIT,
            base_child_distance: BASE_CHILD_DISTANCE,
            label_depth: DEFAULT_LABEL_DEPTH,
            weights: WeightConfig::default(),
            window: WindowConfig::default(),
        }
    }
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            table: DEFAULT_WEIGHT_TABLE.to_vec(),
            buckets: None,
            large: DEFAULT_WEIGHT_LARGE,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str, origin: &Path) -> ConfigResult<Self> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Load `path` if given, otherwise use defaults. The result is validated.
    pub fn resolve(path: Option<&Path>) -> ConfigResult<Self> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.depth_limit == 0 {
            return Err(ConfigError::ZeroDepthLimit);
        }
        if !self.base_child_distance.is_finite() || self.base_child_distance <= 0.0 {
            return Err(ConfigError::InvalidChildDistance(self.base_child_distance));
        }
        self.weight_table().map(|_| ())
    }

    pub fn weight_table(&self) -> ConfigResult<WeightTable> {
        WeightTable::new(
            self.weights.table.clone(),
            self.weights.large,
            self.weights.buckets,
        )
    }
}
