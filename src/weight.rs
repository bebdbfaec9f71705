use crate::error::{ConfigError, ConfigResult};

/// Weight for each child count bucket: 0 children, 1 child, ...
pub const DEFAULT_WEIGHT_TABLE: [f64; 4] = [1.0, 3.0, 3.1, 3.2];

/// Weight for child counts past the end of the table.
pub const DEFAULT_WEIGHT_LARGE: f64 = 3.6;

/// Maps a node's child count to the angular weight it claims from its parent.
///
/// Nodes with many children get more room on screen; nodes with few are packed
/// tighter. Every bucket up to the table length is explicit, so a lookup never
/// lands on an implicit zero.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable {
    table: Vec<f64>,
    large: f64,
}

impl WeightTable {
    /// Build a validated table.
    ///
    /// `declared` is the bucket count the table is supposed to cover. When it
    /// is given and differs from `values.len()` the table has a gap and is
    /// rejected.
    pub fn new(values: Vec<f64>, large: f64, declared: Option<usize>) -> ConfigResult<Self> {
        if values.is_empty() {
            return Err(ConfigError::EmptyWeightTable);
        }
        if let Some(declared) = declared {
            if declared != values.len() {
                return Err(ConfigError::WeightTableGap {
                    declared,
                    supplied: values.len(),
                });
            }
        }
        for (bucket, &value) in values.iter().enumerate() {
            if !value.is_finite() || value < 1.0 {
                return Err(ConfigError::InvalidWeight { bucket, value });
            }
        }
        if !large.is_finite() || large < 1.0 {
            return Err(ConfigError::InvalidWeight {
                bucket: values.len(),
                value: large,
            });
        }
        if let Some(&value) = values.iter().find(|&&v| v > large) {
            return Err(ConfigError::LargeWeightTooSmall { large, value });
        }

        Ok(Self {
            table: values,
            large,
        })
    }

    pub fn large(&self) -> f64 {
        self.large
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Weight for a node with `child_count` children whose own weights are
    /// `child_weights`.
    ///
    /// Any child at or above the large threshold boosts this node to
    /// `large + 1`, so ancestors of huge subtrees keep getting more space.
    pub fn weigh<I>(&self, child_count: usize, child_weights: I) -> f64
    where
        I: IntoIterator<Item = f64>,
    {
        let base = self.table.get(child_count).copied().unwrap_or(self.large);

        if child_weights.into_iter().any(|w| w >= self.large) {
            self.large + 1.0
        } else {
            base
        }
    }

    /// Weight of a node with no children.
    pub fn leaf(&self) -> f64 {
        self.table[0]
    }
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            table: DEFAULT_WEIGHT_TABLE.to_vec(),
            large: DEFAULT_WEIGHT_LARGE,
        }
    }
}
