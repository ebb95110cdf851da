//! Build configuration for spatial trees.

use crate::ConfigError;

/// Deepest tree any configuration may request.
pub const MAX_SUPPORTED_DEPTH: usize = 32;

/// How a node divides its space when it splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Policy {
    /// Eight octants around the midpoint of the node bounds.
    #[default]
    Octree,
    /// Two half-spaces at the centroid mean, along the axis of largest
    /// centroid variance. Recomputed at every node.
    KdMeanVariance,
    /// Two half-spaces at the midpoint of the node bounds, cycling the axis
    /// `X -> Y -> Z` with depth.
    KdMidpointCycle,
}

impl Policy {
    /// True for the two-way policies.
    pub fn is_kd(self) -> bool {
        !matches!(self, Policy::Octree)
    }
}

/// Thresholds and policy for one tree.
///
/// Every tree carries its own configuration, so differently tuned trees can
/// coexist (e.g. a coarse one for radiosity form factors and a fine one for
/// ambient occlusion).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TreeConfig {
    /// A node holding fewer items than this stays a leaf.
    pub max_items: usize,
    /// Nodes are never created deeper than this (the root is depth 0).
    pub max_depth: usize,
    /// Whether items crossing a splitting plane are clipped into fragments.
    pub splitting_enabled: bool,
    /// Subdivision policy, fixed for the life of the tree.
    pub policy: Policy,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_items: 8,
            max_depth: 8,
            splitting_enabled: false,
            policy: Policy::Octree,
        }
    }
}

impl TreeConfig {
    /// Default octree configuration.
    pub fn octree() -> Self {
        Self::default()
    }

    /// Default kd-tree configuration (mean/variance split).
    pub fn kd() -> Self {
        Self {
            policy: Policy::KdMeanVariance,
            ..Self::default()
        }
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_splitting(mut self, splitting_enabled: bool) -> Self {
        self.splitting_enabled = splitting_enabled;
        self
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Checks the thresholds are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_items == 0 {
            return Err(ConfigError::ZeroMaxItems);
        }
        if self.max_depth > MAX_SUPPORTED_DEPTH {
            return Err(ConfigError::DepthTooLarge {
                max_depth: self.max_depth,
                limit: MAX_SUPPORTED_DEPTH,
            });
        }
        Ok(())
    }
}
