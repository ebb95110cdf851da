//! Error types for gi-spatial.

use thiserror::Error;

/// Errors reported when a tree configuration cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A node must be allowed to hold at least one item.
    #[error("max_items must be at least 1")]
    ZeroMaxItems,

    /// Recursion depth is bounded to keep stack usage predictable.
    #[error("max_depth {max_depth} exceeds the supported limit of {limit}")]
    DepthTooLarge {
        /// Requested depth.
        max_depth: usize,
        /// Largest accepted depth.
        limit: usize,
    },
}
