//! Spatial trees over bounded scene items.
//!
//! A tree is filled with [`add`](SpatialTree::add), subdivided once with
//! [`split`](SpatialTree::split), and then queried for the nodes a ray
//! crosses or a point lies in. Queries return *candidate nodes*; callers
//! narrow those down to items and run exact intersection themselves.
//!
//! # Example
//!
//! ```
//! use gi_spatial::{Ray, TreeConfig, Triangle, ViewIndex};
//! use nalgebra::{Point3, Vector3};
//!
//! let scene = vec![
//!     Triangle::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)),
//!     Triangle::new(Point3::new(4.0, 4.0, 4.0), Point3::new(5.0, 4.0, 4.0), Point3::new(4.0, 5.0, 4.0)),
//! ];
//!
//! let mut index = ViewIndex::new(TreeConfig::octree().with_max_items(1)).unwrap();
//! for triangle in &scene {
//!     index.add(triangle);
//! }
//! index.split();
//!
//! let ray = Ray::new(Point3::new(0.2, 0.2, -1.0), Vector3::z(), 2.0);
//! let candidates: Vec<_> = index
//!     .query_ray(&ray)
//!     .into_iter()
//!     .flat_map(|node| index.items(node).iter())
//!     .collect();
//! assert_eq!(candidates.len(), 1);
//! ```
//!
//! # Architecture
//!
//! - [`SpatialTree`]: the shared arena tree, generic over the stored item
//! - [`Node`] / [`NodeId`]: arena nodes and the handles that link them
//! - [`ViewIndex`]: borrows scene items, never frees them
//! - [`OwningIndex`]: owns its items (e.g. clipped fragments) and drops them

mod build;
mod index;
mod node;
mod query;

use crate::{Aabb, Bounded, ConfigError, TreeConfig};

pub use index::{OwningIndex, ViewIndex};
pub use node::{Node, NodeId, Partition};
pub use query::TreeStats;

/// An octree or kd-tree stored as a flat node arena.
///
/// The root is always [`NodeId::ROOT`]. Children are created only during
/// [`split`](SpatialTree::split) and referenced by handle.
///
/// Building (`add`, `split`) needs `&mut self`; every query takes `&self`, so
/// a finished tree can be shared between threads whenever `T: Sync`.
#[derive(Debug, Clone)]
pub struct SpatialTree<T> {
    config: TreeConfig,
    nodes: Vec<Node<T>>,
    split: bool,
}

impl<T> SpatialTree<T> {
    /// Creates an empty tree with an inside-out root.
    pub fn new(config: TreeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            nodes: vec![Node::new(Aabb::inside_out(), 0, Vec::new())],
            split: false,
        })
    }

    #[inline]
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// True once [`split`](SpatialTree::split) has run.
    #[inline]
    pub fn is_split(&self) -> bool {
        self.split
    }

    #[inline]
    pub fn root(&self) -> &Node<T> {
        &self.nodes[NodeId::ROOT.0]
    }

    /// The node behind a handle.
    ///
    /// # Panics
    /// Panics if the handle came from a different tree.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id.0]
    }

    /// Items stored directly in a node.
    #[inline]
    pub fn items(&self, id: NodeId) -> &[T] {
        &self.nodes[id.0].items
    }

    /// Drops every item in every node and returns how many were dropped.
    /// Nodes and bounds are kept, so the tree structure survives.
    pub(crate) fn drop_items(&mut self) -> usize {
        self.nodes
            .iter_mut()
            .map(|node| {
                let count = node.items.len();
                node.items.clear();
                count
            })
            .sum()
    }

    fn push_node(&mut self, bounds: Aabb, depth: usize, items: Vec<T>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(bounds, depth, items));
        id
    }
}

impl<T: Bounded> SpatialTree<T> {
    /// Grows the root bound to cover `item` and stores it at the root.
    ///
    /// Items are meant to be added before [`split`](SpatialTree::split).
    /// Adding afterwards is logged and the item stays at the root as a
    /// floater, so it is still found by queries.
    pub fn add(&mut self, item: T) {
        if self.split {
            tracing::warn!("item added after split; stored at the root");
        }
        let root = &mut self.nodes[NodeId::ROOT.0];
        root.bounds.bound_item(&item);
        root.items.push(item);
    }
}
