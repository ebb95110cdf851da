//! The two ownership regimes a scene index can run under.
//!
//! [`ViewIndex`] borrows items that live elsewhere (a mesh, a scene) and can
//! never free them. [`OwningIndex`] holds its items by value, typically
//! fragments synthesized while splitting, and drops them exactly once.

use nalgebra::Point3;

use super::{NodeId, SpatialTree, TreeStats};
use crate::{Bounded, Clip, ConfigError, PlaneClassify, Ray, TreeConfig};

/// A spatial index over borrowed scene items.
///
/// References are never clipped, so a straddling item stays in the deepest
/// node that fully contains it, whatever `splitting_enabled` says.
#[derive(Debug, Clone)]
pub struct ViewIndex<'a, S> {
    tree: SpatialTree<&'a S>,
}

impl<'a, S> ViewIndex<'a, S>
where
    S: Bounded + PlaneClassify + Clip,
{
    pub fn new(config: TreeConfig) -> Result<Self, ConfigError> {
        if config.splitting_enabled {
            tracing::warn!("borrowed items cannot be clipped; splitting has no effect");
        }
        Ok(Self {
            tree: SpatialTree::new(config)?,
        })
    }

    pub fn add(&mut self, item: &'a S) {
        self.tree.add(item);
    }

    pub fn split(&mut self) {
        self.tree.split();
    }

    /// Candidate nodes for a ray; see [`SpatialTree::nodes_along_ray`].
    pub fn query_ray(&self, ray: &Ray) -> Vec<NodeId> {
        self.tree.nodes_along_ray(ray)
    }

    /// Candidate nodes for a point; see [`SpatialTree::nodes_containing`].
    pub fn query_point(&self, point: Point3<f32>) -> Vec<NodeId> {
        self.tree.nodes_containing(point)
    }

    /// Items stored directly in a node.
    pub fn items(&self, id: NodeId) -> &[&'a S] {
        self.tree.items(id)
    }

    pub fn all_items(&self) -> Vec<&'a S> {
        self.tree.all_items().into_iter().copied().collect()
    }

    pub fn node_count(&self) -> usize {
        self.tree.node_count()
    }

    pub fn item_count(&self) -> usize {
        self.tree.item_count()
    }

    pub fn stats(&self) -> TreeStats {
        self.tree.stats()
    }

    #[inline]
    pub fn tree(&self) -> &SpatialTree<&'a S> {
        &self.tree
    }
}

/// A spatial index that owns its items.
///
/// Items are dropped by [`delete_owned_items`](OwningIndex::delete_owned_items)
/// or, failing that, when the index itself is dropped.
#[derive(Debug, Clone)]
pub struct OwningIndex<T> {
    tree: SpatialTree<T>,
}

impl<T> OwningIndex<T>
where
    T: Bounded + PlaneClassify + Clip,
{
    pub fn new(config: TreeConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            tree: SpatialTree::new(config)?,
        })
    }

    pub fn add(&mut self, item: T) {
        self.tree.add(item);
    }

    pub fn split(&mut self) {
        self.tree.split();
    }

    /// Candidate nodes for a ray; see [`SpatialTree::nodes_along_ray`].
    pub fn query_ray(&self, ray: &Ray) -> Vec<NodeId> {
        self.tree.nodes_along_ray(ray)
    }

    /// Candidate nodes for a point; see [`SpatialTree::nodes_containing`].
    pub fn query_point(&self, point: Point3<f32>) -> Vec<NodeId> {
        self.tree.nodes_containing(point)
    }

    /// Items stored directly in a node.
    pub fn items(&self, id: NodeId) -> &[T] {
        self.tree.items(id)
    }

    pub fn all_items(&self) -> Vec<&T> {
        self.tree.all_items()
    }

    pub fn node_count(&self) -> usize {
        self.tree.node_count()
    }

    pub fn item_count(&self) -> usize {
        self.tree.item_count()
    }

    pub fn stats(&self) -> TreeStats {
        self.tree.stats()
    }

    #[inline]
    pub fn tree(&self) -> &SpatialTree<T> {
        &self.tree
    }

    /// Drops every owned item and returns how many there were.
    ///
    /// The node structure is kept; every node is empty afterwards.
    pub fn delete_owned_items(&mut self) -> usize {
        let dropped = self.tree.drop_items();
        tracing::debug!(dropped, "owned items deleted");
        dropped
    }
}
