//! Read-only traversal of a built tree.

use nalgebra::Point3;

use super::{Node, NodeId, Partition, SpatialTree};
use crate::{Axis, Ray, PLANE_EPSILON};

/// Summary counts for a built tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Nodes in the arena, root included.
    pub nodes: usize,
    /// Items stored across all nodes.
    pub items: usize,
    /// Nodes without children.
    pub leaves: usize,
    /// Depth of the deepest node.
    pub max_depth: usize,
    /// Items held by nodes that went through a split.
    pub floaters: usize,
}

impl<T> SpatialTree<T> {
    /// Nodes whose space the ray passes through, parents before children.
    ///
    /// Every node on the path is reported, internal ones included, since they
    /// may hold floaters. An empty tree returns nothing.
    pub fn nodes_along_ray(&self, ray: &Ray) -> Vec<NodeId> {
        let root = self.root();
        if root.bounds.is_inside_out() || !root.bounds.intersects_ray(ray) {
            return Vec::new();
        }
        self.collect_from(NodeId::ROOT, |node| match node.partition {
            Partition::Leaf => Vec::new(),
            Partition::Octants(ref octants) => octants
                .iter()
                .copied()
                .filter(|&child| self.node(child).bounds.intersects_ray(ray))
                .collect(),
            Partition::HalfSpaces {
                axis,
                value,
                behind,
                infront,
            } => {
                let (reaches_behind, reaches_infront) = ray_sides(ray, axis, value);
                [(behind, reaches_behind), (infront, reaches_infront)]
                    .into_iter()
                    .filter_map(|(child, visit)| child.filter(|_| visit))
                    .collect()
            }
        })
    }

    /// Nodes whose space contains the point, parents before children.
    ///
    /// Octree boxes are tested with a small tolerance. A point exactly on a
    /// kd plane reaches both sides.
    pub fn nodes_containing(&self, point: Point3<f32>) -> Vec<NodeId> {
        if !self.root().bounds.contains_almost(point) {
            return Vec::new();
        }
        self.collect_from(NodeId::ROOT, |node| match node.partition {
            Partition::Leaf => Vec::new(),
            Partition::Octants(ref octants) => octants
                .iter()
                .copied()
                .filter(|&child| self.node(child).bounds.contains_almost(point))
                .collect(),
            Partition::HalfSpaces {
                axis,
                value,
                behind,
                infront,
            } => {
                let coord = point[axis.index()];
                let mut out = Vec::with_capacity(2);
                if coord <= value {
                    out.extend(behind);
                }
                if coord >= value {
                    out.extend(infront);
                }
                out
            }
        })
    }

    /// Children of a node, in octant order or `behind` then `infront`.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id).children().collect()
    }

    /// Every node in the tree, parents before children.
    pub fn all_nodes(&self) -> Vec<NodeId> {
        self.subtree_nodes(NodeId::ROOT)
    }

    /// The node and all its descendants, parents before children.
    pub fn subtree_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.collect_from(id, |node| node.children().collect())
    }

    /// Every item in the tree, in the same order as [`all_nodes`](SpatialTree::all_nodes).
    pub fn all_items(&self) -> Vec<&T> {
        self.subtree_items(NodeId::ROOT)
    }

    /// Items stored in the node or any of its descendants.
    pub fn subtree_items(&self, id: NodeId) -> Vec<&T> {
        self.subtree_nodes(id)
            .into_iter()
            .flat_map(|node| self.items(node))
            .collect()
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn item_count(&self) -> usize {
        self.nodes.iter().map(|node| node.items.len()).sum()
    }

    /// Depth of the deepest node; 0 for an unsplit tree.
    pub fn max_depth_reached(&self) -> usize {
        self.nodes.iter().map(Node::depth).max().unwrap_or(0)
    }

    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats {
            nodes: self.nodes.len(),
            max_depth: self.max_depth_reached(),
            ..TreeStats::default()
        };
        for node in &self.nodes {
            stats.items += node.items.len();
            if node.is_leaf() {
                stats.leaves += 1;
            }
            if node.is_split() {
                stats.floaters += node.items.len();
            }
        }
        stats
    }

    /// Depth-first walk from `start`, descending into whatever `next` returns.
    fn collect_from<F>(&self, start: NodeId, mut next: F) -> Vec<NodeId>
    where
        F: FnMut(&Node<T>) -> Vec<NodeId>,
    {
        let mut visited = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            visited.push(id);
            stack.extend(next(self.node(id)).into_iter().rev());
        }
        visited
    }
}

/// Which sides of the plane `p[axis] = value` a ray reaches.
///
/// Returns `(behind, infront)`. Items within [`PLANE_EPSILON`] of the plane
/// can be stored on either side, so each side is widened by that band.
fn ray_sides(ray: &Ray, axis: Axis, value: f32) -> (bool, bool) {
    let i = axis.index();
    let (a, b) = (ray.start()[i], ray.end()[i]);
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    (low <= value + PLANE_EPSILON, high >= value - PLANE_EPSILON)
}
