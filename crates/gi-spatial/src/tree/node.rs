//! Tree nodes stored in a flat arena.

use crate::{Aabb, Axis, Plane3D};

/// Handle to a node in a [`SpatialTree`](super::SpatialTree) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root node, present in every tree.
    pub const ROOT: NodeId = NodeId(0);

    /// Position of the node in the arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// How a node divides its space.
#[derive(Debug, Clone, PartialEq)]
pub enum Partition {
    /// Not split: every item sits in the node itself.
    Leaf,
    /// Split into eight octants, in [`Aabb::split8`] order.
    Octants([NodeId; 8]),
    /// Split by the plane `p[axis] = value`.
    HalfSpaces {
        axis: Axis,
        value: f32,
        behind: Option<NodeId>,
        infront: Option<NodeId>,
    },
}

/// A node in a spatial tree.
///
/// Before it splits, a node holds all of its items. After splitting it holds
/// only the floaters: items that no child could take. The transition happens
/// at most once.
#[derive(Debug, Clone)]
pub struct Node<T> {
    pub(crate) bounds: Aabb,
    pub(crate) depth: usize,
    pub(crate) items: Vec<T>,
    pub(crate) partition: Partition,
}

impl<T> Node<T> {
    pub(crate) fn new(bounds: Aabb, depth: usize, items: Vec<T>) -> Self {
        Self {
            bounds,
            depth,
            items,
            partition: Partition::Leaf,
        }
    }

    /// The space this node covers.
    #[inline]
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Distance from the root (the root is 0).
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Items stored directly in this node.
    #[inline]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[inline]
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// True once the node has gone through its split.
    #[inline]
    pub fn is_split(&self) -> bool {
        !matches!(self.partition, Partition::Leaf)
    }

    /// True if the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children().next().is_none()
    }

    /// Existing children, in octant order or `behind` then `infront`.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        let octants: &[NodeId] = match &self.partition {
            Partition::Octants(children) => children,
            _ => &[],
        };
        let halves = match self.partition {
            Partition::HalfSpaces { behind, infront, .. } => [behind, infront],
            _ => [None, None],
        };
        octants.iter().copied().map(Some).chain(halves).flatten()
    }

    /// The kd splitting plane, for half-space nodes.
    pub fn split_plane(&self) -> Option<Plane3D> {
        match self.partition {
            Partition::HalfSpaces { axis, value, .. } => Some(Plane3D::axis_aligned(axis, value)),
            _ => None,
        }
    }
}
