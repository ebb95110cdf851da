//! Octree and kd-tree spatial index over scene triangles.
//!
//! Trees are built once and then queried for the nodes a ray crosses or a
//! point lies in. Scene triangles can be indexed by reference through
//! [`ViewIndex`], or clipped into [`PhantomTriangle`] fragments that an
//! [`OwningIndex`] holds by value.

mod aabb;
pub mod clip;
mod config;
mod error;
mod item;
mod plane;
mod ray;
mod tree;
mod triangle;

pub use aabb::{Aabb, Axis, CONTAINMENT_EPSILON};
pub use config::{Policy, TreeConfig, MAX_SUPPORTED_DEPTH};
pub use error::ConfigError;
pub use item::{Bounded, Clip, PlaneClassify};
pub use plane::{Plane3D, PlaneSide, PLANE_EPSILON};
pub use ray::Ray;
pub use tree::{Node, NodeId, OwningIndex, Partition, SpatialTree, TreeStats, ViewIndex};
pub use triangle::{MeshRef, PhantomTriangle, Triangle};
