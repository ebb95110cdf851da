//! One-time recursive subdivision for both policies.

use nalgebra::{Point3, Vector3};

use super::{NodeId, Partition, SpatialTree};
use crate::clip::{remove_coincident, split_all, try_put_away, Containment};
use crate::{Axis, Bounded, Clip, Plane3D, PlaneClassify, PlaneSide, Policy};

impl<T> SpatialTree<T>
where
    T: Bounded + PlaneClassify + Clip,
{
    /// Subdivides the tree according to its policy.
    ///
    /// Runs once; later calls are logged and ignored. Items never vanish or
    /// duplicate: each ends up in exactly one node, either a child that fully
    /// contains it or, failing that, the nearest enclosing node. With
    /// splitting enabled, clipped items are replaced by their fragments.
    #[tracing::instrument(skip_all, name = "spatial_tree::split", fields(policy = ?self.config.policy))]
    pub fn split(&mut self) {
        if self.split {
            tracing::warn!("tree already split; ignoring");
            return;
        }
        self.split = true;
        self.split_node(NodeId::ROOT, Axis::X);
        tracing::debug!(
            nodes = self.node_count(),
            items = self.item_count(),
            depth = self.max_depth_reached(),
            "tree split"
        );
    }

    fn split_node(&mut self, id: NodeId, cycle_axis: Axis) {
        let node = &self.nodes[id.0];
        if node.items.len() < self.config.max_items || node.depth >= self.config.max_depth {
            return;
        }

        match self.config.policy {
            Policy::Octree => self.split_octree(id),
            Policy::KdMeanVariance => {
                let (axis, value) = mean_variance_split(&self.nodes[id.0].items);
                self.split_kd(id, axis, value, cycle_axis);
            }
            Policy::KdMidpointCycle => {
                let value = self.nodes[id.0].bounds.centroid()[cycle_axis.index()];
                self.split_kd(id, cycle_axis, value, cycle_axis.next());
            }
        }
    }

    fn split_octree(&mut self, id: NodeId) {
        let bounds = self.nodes[id.0].bounds;
        let depth = self.nodes[id.0].depth;
        let items = std::mem::take(&mut self.nodes[id.0].items);
        let candidates = bounds.split8();

        let (mut placed, mut floaters) = try_put_away(items, &candidates, Containment::Inclusive);

        if self.config.splitting_enabled && !floaters.is_empty() {
            let center = bounds.centroid();
            let mut fragments = std::mem::take(&mut floaters);
            for axis in Axis::ALL {
                let plane = Plane3D::axis_aligned(axis, center[axis.index()]);
                floaters.extend(remove_coincident(&plane, &mut fragments));
                fragments = split_all(&plane, fragments);
            }
            // Fragments that still fit nowhere stay here; they are not clipped again.
            let (placed_fragments, leftover) =
                try_put_away(fragments, &candidates, Containment::Almost);
            placed.extend(placed_fragments);
            floaters.extend(leftover);
        }

        let mut buckets: [Vec<T>; 8] = Default::default();
        for (octant, item) in placed {
            buckets[octant].push(item);
        }

        // All eight octants become nodes, empty ones included.
        let children: [NodeId; 8] = std::array::from_fn(|octant| {
            self.push_node(candidates[octant], depth + 1, std::mem::take(&mut buckets[octant]))
        });

        tracing::trace!(
            node = id.0,
            depth,
            floaters = floaters.len(),
            "octree node split"
        );

        let node = &mut self.nodes[id.0];
        node.items = floaters;
        node.partition = Partition::Octants(children);

        for child in children {
            self.split_node(child, Axis::X);
        }
    }

    fn split_kd(&mut self, id: NodeId, axis: Axis, value: f32, child_axis: Axis) {
        let bounds = self.nodes[id.0].bounds;
        let depth = self.nodes[id.0].depth;
        let items = std::mem::take(&mut self.nodes[id.0].items);
        let plane = Plane3D::axis_aligned(axis, value);

        let mut behind = Vec::new();
        let mut infront = Vec::new();
        let mut floaters = Vec::new();

        for item in items {
            match item.plane_side(&plane) {
                PlaneSide::Behind => behind.push(item),
                PlaneSide::InFront => infront.push(item),
                PlaneSide::Straddling if self.config.splitting_enabled => {
                    match item.clip(&plane) {
                        Some(fragments) => {
                            // Still straddling after one pass means it stays here.
                            for fragment in fragments {
                                match fragment.plane_side(&plane) {
                                    PlaneSide::Behind => behind.push(fragment),
                                    PlaneSide::InFront => infront.push(fragment),
                                    PlaneSide::Straddling => floaters.push(fragment),
                                }
                            }
                        }
                        None => floaters.push(item),
                    }
                }
                PlaneSide::Straddling => floaters.push(item),
            }
        }

        let (behind_bounds, infront_bounds) = match bounds.split2(axis, value).as_slice() {
            [below, above] => (*below, *above),
            _ => (bounds, bounds),
        };

        let behind = (!behind.is_empty()).then(|| self.push_node(behind_bounds, depth + 1, behind));
        let infront =
            (!infront.is_empty()).then(|| self.push_node(infront_bounds, depth + 1, infront));

        tracing::trace!(
            node = id.0,
            depth,
            ?axis,
            value,
            floaters = floaters.len(),
            "kd node split"
        );

        let node = &mut self.nodes[id.0];
        node.items = floaters;
        node.partition = Partition::HalfSpaces {
            axis,
            value,
            behind,
            infront,
        };

        for child in [behind, infront].into_iter().flatten() {
            self.split_node(child, child_axis);
        }
    }
}

/// Picks the axis with the largest centroid variance and splits at the mean.
///
/// Uses population statistics. Ties prefer X, then Y.
fn mean_variance_split<T: Bounded>(items: &[T]) -> (Axis, f32) {
    let centroids: Vec<Point3<f32>> = items.iter().map(Bounded::centroid).collect();
    let count = centroids.len().max(1) as f32;

    let mean = centroids
        .iter()
        .fold(Vector3::zeros(), |acc, c| acc + c.coords)
        / count;
    let variance = centroids.iter().fold(Vector3::zeros(), |acc, c| {
        let delta = c.coords - mean;
        acc + delta.component_mul(&delta)
    }) / count;

    let axis = if variance.x >= variance.y && variance.x >= variance.z {
        Axis::X
    } else if variance.y >= variance.z {
        Axis::Y
    } else {
        Axis::Z
    };
    (axis, mean[axis.index()])
}
