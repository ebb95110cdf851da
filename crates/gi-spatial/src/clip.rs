//! Clipping items against splitting planes and placing them into child boxes.

use nalgebra::Point3;

use crate::{Aabb, Bounded, Clip, Plane3D, PlaneClassify, PlaneSide};

/// How strictly an item must fit inside a candidate box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    /// Closed-interval containment, for items that were never clipped.
    Inclusive,
    /// Containment within [`CONTAINMENT_EPSILON`](crate::CONTAINMENT_EPSILON),
    /// for fragments whose cut vertices carry rounding error.
    Almost,
}

impl Containment {
    fn fits<T: Bounded>(self, item: &T, aabb: &Aabb) -> bool {
        match self {
            Containment::Inclusive => item.contained_in(aabb),
            Containment::Almost => item.almost_contained_in(aabb),
        }
    }
}

/// Splits a convex polygon into the parts in front of and behind a plane.
///
/// Uses a variant of the Sutherland-Hodgman algorithm: walks the polygon
/// edges and builds two vertex lists, adding intersection points when edges
/// cross the plane. Vertices on the plane go to both lists. A side with fewer
/// than three vertices is `None`.
pub fn clip_polygon(
    vertices: &[Point3<f32>],
    plane: &Plane3D,
) -> (Option<Vec<Point3<f32>>>, Option<Vec<Point3<f32>>>) {
    let n = vertices.len();
    let mut front_verts = Vec::with_capacity(n + 1);
    let mut back_verts = Vec::with_capacity(n + 1);

    let sides: Vec<PlaneSide> = vertices
        .iter()
        .map(|v| plane.classify_point(*v))
        .collect();

    for i in 0..n {
        let current = vertices[i];
        let current_side = sides[i];
        let next_idx = (i + 1) % n;
        let next = vertices[next_idx];
        let next_side = sides[next_idx];

        match current_side {
            PlaneSide::InFront => front_verts.push(current),
            PlaneSide::Behind => back_verts.push(current),
            PlaneSide::Straddling => {
                front_verts.push(current);
                back_verts.push(current);
            }
        }

        let crosses = matches!(
            (current_side, next_side),
            (PlaneSide::InFront, PlaneSide::Behind) | (PlaneSide::Behind, PlaneSide::InFront)
        );

        if crosses {
            if let Some((_, intersection)) = plane.intersect_segment(current, next) {
                front_verts.push(intersection);
                back_verts.push(intersection);
            }
        }
    }

    let front = (front_verts.len() >= 3).then_some(front_verts);
    let back = (back_verts.len() >= 3).then_some(back_verts);
    (front, back)
}

/// Fan-triangulates a convex polygon around its first vertex.
pub fn fan_triangulate(polygon: &[Point3<f32>]) -> Vec<[Point3<f32>; 3]> {
    if polygon.len() < 3 {
        return Vec::new();
    }
    (1..polygon.len() - 1)
        .map(|i| [polygon[0], polygon[i], polygon[i + 1]])
        .collect()
}

/// Pulls every item lying in the plane out of `items`.
///
/// Coincident items cannot be cut by this plane; the caller keeps them,
/// unmodified, in the node that currently owns them.
pub fn remove_coincident<T: PlaneClassify>(plane: &Plane3D, items: &mut Vec<T>) -> Vec<T> {
    let (coincident, rest): (Vec<T>, Vec<T>) = std::mem::take(items)
        .into_iter()
        .partition(|item| item.is_coincident(plane));
    *items = rest;
    coincident
}

/// Replaces every item straddling the plane with its fragments.
///
/// Items on one side pass through unmodified, as do straddling items whose
/// type cannot be clipped.
pub fn split_all<T: PlaneClassify + Clip>(plane: &Plane3D, items: Vec<T>) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if item.plane_side(plane) != PlaneSide::Straddling {
            out.push(item);
            continue;
        }
        match item.clip(plane) {
            Some(fragments) => out.extend(fragments),
            None => {
                tracing::trace!("straddling item cannot be clipped, kept whole");
                out.push(item);
            }
        }
    }
    out
}

/// Assigns each item to the first candidate box that contains it.
///
/// Returns `(placed, leftover)`: placed items paired with their candidate
/// index, and the items no candidate could take, in input order.
pub fn try_put_away<T: Bounded>(
    items: Vec<T>,
    candidates: &[Aabb],
    containment: Containment,
) -> (Vec<(usize, T)>, Vec<T>) {
    let mut placed = Vec::with_capacity(items.len());
    let mut leftover = Vec::new();
    for item in items {
        match candidates
            .iter()
            .position(|candidate| containment.fits(&item, candidate))
        {
            Some(index) => placed.push((index, item)),
            None => leftover.push(item),
        }
    }
    (placed, leftover)
}
