//! Capabilities an item needs to be stored in a spatial tree.
//!
//! The tree algorithms are written once against these traits:
//!
//! - [`Bounded`]: box and centroid, used for bounding, placement and kd statistics
//! - [`PlaneClassify`]: which side of a splitting plane the item is on
//! - [`Clip`]: area, degeneracy and (optionally) fragmenting across a plane
//!
//! References implement all three by forwarding, except that a reference can
//! never be clipped: fragments need an owner, and a borrowed item has none.

use nalgebra::Point3;

use crate::{Aabb, Plane3D, PlaneSide};

/// Geometry with an axis-aligned bound.
pub trait Bounded {
    /// Tight box around the item.
    fn bounds(&self) -> Aabb;

    /// Representative center, used for kd-tree split statistics.
    fn centroid(&self) -> Point3<f32>;

    /// True if `aabb` fully contains this item (inclusive).
    fn contained_in(&self, aabb: &Aabb) -> bool {
        aabb.contains_in_box(&self.bounds())
    }

    /// True if `aabb`, widened by the containment tolerance, contains this item.
    fn almost_contained_in(&self, aabb: &Aabb) -> bool {
        aabb.contains_almost_box(&self.bounds())
    }
}

/// Geometry that can be classified against a plane.
pub trait PlaneClassify {
    /// `InFront`/`Behind` only when every vertex agrees; otherwise `Straddling`.
    fn plane_side(&self, plane: &Plane3D) -> PlaneSide;

    /// True if no vertex lies unambiguously on either side, i.e. the item lies
    /// in the plane.
    fn is_coincident(&self, plane: &Plane3D) -> bool;
}

/// Geometry that can be measured and, optionally, cut by a plane.
pub trait Clip: Sized {
    /// Surface area (zero for volumes that have no meaningful area).
    fn area(&self) -> f32;

    /// True if the item has collapsed to a line or point.
    fn is_degenerate(&self) -> bool {
        self.area() <= f32::EPSILON
    }

    /// Cuts the item along the plane.
    ///
    /// Returns pieces whose union covers the item exactly and whose new
    /// vertices lie on the plane, or `None` if this type cannot be fragmented.
    fn clip(&self, _plane: &Plane3D) -> Option<Vec<Self>> {
        None
    }
}

impl<S: Bounded + ?Sized> Bounded for &S {
    fn bounds(&self) -> Aabb {
        (**self).bounds()
    }

    fn centroid(&self) -> Point3<f32> {
        (**self).centroid()
    }
}

impl<S: PlaneClassify + ?Sized> PlaneClassify for &S {
    fn plane_side(&self, plane: &Plane3D) -> PlaneSide {
        (**self).plane_side(plane)
    }

    fn is_coincident(&self, plane: &Plane3D) -> bool {
        (**self).is_coincident(plane)
    }
}

impl<S: Clip> Clip for &S {
    fn area(&self) -> f32 {
        (**self).area()
    }

    fn is_degenerate(&self) -> bool {
        (**self).is_degenerate()
    }
}

impl PlaneClassify for Aabb {
    fn plane_side(&self, plane: &Plane3D) -> PlaneSide {
        plane.classify_points(self.corners())
    }

    fn is_coincident(&self, plane: &Plane3D) -> bool {
        self.corners()
            .into_iter()
            .all(|corner| plane.classify_point(corner) == PlaneSide::Straddling)
    }
}

impl Clip for Aabb {
    /// Surface area of the box.
    fn area(&self) -> f32 {
        if self.is_inside_out() {
            return 0.0;
        }
        let e = self.extents();
        2.0 * (e.x * e.y + e.y * e.z + e.z * e.x)
    }
}
