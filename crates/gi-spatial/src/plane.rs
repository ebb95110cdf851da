//! Splitting planes and point classification.

use nalgebra::{Point3, Vector3};

use crate::Axis;

/// Default epsilon for plane classification.
/// Points within this distance of the plane are considered straddling it.
pub const PLANE_EPSILON: f32 = 1e-5;

/// Which side of a plane a point or an item lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneSide {
    /// Negative side of the normal.
    Behind,
    /// On the plane (within epsilon) or, for items, crossing it.
    Straddling,
    /// Positive side of the normal.
    InFront,
}

/// A plane in 3D space, represented as `normal · point = offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane3D {
    normal: Vector3<f32>,
    offset: f32,
}

impl Plane3D {
    /// Creates the axis-aligned plane `p[axis] = value`, facing the positive axis.
    pub fn axis_aligned(axis: Axis, value: f32) -> Self {
        let mut normal = Vector3::zeros();
        normal[axis.index()] = 1.0;
        Self {
            normal,
            offset: value,
        }
    }

    /// Returns the unit normal vector of the plane.
    #[inline]
    pub fn normal(&self) -> Vector3<f32> {
        self.normal
    }

    /// Returns the signed distance from the origin to the plane along the normal.
    #[inline]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Computes the signed distance from a point to the plane.
    #[inline]
    pub fn signed_distance(&self, point: Point3<f32>) -> f32 {
        self.normal.dot(&point.coords) - self.offset
    }

    /// Classifies which side of the plane a point lies on.
    /// Uses the default `PLANE_EPSILON` tolerance.
    #[inline]
    pub fn classify_point(&self, point: Point3<f32>) -> PlaneSide {
        self.classify_point_with_epsilon(point, PLANE_EPSILON)
    }

    /// Classifies which side of the plane a point lies on, with a custom epsilon.
    pub fn classify_point_with_epsilon(&self, point: Point3<f32>, epsilon: f32) -> PlaneSide {
        let dist = self.signed_distance(point);
        if dist > epsilon {
            PlaneSide::InFront
        } else if dist < -epsilon {
            PlaneSide::Behind
        } else {
            PlaneSide::Straddling
        }
    }

    /// Classifies a set of vertices.
    ///
    /// Vertices inside the epsilon band agree with either side, so a set is
    /// `InFront` or `Behind` when no vertex is on the opposite side and at
    /// least one is clearly on that side. Sets with vertices on both sides, or
    /// with every vertex on the plane, are `Straddling`.
    pub fn classify_points<I>(&self, points: I) -> PlaneSide
    where
        I: IntoIterator<Item = Point3<f32>>,
    {
        let mut front = 0;
        let mut back = 0;
        for point in points {
            match self.classify_point(point) {
                PlaneSide::InFront => front += 1,
                PlaneSide::Behind => back += 1,
                PlaneSide::Straddling => {}
            }
        }

        match (front, back) {
            (0, 0) => PlaneSide::Straddling,
            (_, 0) => PlaneSide::InFront,
            (0, _) => PlaneSide::Behind,
            _ => PlaneSide::Straddling,
        }
    }

    /// Computes the intersection of a line segment with the plane.
    ///
    /// Returns `Some((t, point))` with `t` in `[0, 1]`, or `None` if the segment
    /// is parallel to the plane or does not reach it.
    pub fn intersect_segment(
        &self,
        start: Point3<f32>,
        end: Point3<f32>,
    ) -> Option<(f32, Point3<f32>)> {
        let direction = end - start;
        let denom = self.normal.dot(&direction);

        if denom.abs() < f32::EPSILON {
            return None;
        }

        let t = (self.offset - self.normal.dot(&start.coords)) / denom;
        if !(0.0..=1.0).contains(&t) {
            return None;
        }

        let mut point = start + direction * t;
        // Snap onto axis-aligned planes so fragments share the cut exactly.
        if let Some(axis) = self.aligned_axis() {
            point[axis.index()] = self.offset;
        }
        Some((t, point))
    }

    /// The axis this plane is perpendicular to, if it is axis-aligned.
    pub fn aligned_axis(&self) -> Option<Axis> {
        Axis::ALL
            .into_iter()
            .find(|axis| (self.normal[axis.index()] - 1.0).abs() <= f32::EPSILON)
    }
}
