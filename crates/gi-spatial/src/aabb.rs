//! Axis-aligned bounding boxes: bounding, ray tests, containment and splitting.

use nalgebra::{Point3, Vector3};

use crate::{Bounded, Ray};

/// Tolerance used by [`Aabb::contains_almost`] to absorb clipping error.
pub const CONTAINMENT_EPSILON: f32 = 1e-4;

/// Directions closer to zero than this on an axis are treated as parallel to it.
const PARALLEL_EPSILON: f32 = 1e-9;

/// A coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index of this axis (0, 1 or 2).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The axis for a component index, if it is in range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The next axis in `X -> Y -> Z -> X` order.
    #[inline]
    pub fn next(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::Z,
            Axis::Z => Axis::X,
        }
    }

    /// The two axes other than this one.
    #[inline]
    pub fn others(self) -> [Axis; 2] {
        [self.next(), self.next().next()]
    }
}

/// An axis-aligned bounding box with inclusive `min` and `max` corners.
///
/// A freshly reset box is "inside out" (`min = +inf`, `max = -inf`) so that
/// the first call to any `bound_*` method snaps it onto the geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::inside_out()
    }
}

impl Aabb {
    /// Creates a box from its corners. The caller keeps `min <= max`.
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    /// The empty sentinel: `min = +inf`, `max = -inf` on every axis.
    pub fn inside_out() -> Self {
        Self {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    /// The zero-volume box at the origin, returned for empty intersections.
    pub fn zero() -> Self {
        Self::new(Point3::origin(), Point3::origin())
    }

    /// Smallest box around a set of points; inside out when the set is empty.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Point3<f32>>,
    {
        let mut aabb = Self::inside_out();
        aabb.bound_points(points);
        aabb
    }

    /// Resets this box to the inside-out sentinel.
    pub fn reset_inside_out(&mut self) {
        *self = Self::inside_out();
    }

    /// Returns true while no geometry has been bounded yet.
    pub fn is_inside_out(&self) -> bool {
        (0..3).any(|i| self.min[i] > self.max[i])
    }

    /// Extends the box to cover a point. Never shrinks.
    pub fn bound_point(&mut self, point: Point3<f32>) {
        self.min = self.min.inf(&point);
        self.max = self.max.sup(&point);
    }

    /// Extends the box to cover every point in the sequence.
    pub fn bound_points<I>(&mut self, points: I)
    where
        I: IntoIterator<Item = Point3<f32>>,
    {
        for point in points {
            self.bound_point(point);
        }
    }

    /// Extends the box to cover another box. Inside-out boxes add nothing.
    pub fn bound_box(&mut self, other: &Aabb) {
        if other.is_inside_out() {
            return;
        }
        self.bound_point(other.min);
        self.bound_point(other.max);
    }

    /// Extends the box to cover an item's bounds.
    pub fn bound_item<T: Bounded + ?Sized>(&mut self, item: &T) {
        self.bound_box(&item.bounds());
    }

    /// Midpoint of the box.
    pub fn centroid(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Edge lengths along each axis.
    pub fn extents(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Volume of the box; zero for flat or inside-out boxes.
    pub fn volume(&self) -> f32 {
        if self.is_inside_out() {
            return 0.0;
        }
        let e = self.extents();
        e.x * e.y * e.z
    }

    /// True if the box is flat or inside out.
    pub fn has_no_volume(&self) -> bool {
        self.volume() <= 0.0
    }

    /// Axis along which the box is longest.
    pub fn largest_axis(&self) -> Axis {
        let e = self.extents();
        if e.x >= e.y && e.x >= e.z {
            Axis::X
        } else if e.y >= e.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    /// The eight corners, indexed by the same bit pattern as [`Aabb::split8`].
    pub fn corners(&self) -> [Point3<f32>; 8] {
        std::array::from_fn(|i| {
            Point3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            )
        })
    }

    /// Closed-interval overlap test on all three axes.
    pub fn intersects_box(&self, other: &Aabb) -> bool {
        (0..3).all(|i| self.min[i] <= other.max[i] && other.min[i] <= self.max[i])
    }

    /// Returns true if the ray touches the box anywhere in `[0, length]`.
    ///
    /// A ray that starts or ends inside the box always intersects it, whatever
    /// its direction. The end point is tested within [`CONTAINMENT_EPSILON`],
    /// since `start + direction * length` rounds off faces and corners.
    /// Otherwise the near face with the largest `t` is the entry face; the ray
    /// hits when that `t` is in range and the entry point lies on the face.
    pub fn intersects_ray(&self, ray: &Ray) -> bool {
        if self.contains_in(ray.start()) || self.contains_almost(ray.end()) {
            return true;
        }

        let start = ray.start();
        let direction = ray.direction();

        let mut entry: Option<(Axis, f32)> = None;
        for axis in Axis::ALL {
            let i = axis.index();
            let d = direction[i];
            if d.abs() < PARALLEL_EPSILON {
                continue;
            }
            // Cull the face the ray moves away from.
            let face = if d > 0.0 { self.min[i] } else { self.max[i] };
            let t = (face - start[i]) / d;
            if entry.is_none_or(|(_, best)| t > best) {
                entry = Some((axis, t));
            }
        }

        let Some((axis, t)) = entry else {
            return false;
        };
        if t < 0.0 || t > reach(ray) {
            return false;
        }

        self.on_face(axis, ray.at(t))
    }

    /// Finds where the ray meets the box.
    ///
    /// Returns the start point if the ray starts inside the box, otherwise the
    /// nearest point on a face reached within `[0, length]`.
    pub fn ray_hit_point(&self, ray: &Ray) -> Option<Point3<f32>> {
        let start = ray.start();
        if self.contains_in(start) {
            return Some(start);
        }

        let direction = ray.direction();
        let mut nearest: Option<(f32, Point3<f32>)> = None;

        for axis in Axis::ALL {
            let i = axis.index();
            let d = direction[i];
            if d.abs() < PARALLEL_EPSILON {
                continue;
            }
            for face in [self.min[i], self.max[i]] {
                let t = (face - start[i]) / d;
                if t < 0.0 || t > reach(ray) {
                    continue;
                }
                let mut hit = ray.at(t);
                hit[i] = face;
                if self.on_face(axis, hit) && nearest.is_none_or(|(best, _)| t < best) {
                    nearest = Some((t, hit));
                }
            }
        }

        match nearest {
            Some((_, hit)) => Some(hit),
            // Rounding can push an inside endpoint's entry off its face.
            None if self.contains_almost(ray.end()) => Some(ray.end()),
            None => None,
        }
    }

    /// True if `hit`, a point on a plane perpendicular to `axis`, lies within
    /// the box's extent on the other two axes.
    fn on_face(&self, axis: Axis, hit: Point3<f32>) -> bool {
        axis.others().into_iter().all(|other| {
            let o = other.index();
            self.min[o] - CONTAINMENT_EPSILON <= hit[o] && hit[o] <= self.max[o] + CONTAINMENT_EPSILON
        })
    }

    /// Per-axis overlap of two boxes, or [`Aabb::zero`] if they are disjoint
    /// on any axis.
    pub fn intersection_volume(&self, other: &Aabb) -> Aabb {
        let min = self.min.sup(&other.min);
        let max = self.max.inf(&other.max);
        if (0..3).any(|i| min[i] > max[i]) {
            return Aabb::zero();
        }
        Aabb::new(min, max)
    }

    /// Inclusive containment: `min <= p <= max`.
    pub fn contains_in(&self, point: Point3<f32>) -> bool {
        (0..3).all(|i| self.min[i] <= point[i] && point[i] <= self.max[i])
    }

    /// Strict containment: `min < p < max`.
    pub fn contains_ex(&self, point: Point3<f32>) -> bool {
        (0..3).all(|i| self.min[i] < point[i] && point[i] < self.max[i])
    }

    /// Containment widened by [`CONTAINMENT_EPSILON`] on every side.
    pub fn contains_almost(&self, point: Point3<f32>) -> bool {
        (0..3).all(|i| {
            self.min[i] - CONTAINMENT_EPSILON <= point[i]
                && point[i] <= self.max[i] + CONTAINMENT_EPSILON
        })
    }

    /// Inclusive containment of a whole box.
    pub fn contains_in_box(&self, other: &Aabb) -> bool {
        self.contains_in(other.min) && self.contains_in(other.max)
    }

    /// Strict containment of a whole box.
    pub fn contains_ex_box(&self, other: &Aabb) -> bool {
        self.contains_ex(other.min) && self.contains_ex(other.max)
    }

    /// Epsilon-tolerant containment of a whole box.
    pub fn contains_almost_box(&self, other: &Aabb) -> bool {
        self.contains_almost(other.min) && self.contains_almost(other.max)
    }

    /// Cuts the box in two at `value` along `axis`.
    ///
    /// Returns `[below, above]` sharing the cut plane. If `value` lies outside
    /// the box's extent on that axis, logs an error and returns the box itself
    /// as the only element.
    pub fn split2(&self, axis: Axis, value: f32) -> Vec<Aabb> {
        let i = axis.index();
        if !(self.min[i] <= value && value <= self.max[i]) {
            tracing::error!(
                ?axis,
                value,
                min = self.min[i],
                max = self.max[i],
                "split value outside box extent, box left unsplit"
            );
            return vec![*self];
        }

        let mut below = *self;
        below.max[i] = value;
        let mut above = *self;
        above.min[i] = value;
        vec![below, above]
    }

    /// The eight octants around the midpoint.
    ///
    /// Bit 0 of the index selects the upper x half, bit 1 the upper y half and
    /// bit 2 the upper z half.
    pub fn split8(&self) -> [Aabb; 8] {
        let c = self.centroid();
        std::array::from_fn(|i| {
            let (min_x, max_x) = if i & 1 == 0 { (self.min.x, c.x) } else { (c.x, self.max.x) };
            let (min_y, max_y) = if i & 2 == 0 { (self.min.y, c.y) } else { (c.y, self.max.y) };
            let (min_z, max_z) = if i & 4 == 0 { (self.min.z, c.z) } else { (c.z, self.max.z) };
            Aabb::new(
                Point3::new(min_x, min_y, min_z),
                Point3::new(max_x, max_y, max_z),
            )
        })
    }
}

/// Largest `t` accepted as on the ray, allowing for rounding in `length`.
fn reach(ray: &Ray) -> f32 {
    ray.length() + CONTAINMENT_EPSILON * ray.length().max(1.0)
}

impl Bounded for Aabb {
    fn bounds(&self) -> Aabb {
        *self
    }

    fn centroid(&self) -> Point3<f32> {
        Aabb::centroid(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0))
    }

    fn sample_points() -> Vec<Point3<f32>> {
        let coords = [-0.5, -CONTAINMENT_EPSILON * 0.5, 0.0, 0.25, 0.5, 1.0, 1.00005, 2.0];
        let mut points = Vec::new();
        for &x in &coords {
            for &y in &coords {
                for &z in &coords {
                    points.push(Point3::new(x, y, z));
                }
            }
        }
        points
    }

    #[test]
    fn reset_is_inside_out_until_bound() {
        let mut aabb = unit_box();
        aabb.reset_inside_out();
        assert!(aabb.is_inside_out());
        assert_eq!(aabb.min.x, f32::INFINITY);
        assert_eq!(aabb.max.z, f32::NEG_INFINITY);

        aabb.bound_point(Point3::new(1.0, 2.0, 3.0));
        assert!(!aabb.is_inside_out());
        assert_eq!(aabb.min, aabb.max);
    }

    #[test]
    fn bounding_never_shrinks() {
        let mut aabb = Aabb::from_points([Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0)]);
        let before = aabb;
        aabb.bound_point(Point3::new(0.0, 0.0, 0.0));
        assert_eq!(aabb, before);
        aabb.bound_box(&Aabb::inside_out());
        assert_eq!(aabb, before);
        aabb.bound_point(Point3::new(3.0, 0.0, 0.0));
        assert_eq!(aabb.max.x, 3.0);
        assert_eq!(aabb.min.x, -1.0);
    }

    #[test]
    fn box_overlap_is_closed() {
        let a = unit_box();
        let touching = Aabb::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        let apart = Aabb::new(Point3::new(1.1, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        assert!(a.intersects_box(&touching));
        assert!(touching.intersects_box(&a));
        assert!(!a.intersects_box(&apart));
    }

    #[test]
    fn containment_tolerance_ordering() {
        let aabb = unit_box();
        for p in sample_points() {
            if aabb.contains_ex(p) {
                assert!(aabb.contains_in(p), "{p:?}");
            }
            if aabb.contains_in(p) {
                assert!(aabb.contains_almost(p), "{p:?}");
            }
        }
        let boundary = Point3::new(0.0, 0.5, 0.5);
        assert!(!aabb.contains_ex(boundary));
        assert!(aabb.contains_in(boundary));
        let just_outside = Point3::new(1.00005, 0.5, 0.5);
        assert!(!aabb.contains_in(just_outside));
        assert!(aabb.contains_almost(just_outside));
    }

    #[test]
    fn ray_starting_inside_always_hits() {
        let aabb = unit_box();
        let inside = Point3::new(0.5, 0.5, 0.5);
        for direction in [
            Vector3::x(),
            -Vector3::x(),
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(-0.3, 0.2, -0.9),
        ] {
            let ray = Ray::new(inside, direction, 0.01);
            assert!(aabb.intersects_ray(&ray));
        }
    }

    #[test]
    fn ray_ending_inside_always_hits() {
        let aabb = unit_box();
        let ray = Ray::between(Point3::new(-3.0, 0.5, 0.5), Point3::new(0.5, 0.5, 0.5)).unwrap();
        assert!(aabb.intersects_ray(&ray));
        let corner = Ray::between(Point3::new(-1.0, -1.0, -1.0), Point3::new(0.0, 0.0, 0.0)).unwrap();
        assert!(aabb.intersects_ray(&corner));
        assert!(aabb.ray_hit_point(&corner).is_some());
    }

    #[test]
    fn segments_ending_on_faces_hit() {
        let aabb = Aabb::new(Point3::new(0.3, -0.7, 1.1), Point3::new(1.9, 0.6, 2.3));
        let starts = [
            Point3::new(-2.3, 3.1, -0.7),
            Point3::new(4.1, -2.9, 5.3),
            Point3::new(0.7, 7.7, -3.3),
        ];
        let mut ends = aabb.corners().to_vec();
        ends.extend([
            Point3::new(0.3, 0.1, 1.7),
            Point3::new(1.9, -0.3, 2.2),
            Point3::new(1.3, 0.6, 1.4),
            Point3::new(0.9, -0.7, 2.3),
        ]);
        for start in starts {
            for &end in &ends {
                let ray = Ray::between(start, end).unwrap();
                assert!(aabb.intersects_ray(&ray), "{start:?} -> {end:?}");
                let hit = aabb.ray_hit_point(&ray).unwrap();
                assert!(aabb.contains_almost(hit));
            }
        }
    }

    #[test]
    fn ray_crossing_box() {
        let aabb = unit_box();
        let through = Ray::new(Point3::new(-1.0, 0.5, 0.5), Vector3::x(), 5.0);
        assert!(aabb.intersects_ray(&through));

        let diagonal = Ray::new(Point3::new(-1.0, -0.5, 0.5), Vector3::new(1.0, 1.0, 0.0), 10.0);
        assert!(aabb.intersects_ray(&diagonal));
    }

    #[test]
    fn ray_missing_box() {
        let aabb = unit_box();
        let short = Ray::new(Point3::new(-1.0, 0.5, 0.5), Vector3::x(), 0.5);
        assert!(!aabb.intersects_ray(&short));

        let away = Ray::new(Point3::new(-1.0, 0.5, 0.5), -Vector3::x(), 5.0);
        assert!(!aabb.intersects_ray(&away));

        let beside = Ray::new(Point3::new(-1.0, 2.0, 0.5), Vector3::x(), 5.0);
        assert!(!aabb.intersects_ray(&beside));
    }

    #[test]
    fn hit_point_is_nearest_face() {
        let aabb = unit_box();
        let ray = Ray::new(Point3::new(-1.0, 0.25, 0.75), Vector3::x(), 5.0);
        let hit = aabb.ray_hit_point(&ray).unwrap();
        assert_eq!(hit, Point3::new(0.0, 0.25, 0.75));

        let back = Ray::new(Point3::new(0.5, 3.0, 0.5), -Vector3::y(), 5.0);
        let hit = aabb.ray_hit_point(&back).unwrap();
        assert_eq!(hit, Point3::new(0.5, 1.0, 0.5));
    }

    #[test]
    fn hit_point_agrees_with_boolean_test() {
        let aabb = unit_box();
        let rays = [
            Ray::new(Point3::new(-1.0, 0.5, 0.5), Vector3::x(), 5.0),
            Ray::new(Point3::new(-1.0, 0.5, 0.5), Vector3::x(), 0.5),
            Ray::new(Point3::new(2.0, 2.0, 2.0), Vector3::new(-1.0, -1.0, -1.0), 10.0),
            Ray::new(Point3::new(2.0, 2.0, 2.0), Vector3::new(1.0, -1.0, -1.0), 10.0),
            Ray::new(Point3::new(0.5, 0.5, 0.5), Vector3::z(), 0.1),
        ];
        for ray in rays {
            let hit = aabb.ray_hit_point(&ray);
            assert_eq!(hit.is_some(), aabb.intersects_ray(&ray), "{ray:?}");
            if let Some(p) = hit {
                assert!(aabb.contains_almost(p));
            }
        }
    }

    #[test]
    fn flat_box_has_no_volume_but_has_area() {
        use crate::Clip;

        let flat = Aabb::new(Point3::new(0.0, 2.0, 0.0), Point3::new(1.0, 2.0, 1.0));
        assert!(flat.has_no_volume());
        assert!(!flat.is_degenerate());
        assert_eq!(flat.area(), 2.0);
        assert!(Aabb::inside_out().has_no_volume());
        assert!(Aabb::inside_out().is_degenerate());
    }

    #[test]
    fn intersection_volume_overlap_and_miss() {
        let a = unit_box();
        let b = Aabb::new(Point3::new(0.5, 0.5, 0.5), Point3::new(2.0, 2.0, 2.0));
        let overlap = a.intersection_volume(&b);
        assert_eq!(overlap, Aabb::new(Point3::new(0.5, 0.5, 0.5), Point3::new(1.0, 1.0, 1.0)));

        let far = Aabb::new(Point3::new(0.5, 5.0, 0.5), Point3::new(2.0, 6.0, 2.0));
        let miss = a.intersection_volume(&far);
        assert_eq!(miss, Aabb::zero());
        assert_eq!(miss.volume(), 0.0);
    }

    #[test]
    fn split2_in_range() {
        let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 2.0, 1.0));
        let halves = aabb.split2(Axis::X, 1.0);
        assert_eq!(halves.len(), 2);
        assert_eq!(halves[0].max.x, 1.0);
        assert_eq!(halves[1].min.x, 1.0);
        let total = halves[0].volume() + halves[1].volume();
        assert!((total - aabb.volume()).abs() < 1e-5);
    }

    #[test]
    fn split2_out_of_range_returns_original() {
        let aabb = unit_box();
        let result = aabb.split2(Axis::Y, 1.5);
        assert_eq!(result, vec![aabb]);
        let result = aabb.split2(Axis::Z, -0.1);
        assert_eq!(result, vec![aabb]);
    }

    #[test]
    fn split8_tiles_parent() {
        let aabb = Aabb::new(Point3::new(-1.0, 0.0, 2.0), Point3::new(3.0, 1.0, 4.0));
        let octants = aabb.split8();
        let total: f32 = octants.iter().map(Aabb::volume).sum();
        assert!((total - aabb.volume()).abs() < 1e-4);

        let c = aabb.centroid();
        for p in sample_points() {
            let p = Point3::new(-1.0 + p.x * 4.0, p.y, 2.0 + p.z * 2.0);
            let on_cut = (0..3).any(|i| p[i] == c[i]);
            if aabb.contains_ex(p) && !on_cut {
                let owners = octants.iter().filter(|o| o.contains_ex(p)).count();
                assert_eq!(owners, 1, "{p:?}");
            }
        }
    }

    #[test]
    fn split8_octant_bits() {
        let octants = unit_box().split8();
        assert_eq!(octants[0].min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(octants[1].min, Point3::new(0.5, 0.0, 0.0));
        assert_eq!(octants[2].min, Point3::new(0.0, 0.5, 0.0));
        assert_eq!(octants[4].min, Point3::new(0.0, 0.0, 0.5));
        assert_eq!(octants[7].max, Point3::new(1.0, 1.0, 1.0));
        assert_eq!(unit_box().corners()[5], Point3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn largest_axis_and_axis_cycle() {
        let aabb = Aabb::new(Point3::origin(), Point3::new(1.0, 3.0, 2.0));
        assert_eq!(aabb.largest_axis(), Axis::Y);
        assert_eq!(Axis::Z.next(), Axis::X);
        assert_eq!(Axis::X.others(), [Axis::Y, Axis::Z]);
        assert_eq!(Axis::from_index(3), None);
    }
}
