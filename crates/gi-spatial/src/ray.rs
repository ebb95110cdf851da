//! Finite rays used by the node queries.

use nalgebra::{Point3, Unit, Vector3};

/// A ray segment: `start + t * direction` for `t` in `[0, length]`.
///
/// The direction is always unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    start: Point3<f32>,
    direction: Unit<Vector3<f32>>,
    length: f32,
}

impl Ray {
    /// Creates a ray from a start point, a direction (normalized here) and a length.
    ///
    /// # Panics
    /// Panics if the direction has zero length.
    pub fn new(start: Point3<f32>, direction: Vector3<f32>, length: f32) -> Self {
        let norm = direction.norm();
        assert!(norm > f32::EPSILON, "Ray direction cannot be zero");
        Self {
            start,
            direction: Unit::new_unchecked(direction / norm),
            length,
        }
    }

    /// Creates the ray running from `start` to `end`.
    ///
    /// Returns `None` if both points coincide.
    pub fn between(start: Point3<f32>, end: Point3<f32>) -> Option<Self> {
        let delta = end - start;
        let length = delta.norm();
        if length <= f32::EPSILON {
            return None;
        }
        Some(Self {
            start,
            direction: Unit::new_unchecked(delta / length),
            length,
        })
    }

    #[inline]
    pub fn start(&self) -> Point3<f32> {
        self.start
    }

    #[inline]
    pub fn direction(&self) -> Vector3<f32> {
        self.direction.into_inner()
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.length
    }

    /// Point at parameter `t` along the ray.
    #[inline]
    pub fn at(&self, t: f32) -> Point3<f32> {
        self.start + self.direction.into_inner() * t
    }

    /// The far end of the ray, `at(length)`.
    #[inline]
    pub fn end(&self) -> Point3<f32> {
        self.at(self.length)
    }
}
