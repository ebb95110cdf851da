//! Scene triangles and the clipped fragments synthesized from them.

use nalgebra::{Point3, Vector3};

use crate::clip::{clip_polygon, fan_triangulate};
use crate::{Aabb, Bounded, Clip, Plane3D, PlaneClassify, PlaneSide};

/// Back-reference from a triangle to the mesh it was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshRef {
    /// Index of the mesh in the caller's scene.
    pub mesh: usize,
    /// Vertex indices of the triangle within that mesh.
    pub indices: [u32; 3],
}

/// A triangle in 3D space, defined by three vertices, with its plane cached.
///
/// Triangles live in caller-owned storage (a mesh or scene); spatial indices
/// only ever borrow them.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    vertices: [Point3<f32>; 3],
    normal: Vector3<f32>,
    d: f32,
    mesh: Option<MeshRef>,
}

impl Triangle {
    /// Creates a new triangle from three points.
    ///
    /// The winding order determines the normal direction via the right-hand rule:
    /// normal = (b - a) × (c - a). Degenerate triangles get a zero normal.
    pub fn new(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Self {
        let normal = (b - a)
            .cross(&(c - a))
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros);
        let d = -normal.dot(&a.coords);
        Self {
            vertices: [a, b, c],
            normal,
            d,
            mesh: None,
        }
    }

    /// Attaches the mesh back-reference.
    pub fn with_mesh(mut self, mesh: MeshRef) -> Self {
        self.mesh = Some(mesh);
        self
    }

    /// Returns the three vertices of the triangle.
    #[inline]
    pub fn vertices(&self) -> &[Point3<f32>; 3] {
        &self.vertices
    }

    /// Unit normal, or zero for a degenerate triangle.
    #[inline]
    pub fn normal(&self) -> Vector3<f32> {
        self.normal
    }

    /// The `d` term of the supporting plane `normal · p + d = 0`.
    #[inline]
    pub fn d(&self) -> f32 {
        self.d
    }

    #[inline]
    pub fn mesh(&self) -> Option<MeshRef> {
        self.mesh
    }

}

impl Bounded for Triangle {
    fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices)
    }

    fn centroid(&self) -> Point3<f32> {
        centroid(&self.vertices)
    }
}

impl PlaneClassify for Triangle {
    fn plane_side(&self, plane: &Plane3D) -> PlaneSide {
        plane.classify_points(self.vertices)
    }

    fn is_coincident(&self, plane: &Plane3D) -> bool {
        coincident(&self.vertices, plane)
    }
}

impl Clip for Triangle {
    fn area(&self) -> f32 {
        area(&self.vertices)
    }
}

/// A clipped copy of a scene triangle.
///
/// Holds its own (possibly fragment) vertices and a lookup-only reference to
/// the triangle it came from. Fragments are created by clipping while a tree
/// is split and are owned by the index that stores them.
#[derive(Debug, Clone, PartialEq)]
pub struct PhantomTriangle<'a> {
    original: &'a Triangle,
    vertices: [Point3<f32>; 3],
}

impl<'a> PhantomTriangle<'a> {
    /// An unclipped phantom covering the whole original triangle.
    pub fn new(original: &'a Triangle) -> Self {
        Self {
            original,
            vertices: *original.vertices(),
        }
    }

    /// A fragment of `original` with its own vertices.
    pub fn fragment(original: &'a Triangle, vertices: [Point3<f32>; 3]) -> Self {
        Self { original, vertices }
    }

    /// The scene triangle this fragment was cut from.
    #[inline]
    pub fn original(&self) -> &'a Triangle {
        self.original
    }

    #[inline]
    pub fn vertices(&self) -> &[Point3<f32>; 3] {
        &self.vertices
    }
}

impl Bounded for PhantomTriangle<'_> {
    fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices)
    }

    fn centroid(&self) -> Point3<f32> {
        centroid(&self.vertices)
    }
}

impl PlaneClassify for PhantomTriangle<'_> {
    fn plane_side(&self, plane: &Plane3D) -> PlaneSide {
        plane.classify_points(self.vertices)
    }

    fn is_coincident(&self, plane: &Plane3D) -> bool {
        coincident(&self.vertices, plane)
    }
}

impl Clip for PhantomTriangle<'_> {
    fn area(&self) -> f32 {
        area(&self.vertices)
    }

    fn clip(&self, plane: &Plane3D) -> Option<Vec<Self>> {
        if self.plane_side(plane) != PlaneSide::Straddling || self.is_coincident(plane) {
            return Some(vec![self.clone()]);
        }
        let (front, back) = clip_polygon(&self.vertices, plane);
        let fragments: Vec<Self> = front
            .into_iter()
            .chain(back)
            .flat_map(|polygon| fan_triangulate(&polygon))
            .filter(|vertices| area(vertices) > 0.0)
            .map(|vertices| Self::fragment(self.original, vertices))
            .collect();
        // A zero-area straddler leaves nothing to keep; it stays whole instead.
        if fragments.is_empty() {
            return None;
        }
        Some(fragments)
    }
}

fn centroid(vertices: &[Point3<f32>; 3]) -> Point3<f32> {
    let [a, b, c] = vertices;
    Point3::from((a.coords + b.coords + c.coords) / 3.0)
}

fn area(vertices: &[Point3<f32>; 3]) -> f32 {
    let [a, b, c] = vertices;
    (b - a).cross(&(c - a)).norm() * 0.5
}

fn coincident(vertices: &[Point3<f32>; 3], plane: &Plane3D) -> bool {
    vertices
        .iter()
        .all(|v| plane.classify_point(*v) == PlaneSide::Straddling)
}
