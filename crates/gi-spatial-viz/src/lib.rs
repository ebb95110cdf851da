//! Shared visualization utilities for the spatial index viewers.

use std::hash::{Hash, Hasher};

use gi_spatial::{Aabb, Ray, Triangle};
use macroquad::models::{Mesh, Vertex, draw_mesh};
use macroquad::prelude::*;
use nalgebra::{Point3, Rotation3, Vector3};

pub mod navigator;
pub use navigator::NodeNavigator;

/// Converts a nalgebra point into a macroquad vector.
#[inline]
pub fn to_vec3(p: Point3<f32>) -> Vec3 {
    vec3(p.x, p.y, p.z)
}

/// Generates a deterministic color from a triangle's vertices using hashing.
/// Fragments of the same cut get distinct but stable colors across frames.
pub fn triangle_color(vertices: &[Point3<f32>; 3]) -> Color {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    for v in vertices {
        v.x.to_bits().hash(&mut hasher);
        v.y.to_bits().hash(&mut hasher);
        v.z.to_bits().hash(&mut hasher);
    }
    let hash = hasher.finish();

    let r = (((hash >> 16) & 0xFF) as u8).max(40);
    let g = (((hash >> 8) & 0xFF) as u8).max(40);
    let b = ((hash & 0xFF) as u8).max(40);

    Color::from_rgba(r, g, b, 255)
}

/// Draws a filled triangle as a one-triangle mesh.
pub fn draw_triangle(vertices: &[Point3<f32>; 3], color: Color) {
    let mesh = Mesh {
        vertices: vertices
            .iter()
            .map(|p| Vertex::new2(to_vec3(*p), vec2(0.0, 0.0), color))
            .collect(),
        indices: vec![0, 1, 2],
        texture: None,
    };
    draw_mesh(&mesh);
}

/// Draws the twelve edges of a box. Inside-out boxes are skipped.
pub fn draw_aabb(aabb: &Aabb, color: Color) {
    if aabb.is_inside_out() {
        return;
    }
    draw_cube_wires(to_vec3(aabb.centroid()), to_vec3(Point3::from(aabb.extents())), color);
}

/// Draws a ray segment with a marker at its start.
pub fn draw_ray(ray: &Ray, color: Color) {
    let start = to_vec3(ray.start());
    draw_line_3d(start, to_vec3(ray.end()), color);
    draw_sphere(start, 0.03, None, color);
}

/// Generates the 12 triangles of an axis-aligned cube.
pub fn generate_cube_triangles(center: Point3<f32>, size: f32) -> Vec<Triangle> {
    generate_rotated_cube(center, size, &Rotation3::identity())
}

/// Generates the 12 triangles of a rotated cube.
pub fn generate_rotated_cube(
    center: Point3<f32>,
    size: f32,
    rotation: &Rotation3<f32>,
) -> Vec<Triangle> {
    let half = size / 2.0;

    let unit_corners = [
        Vector3::new(-half, -half, -half),
        Vector3::new(half, -half, -half),
        Vector3::new(half, half, -half),
        Vector3::new(-half, half, -half),
        Vector3::new(-half, -half, half),
        Vector3::new(half, -half, half),
        Vector3::new(half, half, half),
        Vector3::new(-half, half, half),
    ];

    let corners: Vec<Point3<f32>> = unit_corners
        .iter()
        .map(|v| center + rotation * v)
        .collect();

    // Counter-clockwise winding viewed from outside.
    let faces: [[usize; 4]; 6] = [
        [4, 5, 6, 7], // front (+Z)
        [1, 0, 3, 2], // back (-Z)
        [0, 4, 7, 3], // left (-X)
        [5, 1, 2, 6], // right (+X)
        [7, 6, 2, 3], // top (+Y)
        [0, 1, 5, 4], // bottom (-Y)
    ];

    faces
        .iter()
        .flat_map(|&[a, b, c, d]| {
            [
                Triangle::new(corners[a], corners[b], corners[c]),
                Triangle::new(corners[a], corners[c], corners[d]),
            ]
        })
        .collect()
}

/// Two cubes, one of them rotated, standing on a floor quad.
pub fn generate_scene() -> Vec<Triangle> {
    let mut scene = Vec::new();

    let rotation = Rotation3::from_euler_angles(0.3, 0.4, 0.25);
    scene.extend(generate_rotated_cube(Point3::new(-1.0, 0.0, 0.0), 0.8, &rotation));
    scene.extend(generate_cube_triangles(Point3::new(1.0, 0.0, 0.0), 0.8));
    scene.extend(generate_cube_triangles(Point3::new(0.6, 0.9, -0.7), 0.4));

    let floor = [
        Point3::new(-1.5, -1.0, -1.5),
        Point3::new(1.5, -1.0, -1.5),
        Point3::new(1.5, -1.0, 1.5),
        Point3::new(-1.5, -1.0, 1.5),
    ];
    scene.push(Triangle::new(floor[0], floor[2], floor[1]));
    scene.push(Triangle::new(floor[0], floor[3], floor[2]));

    scene
}

/// Simple orbit camera for 3D scene navigation.
pub struct OrbitCamera {
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub target: Vec3,
    /// Multiplier for scroll wheel zoom
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl OrbitCamera {
    pub fn new(distance: f32, yaw: f32, pitch: f32) -> Self {
        Self {
            distance,
            yaw,
            pitch,
            target: vec3(0.0, 0.0, 0.0),
            zoom_speed: 5.0,
            min_distance: 10.0,
            max_distance: 200.0,
        }
    }

    /// Sets the zoom configuration (speed and distance limits).
    pub fn with_zoom(mut self, speed: f32, min: f32, max: f32) -> Self {
        self.zoom_speed = speed;
        self.min_distance = min;
        self.max_distance = max;
        self
    }

    /// Updates camera state from mouse drag and scroll.
    pub fn update(&mut self) {
        if is_mouse_button_down(MouseButton::Left) {
            let delta = mouse_delta_position();
            self.yaw -= delta.x * 2.0;
            self.pitch -= delta.y * 2.0;
        }
        self.pitch = self.pitch.clamp(-1.5, 1.5);

        let scroll = mouse_wheel().1;
        self.distance -= scroll * self.zoom_speed;
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
    }

    /// Returns the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + vec3(x, y, z)
    }

    pub fn to_camera3d(&self) -> Camera3D {
        Camera3D {
            position: self.position(),
            up: vec3(0.0, 1.0, 0.0),
            target: self.target,
            ..Default::default()
        }
    }
}
