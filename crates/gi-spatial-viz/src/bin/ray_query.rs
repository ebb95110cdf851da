use gi_spatial::{Policy, Ray, TreeConfig, Triangle, ViewIndex};
use gi_spatial_viz::{OrbitCamera, draw_aabb, draw_ray, draw_triangle, generate_scene, triangle_color};
use macroquad::prelude::*;
use nalgebra::{Point3, Vector3};

const RAY_LENGTH: f32 = 6.0;
const TURN_SPEED: f32 = 0.02;

/// A ray swung around a fixed start point by two angles.
struct RayAim {
    start: Point3<f32>,
    yaw: f32,
    pitch: f32,
}

impl RayAim {
    fn update(&mut self) {
        if is_key_down(KeyCode::J) {
            self.yaw += TURN_SPEED;
        }
        if is_key_down(KeyCode::L) {
            self.yaw -= TURN_SPEED;
        }
        if is_key_down(KeyCode::I) {
            self.pitch += TURN_SPEED;
        }
        if is_key_down(KeyCode::K) {
            self.pitch -= TURN_SPEED;
        }
        self.pitch = self.pitch.clamp(-1.5, 1.5);
    }

    fn ray(&self) -> Ray {
        let direction = Vector3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        );
        Ray::new(self.start, direction, RAY_LENGTH)
    }
}

fn build(scene: &[Triangle], policy: Policy) -> Option<ViewIndex<'_, Triangle>> {
    let config = TreeConfig::default()
        .with_policy(policy)
        .with_max_items(4)
        .with_max_depth(6);
    let mut index = match ViewIndex::new(config) {
        Ok(index) => index,
        Err(err) => {
            eprintln!("invalid tree config: {err}");
            return None;
        }
    };
    for triangle in scene {
        index.add(triangle);
    }
    index.split();
    println!("{policy:?}: {:?}", index.stats());
    Some(index)
}

#[macroquad::main("Spatial Ray Query")]
async fn main() {
    let scene = generate_scene();
    let policies = [Policy::Octree, Policy::KdMeanVariance, Policy::KdMidpointCycle];
    let mut current = 0;
    let Some(mut index) = build(&scene, policies[current]) else {
        return;
    };

    let mut camera = OrbitCamera::new(6.0, 0.6, 0.5).with_zoom(0.5, 2.0, 20.0);
    let mut aim = RayAim {
        start: Point3::new(-2.5, 0.2, 2.5),
        yaw: 2.4,
        pitch: -0.1,
    };

    loop {
        camera.update();
        aim.update();

        if is_key_pressed(KeyCode::Tab) {
            current = (current + 1) % policies.len();
            if let Some(rebuilt) = build(&scene, policies[current]) {
                index = rebuilt;
            }
        }

        let ray = aim.ray();
        let candidates = index.query_ray(&ray);
        let candidate_items: Vec<&Triangle> = candidates
            .iter()
            .flat_map(|&node| index.items(node).iter().copied())
            .collect();

        clear_background(Color::from_rgba(20, 20, 30, 255));
        set_camera(&camera.to_camera3d());

        for triangle in &scene {
            let hit = candidate_items.iter().any(|item| std::ptr::eq(*item, triangle));
            let color = if hit {
                triangle_color(triangle.vertices())
            } else {
                Color::from_rgba(60, 60, 70, 255)
            };
            draw_triangle(triangle.vertices(), color);
        }
        for &node in &candidates {
            draw_aabb(index.tree().node(node).bounds(), YELLOW);
        }
        draw_ray(&ray, RED);

        set_default_camera();

        draw_text(
            &format!("{:?} | {} nodes in tree", policies[current], index.node_count()),
            10.0,
            25.0,
            20.0,
            WHITE,
        );
        draw_text(
            &format!(
                "{} candidate nodes, {} of {} triangles",
                candidates.len(),
                candidate_items.len(),
                index.item_count()
            ),
            10.0,
            45.0,
            18.0,
            YELLOW,
        );
        draw_text("[J/L/I/K] aim ray | [Tab] policy", 10.0, 70.0, 16.0, DARKGRAY);
        draw_text("Drag mouse to rotate, scroll to zoom", 10.0, 90.0, 16.0, DARKGRAY);

        next_frame().await
    }
}
