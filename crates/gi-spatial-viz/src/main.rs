use gi_spatial::{ConfigError, OwningIndex, PhantomTriangle, Policy, TreeConfig, Triangle};
use gi_spatial_viz::{NodeNavigator, OrbitCamera, draw_triangle, generate_scene, triangle_color};
use macroquad::prelude::*;

fn next_policy(policy: Policy) -> Policy {
    match policy {
        Policy::Octree => Policy::KdMeanVariance,
        Policy::KdMeanVariance => Policy::KdMidpointCycle,
        Policy::KdMidpointCycle => Policy::Octree,
    }
}

fn build(
    scene: &[Triangle],
    config: TreeConfig,
) -> Result<OwningIndex<PhantomTriangle<'_>>, ConfigError> {
    println!("Building {:?} tree (splitting {})...", config.policy, config.splitting_enabled);
    let mut index = OwningIndex::new(config)?;
    for triangle in scene {
        index.add(PhantomTriangle::new(triangle));
    }
    index.split();
    println!("{:?}", index.stats());
    Ok(index)
}

#[macroquad::main("Spatial Tree Explorer")]
async fn main() {
    let scene = generate_scene();
    println!("Created {} triangles (3 cubes + floor)", scene.len());

    let mut config = TreeConfig::octree()
        .with_max_items(6)
        .with_max_depth(5)
        .with_splitting(true);
    let mut index = match build(&scene, config) {
        Ok(index) => index,
        Err(err) => {
            eprintln!("invalid tree config: {err}");
            return;
        }
    };

    let mut camera = OrbitCamera::new(5.0, 0.4, 0.4).with_zoom(0.5, 2.0, 20.0);
    let mut navigator = NodeNavigator::new();

    loop {
        camera.update();
        navigator.update(index.tree());

        let mut rebuild = false;
        if is_key_pressed(KeyCode::Tab) {
            config = config.with_policy(next_policy(config.policy));
            rebuild = true;
        }
        if is_key_pressed(KeyCode::S) {
            config = config.with_splitting(!config.splitting_enabled);
            rebuild = true;
        }
        if rebuild {
            match build(&scene, config) {
                Ok(rebuilt) => {
                    index.delete_owned_items();
                    index = rebuilt;
                    navigator.go_root();
                }
                Err(err) => eprintln!("invalid tree config: {err}"),
            }
        }

        clear_background(Color::from_rgba(20, 20, 30, 255));
        set_camera(&camera.to_camera3d());

        navigator.render(index.tree(), |fragment| {
            draw_triangle(fragment.vertices(), triangle_color(fragment.vertices()));
        });

        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0), RED);
        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(0.0, 1.0, 0.0), GREEN);
        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(0.0, 0.0, 1.0), BLUE);

        set_default_camera();

        let stats = index.stats();
        draw_text(
            &format!(
                "{:?} | splitting {} | {} items in {} nodes",
                config.policy, config.splitting_enabled, stats.items, stats.nodes
            ),
            10.0,
            25.0,
            20.0,
            WHITE,
        );
        draw_text(
            &format!(
                "Depth {} | {} leaves | {} floaters | navigator depth {}",
                stats.max_depth,
                stats.leaves,
                stats.floaters,
                navigator.depth()
            ),
            10.0,
            45.0,
            18.0,
            GRAY,
        );

        navigator.draw_ui(index.tree(), 70.0);

        draw_text("[Tab] policy | [S] splitting", 10.0, 155.0, 16.0, DARKGRAY);
        draw_text("Drag mouse to rotate, scroll to zoom", 10.0, 175.0, 16.0, DARKGRAY);
        draw_text(&format!("FPS: {}", get_fps()), 10.0, 195.0, 16.0, DARKGRAY);

        next_frame().await
    }
}
