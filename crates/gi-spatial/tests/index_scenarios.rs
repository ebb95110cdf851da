use std::cell::Cell;
use std::rc::Rc;

use gi_spatial::clip::{clip_polygon, fan_triangulate};
use gi_spatial::{
    Aabb, Bounded, Clip, NodeId, OwningIndex, PhantomTriangle, Plane3D, PlaneClassify, PlaneSide,
    Policy, Ray, TreeConfig, Triangle, ViewIndex,
};
use nalgebra::{Point3, Vector3};

const POLICIES: [Policy; 3] = [Policy::Octree, Policy::KdMeanVariance, Policy::KdMidpointCycle];

fn make_triangle(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> Triangle {
    Triangle::new(Point3::from(a), Point3::from(b), Point3::from(c))
}

/// The 12 triangles of the unit cube, two per face.
fn unit_cube() -> Vec<Triangle> {
    let corner = |i: usize| {
        Point3::new(
            (i & 1) as f32,
            ((i >> 1) & 1) as f32,
            ((i >> 2) & 1) as f32,
        )
    };
    let faces = [
        [0, 2, 6, 4],
        [1, 5, 7, 3],
        [0, 4, 5, 1],
        [2, 3, 7, 6],
        [0, 1, 3, 2],
        [4, 6, 7, 5],
    ];
    faces
        .iter()
        .flat_map(|&[a, b, c, d]| {
            [
                Triangle::new(corner(a), corner(b), corner(c)),
                Triangle::new(corner(a), corner(c), corner(d)),
            ]
        })
        .collect()
}

/// Small horizontal triangles on a 4×4×4 lattice plus two large ones that
/// cross many cells.
fn lattice() -> Vec<Triangle> {
    let mut scene = Vec::new();
    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                let o = Point3::new(i as f32, j as f32, k as f32) * 2.0;
                scene.push(Triangle::new(
                    o,
                    o + Vector3::new(0.5, 0.0, 0.0),
                    o + Vector3::new(0.0, 0.5, 0.0),
                ));
            }
        }
    }
    scene.push(make_triangle([0.0, 0.0, 3.1], [7.0, 0.0, 3.1], [0.0, 7.0, 3.1]));
    scene.push(make_triangle([1.3, 0.0, 0.0], [1.3, 7.0, 0.0], [1.3, 0.0, 7.0]));
    scene
}

fn config(policy: Policy) -> TreeConfig {
    TreeConfig::default()
        .with_policy(policy)
        .with_max_items(4)
        .with_max_depth(5)
}

#[test]
fn unit_cube_view_index() {
    let cube = unit_cube();
    assert_eq!(cube.len(), 12);
    assert!(cube.iter().all(|tri| (tri.area() - 0.5).abs() < 1e-6));

    let mut index =
        ViewIndex::new(TreeConfig::octree().with_max_items(4).with_max_depth(3)).unwrap();
    for tri in &cube {
        index.add(tri);
    }
    index.split();

    assert_eq!(index.item_count(), 12);
    assert!(index.node_count() > 1);
    assert!(index.tree().root().is_split());
}

#[test]
fn no_item_loss_without_splitting() {
    let scene = lattice();
    for policy in POLICIES {
        let mut index = ViewIndex::new(config(policy)).unwrap();
        for tri in &scene {
            index.add(tri);
        }
        index.split();

        assert_eq!(index.item_count(), scene.len(), "{policy:?}");
        let stored = index.all_items();
        for tri in &scene {
            let copies = stored.iter().filter(|item| std::ptr::eq(**item, tri)).count();
            assert_eq!(copies, 1, "{policy:?}");
        }
    }
}

#[test]
fn depth_never_exceeds_limit() {
    let scene = lattice();
    for policy in POLICIES {
        for max_depth in [0, 1, 3] {
            let mut index = OwningIndex::new(
                config(policy)
                    .with_max_items(1)
                    .with_max_depth(max_depth)
                    .with_splitting(true),
            )
            .unwrap();
            for tri in &scene {
                index.add(PhantomTriangle::new(tri));
            }
            index.split();

            let tree = index.tree();
            assert!(tree.max_depth_reached() <= max_depth, "{policy:?} {max_depth}");
            for id in tree.all_nodes() {
                assert!(tree.node(id).depth() <= max_depth);
            }
        }
    }
}

#[test]
fn ray_candidates_include_every_hit_triangle() {
    let scene = lattice();
    for policy in POLICIES {
        let mut index = ViewIndex::new(config(policy)).unwrap();
        for tri in &scene {
            index.add(tri);
        }
        index.split();

        for tri in scene.iter().filter(|tri| tri.normal().z.abs() > 0.5) {
            let start = tri.centroid() - Vector3::z();
            let ray = Ray::new(start, Vector3::z(), 2.0);
            let found = index
                .query_ray(&ray)
                .into_iter()
                .flat_map(|node| index.items(node).iter())
                .any(|item| std::ptr::eq(*item, tri));
            assert!(found, "{policy:?} missed triangle at {:?}", tri.vertices()[0]);
        }
    }
}

#[test]
fn point_candidates_include_containing_nodes() {
    let scene = lattice();
    for policy in POLICIES {
        let mut index = ViewIndex::new(config(policy)).unwrap();
        for tri in &scene {
            index.add(tri);
        }
        index.split();

        for tri in &scene {
            let nodes = index.query_point(tri.centroid());
            assert_eq!(nodes.first(), Some(&NodeId::ROOT));
            let found = nodes
                .iter()
                .flat_map(|&node| index.items(node).iter())
                .any(|item| std::ptr::eq(*item, tri));
            assert!(found, "{policy:?}");
        }
    }
}

#[test]
fn area_is_conserved_when_splitting() {
    let scene = lattice();
    let total: f32 = scene.iter().map(Clip::area).sum();
    for policy in POLICIES {
        let mut index = OwningIndex::new(config(policy).with_splitting(true)).unwrap();
        for tri in &scene {
            index.add(PhantomTriangle::new(tri));
        }
        index.split();

        assert!(index.item_count() > scene.len(), "{policy:?}");
        let stored: f32 = index.all_items().iter().map(|f| f.area()).sum();
        assert!((stored - total).abs() < 1e-4 * total, "{policy:?}: {stored} vs {total}");

        for tri in &scene {
            let area: f32 = index
                .all_items()
                .iter()
                .filter(|f| std::ptr::eq(f.original(), tri))
                .map(|f| f.area())
                .sum();
            assert!((area - tri.area()).abs() < 1e-4 * tri.area().max(1.0), "{policy:?}");
        }
    }
}

#[test]
fn misuse_after_split_is_tolerated() {
    let scene = lattice();
    let late = make_triangle([3.0, 3.0, 3.0], [3.2, 3.0, 3.0], [3.0, 3.2, 3.0]);
    let mut index = ViewIndex::new(config(Policy::Octree)).unwrap();
    for tri in &scene {
        index.add(tri);
    }
    index.split();
    let nodes = index.node_count();

    index.split();
    assert_eq!(index.node_count(), nodes);

    index.add(&late);
    assert_eq!(index.item_count(), scene.len() + 1);
    assert!(index.items(NodeId::ROOT).iter().any(|item| std::ptr::eq(*item, &late)));
}

#[test]
fn concurrent_queries_match_sequential() {
    let scene = lattice();
    let mut index = ViewIndex::new(config(Policy::KdMeanVariance)).unwrap();
    for tri in &scene {
        index.add(tri);
    }
    index.split();

    let rays: Vec<Ray> = (0..16)
        .map(|i| {
            let start = Point3::new(-1.0, i as f32 * 0.5, 0.2);
            Ray::new(start, Vector3::new(1.0, 0.1, 0.4), 12.0)
        })
        .collect();
    let expected: Vec<Vec<NodeId>> = rays.iter().map(|ray| index.query_ray(ray)).collect();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for (ray, expected) in rays.iter().zip(&expected) {
                    assert_eq!(&index.query_ray(ray), expected);
                }
            });
        }
    });
}

/// Counts constructions and drops of [`Tracked`] items.
#[derive(Debug, Default)]
struct Counters {
    created: Cell<usize>,
    dropped: Cell<usize>,
}

/// A triangle-shaped item that records when it is created and dropped.
#[derive(Debug)]
struct Tracked {
    vertices: [Point3<f32>; 3],
    counters: Rc<Counters>,
}

impl Tracked {
    fn new(vertices: [Point3<f32>; 3], counters: &Rc<Counters>) -> Self {
        counters.created.set(counters.created.get() + 1);
        Self {
            vertices,
            counters: Rc::clone(counters),
        }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.counters.dropped.set(self.counters.dropped.get() + 1);
    }
}

impl Bounded for Tracked {
    fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices)
    }

    fn centroid(&self) -> Point3<f32> {
        let [a, b, c] = self.vertices;
        Point3::from((a.coords + b.coords + c.coords) / 3.0)
    }
}

impl PlaneClassify for Tracked {
    fn plane_side(&self, plane: &Plane3D) -> PlaneSide {
        plane.classify_points(self.vertices)
    }

    fn is_coincident(&self, plane: &Plane3D) -> bool {
        self.vertices
            .iter()
            .all(|v| plane.classify_point(*v) == PlaneSide::Straddling)
    }
}

impl Clip for Tracked {
    fn area(&self) -> f32 {
        let [a, b, c] = self.vertices;
        (b - a).cross(&(c - a)).norm() * 0.5
    }

    fn clip(&self, plane: &Plane3D) -> Option<Vec<Self>> {
        if self.is_coincident(plane) {
            return None;
        }
        let (front, back) = clip_polygon(&self.vertices, plane);
        let fragments = front
            .into_iter()
            .chain(back)
            .flat_map(|polygon| fan_triangulate(&polygon))
            .map(|vertices| Tracked::new(vertices, &self.counters))
            .collect();
        Some(fragments)
    }
}

fn tracked_index(policy: Policy, scene: &[Triangle], counters: &Rc<Counters>) -> OwningIndex<Tracked> {
    let mut index = OwningIndex::new(config(policy).with_splitting(true)).unwrap();
    for tri in scene {
        index.add(Tracked::new(*tri.vertices(), counters));
    }
    index.split();
    index
}

#[test]
fn delete_owned_items_drops_each_fragment_once() {
    let scene = lattice();
    for policy in POLICIES {
        let counters = Rc::new(Counters::default());
        let mut index = tracked_index(policy, &scene, &counters);

        // Clipped items are replaced by their fragments during the split.
        let live = counters.created.get() - counters.dropped.get();
        assert!(counters.created.get() > scene.len(), "{policy:?}");
        assert_eq!(live, index.item_count(), "{policy:?}");

        assert_eq!(index.delete_owned_items(), live);
        assert_eq!(counters.dropped.get(), counters.created.get());
        assert_eq!(index.item_count(), 0);

        drop(index);
        assert_eq!(counters.dropped.get(), counters.created.get());
    }
}

#[test]
fn dropping_owning_index_drops_its_items() {
    let scene = lattice();
    for policy in POLICIES {
        let counters = Rc::new(Counters::default());
        let index = tracked_index(policy, &scene, &counters);
        assert!(counters.dropped.get() < counters.created.get());

        drop(index);
        assert_eq!(counters.dropped.get(), counters.created.get(), "{policy:?}");
    }
}
