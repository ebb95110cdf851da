//! Tree navigation utilities for interactive visualization.

use gi_spatial::{NodeId, Partition, SpatialTree};
use macroquad::prelude::*;

use crate::draw_aabb;

/// Keys that select a child, in octant order (kd nodes use the first two).
const CHILD_KEYS: [KeyCode; 8] = [
    KeyCode::Key1,
    KeyCode::Key2,
    KeyCode::Key3,
    KeyCode::Key4,
    KeyCode::Key5,
    KeyCode::Key6,
    KeyCode::Key7,
    KeyCode::Key8,
];

/// Interactive navigator for exploring a spatial tree one node at a time.
#[derive(Debug, Default)]
pub struct NodeNavigator {
    path: Vec<NodeId>,
}

impl NodeNavigator {
    /// Creates a new navigator starting at the root.
    pub fn new() -> Self {
        Self::default()
    }

    /// The node currently selected.
    pub fn current(&self) -> NodeId {
        self.path.last().copied().unwrap_or(NodeId::ROOT)
    }

    /// Returns the current depth in the tree.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Moves to the `slot`-th child slot of the current node. Returns true if
    /// that child exists.
    pub fn go_child<T>(&mut self, tree: &SpatialTree<T>, slot: usize) -> bool {
        let child = match *tree.node(self.current()).partition() {
            Partition::Leaf => None,
            Partition::Octants(children) => children.get(slot).copied(),
            Partition::HalfSpaces {
                behind, infront, ..
            } => match slot {
                0 => behind,
                1 => infront,
                _ => None,
            },
        };
        match child {
            Some(child) => {
                self.path.push(child);
                true
            }
            None => false,
        }
    }

    /// Navigates to the parent node. Returns true if not already at root.
    pub fn go_parent(&mut self) -> bool {
        self.path.pop().is_some()
    }

    pub fn go_root(&mut self) {
        self.path.clear();
    }

    /// Handles keyboard input for navigation.
    /// Returns true if navigation state changed.
    pub fn update<T>(&mut self, tree: &SpatialTree<T>) -> bool {
        let mut changed = false;

        for (slot, key) in CHILD_KEYS.into_iter().enumerate() {
            if is_key_pressed(key) {
                changed |= self.go_child(tree, slot);
            }
        }
        if is_key_pressed(KeyCode::P) {
            changed |= self.go_parent();
        }
        if is_key_pressed(KeyCode::R) && !self.path.is_empty() {
            self.go_root();
            changed = true;
        }

        changed
    }

    /// Draws the boxes of the current subtree and hands its items to `draw_item`.
    pub fn render<T>(&self, tree: &SpatialTree<T>, mut draw_item: impl FnMut(&T)) {
        let current = self.current();
        for id in tree.subtree_nodes(current) {
            let node = tree.node(id);
            let color = if id == current { YELLOW } else { DARKGRAY };
            draw_aabb(node.bounds(), color);
            for item in node.items() {
                draw_item(item);
            }
        }
    }

    /// Draws the navigation UI overlay.
    pub fn draw_ui<T>(&self, tree: &SpatialTree<T>, y_offset: f32) {
        let current = self.current();
        let node = tree.node(current);

        let (kind, slots) = match node.partition() {
            Partition::Leaf => ("leaf".to_string(), 0),
            Partition::Octants(_) => ("octants".to_string(), 8),
            Partition::HalfSpaces { axis, value, .. } => (format!("{axis:?} = {value:.2}"), 2),
        };

        draw_text(
            &format!(
                "Node {} | {} items here, {} in subtree",
                current.index(),
                node.items().len(),
                tree.subtree_items(current).len()
            ),
            10.0,
            y_offset,
            18.0,
            WHITE,
        );
        draw_text(
            &format!("Depth {} | {}", node.depth(), kind),
            10.0,
            y_offset + 20.0,
            18.0,
            YELLOW,
        );
        let children = if slots == 0 {
            "(leaf)".to_string()
        } else {
            format!("Children: [1-{}] ({} present)", slots, node.children().count())
        };
        draw_text(
            &children,
            10.0,
            y_offset + 40.0,
            18.0,
            if slots == 0 { ORANGE } else { GREEN },
        );
        draw_text("[P]arent | [R]oot", 10.0, y_offset + 60.0, 16.0, DARKGRAY);
    }
}
