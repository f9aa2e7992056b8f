//! Loose quadtree used as the broad-phase for ray and region queries.
//!
//! Every item lives in exactly one node: the deepest node whose cell is still
//! at least as large as the item, picked by the cell containing the item's
//! center. Because an item may poke out of its cell by up to half a cell, each
//! node is searched through its *loose* bounds (the cell grown by half a cell
//! on every side). Items that are not fully inside the world rectangle are kept
//! at the root, which is always searched.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    collision::queries::{sort_hits, Ray, RayHit, RayQuery},
    core::types::Rect,
    error::{PhysicsError, Result},
    utils::{allocator::ColliderId, math::mask_contains},
};

/// Depth beyond which node counts explode for no practical gain.
pub const MAX_SUPPORTED_DEPTH: u32 = 16;

const ROOT: usize = 0;

/// Index of a node inside a [`QuadTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(usize);

/// Where an item sits in the tree: its depth and the node holding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpatialPosition {
    pub depth: u32,
    pub node: Option<NodeId>,
}

impl SpatialPosition {
    /// Depth is known but the item has not been placed yet.
    pub fn unplaced(depth: u32) -> Self {
        Self { depth, node: None }
    }
}

#[derive(Debug)]
struct Node {
    cell: Rect,
    depth: u32,
    children: Option<[usize; 4]>,
    items: Vec<ColliderId>,
}

impl Node {
    fn new(cell: Rect, depth: u32) -> Self {
        Self {
            cell,
            depth,
            children: None,
            items: Vec::new(),
        }
    }

    fn loose_bounds(&self) -> Rect {
        Rect::from_center_size(self.cell.center(), self.cell.size * 2.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct ItemEntry {
    rect: Rect,
    layer: u8,
    is_trigger: bool,
    last: SpatialPosition,
    current: SpatialPosition,
}

/// Hierarchical partition of a fixed world rectangle.
#[derive(Debug)]
pub struct QuadTree {
    world_rect: Rect,
    max_depth: u32,
    nodes: Vec<Node>,
    items: HashMap<ColliderId, ItemEntry>,
}

impl QuadTree {
    pub fn new(world_rect: Rect, max_depth: u32) -> Result<Self> {
        let size = world_rect.size;
        if !(size.x.is_finite() && size.y.is_finite() && size.x > 0.0 && size.y > 0.0) {
            return Err(PhysicsError::InvalidQuadTree(format!(
                "world rect must have a positive finite size, got {}x{}",
                size.x, size.y
            )));
        }
        if !(world_rect.min.x.is_finite() && world_rect.min.y.is_finite()) {
            return Err(PhysicsError::InvalidQuadTree(
                "world rect origin must be finite".to_string(),
            ));
        }

        let max_depth = max_depth.min(MAX_SUPPORTED_DEPTH);
        log::debug!(
            "quadtree over ({}, {}) {}x{} with max depth {max_depth}",
            world_rect.min.x,
            world_rect.min.y,
            size.x,
            size.y
        );

        Ok(Self {
            world_rect,
            max_depth,
            nodes: vec![Node::new(world_rect, 0)],
            items: HashMap::new(),
        })
    }

    pub fn world_rect(&self) -> Rect {
        self.world_rect
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: ColliderId) -> bool {
        self.items.contains_key(&id)
    }

    /// Size of a cell at `depth`.
    pub fn cell_size(&self, depth: u32) -> Vec2 {
        self.world_rect.size / (1u64 << depth.min(MAX_SUPPORTED_DEPTH)) as f32
    }

    /// Deepest level whose cells can still hold an item of `size`.
    pub fn get_depth(&self, size: Vec2) -> u32 {
        let mut depth = 0;
        while depth < self.max_depth {
            let next = self.cell_size(depth + 1);
            if next.x >= size.x && next.y >= size.y {
                depth += 1;
            } else {
                break;
            }
        }
        depth
    }

    /// Current placement of an item.
    pub fn position(&self, id: ColliderId) -> Option<SpatialPosition> {
        self.items.get(&id).map(|entry| entry.current)
    }

    /// Placement of an item before its latest update.
    pub fn last_position(&self, id: ColliderId) -> Option<SpatialPosition> {
        self.items.get(&id).map(|entry| entry.last)
    }

    /// Items stored directly in the node of `position`.
    pub fn items_at(&self, position: &SpatialPosition) -> &[ColliderId] {
        position
            .node
            .and_then(|node| self.nodes.get(node.0))
            .map(|node| node.items.as_slice())
            .unwrap_or(&[])
    }

    /// Cell rectangle of the node of `position`.
    pub fn cell_rect(&self, position: &SpatialPosition) -> Option<Rect> {
        position
            .node
            .and_then(|node| self.nodes.get(node.0))
            .map(|node| node.cell)
    }

    /// Inserts or moves an item so that it sits in the node matching `rect`.
    ///
    /// Only the cached rectangle changes when the item stays in the same node.
    pub fn update_item(
        &mut self,
        id: ColliderId,
        rect: Rect,
        layer: u8,
        is_trigger: bool,
    ) -> SpatialPosition {
        let target = self.locate(&rect);

        let previous = match self.items.get_mut(&id) {
            Some(entry) => {
                entry.rect = rect;
                entry.layer = layer;
                entry.is_trigger = is_trigger;
                entry.last = entry.current;
                entry.current = target;
                entry.last.node
            }
            None => {
                self.items.insert(
                    id,
                    ItemEntry {
                        rect,
                        layer,
                        is_trigger,
                        last: SpatialPosition::unplaced(target.depth),
                        current: target,
                    },
                );
                None
            }
        };

        if previous != target.node {
            if let Some(old) = previous {
                self.detach(old.0, id);
            }
            if let Some(new) = target.node {
                self.nodes[new.0].items.push(id);
            }
            log::trace!(
                "{id} moved to depth {} node {:?}",
                target.depth,
                target.node
            );
        }

        target
    }

    pub fn remove_item(&mut self, id: ColliderId) -> bool {
        match self.items.remove(&id) {
            Some(entry) => {
                if let Some(node) = entry.current.node {
                    self.detach(node.0, id);
                }
                true
            }
            None => false,
        }
    }

    /// Drops every item for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(ColliderId) -> bool) -> usize {
        let stale: Vec<ColliderId> = self.items.keys().copied().filter(|id| !keep(*id)).collect();
        for id in &stale {
            self.remove_item(*id);
        }
        if !stale.is_empty() {
            log::debug!("pruned {} stale quadtree entries", stale.len());
        }
        stale.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.nodes.truncate(1);
        self.nodes[ROOT].children = None;
        self.nodes[ROOT].items.clear();
    }

    /// Hits of `ray` against every item on `layer_mask`, nearest first.
    pub fn query(&self, ray: &Ray, layer_mask: u32) -> Vec<RayHit> {
        let span = ray.bounds();
        let mut hits = Vec::new();
        self.visit(
            |bounds| {
                bounds.overlaps(&span)
                    && bounds
                        .ray_intersection(ray.origin, ray.direction, ray.max_distance)
                        .is_some()
            },
            |entry_id, entry| {
                if !mask_contains(layer_mask, entry.layer) {
                    return;
                }
                if let Some(hit) = ray.cast_rect(&entry.rect, entry_id, entry.is_trigger) {
                    hits.push(hit);
                }
            },
        );
        sort_hits(&mut hits);
        hits
    }

    /// Items on `layer_mask` whose rectangle overlaps `region`, in id order.
    pub fn query_region(&self, region: &Rect, layer_mask: u32) -> Vec<ColliderId> {
        let mut found = Vec::new();
        self.visit(
            |bounds| bounds.overlaps(region),
            |entry_id, entry| {
                if mask_contains(layer_mask, entry.layer) && entry.rect.overlaps(region) {
                    found.push(entry_id);
                }
            },
        );
        found.sort();
        found
    }

    fn visit(
        &self,
        mut descend: impl FnMut(&Rect) -> bool,
        mut on_item: impl FnMut(ColliderId, &ItemEntry),
    ) {
        let mut stack = vec![ROOT];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            for id in &node.items {
                if let Some(entry) = self.items.get(id) {
                    on_item(*id, entry);
                }
            }
            if let Some(children) = node.children {
                for child in children {
                    if descend(&self.nodes[child].loose_bounds()) {
                        stack.push(child);
                    }
                }
            }
        }
    }

    fn locate(&mut self, rect: &Rect) -> SpatialPosition {
        if !self.world_rect.contains_rect(rect) {
            return SpatialPosition {
                depth: 0,
                node: Some(NodeId(ROOT)),
            };
        }

        let depth = self.get_depth(rect.size);
        let center = rect.center();
        let mut index = ROOT;
        while self.nodes[index].depth < depth {
            let children = self.split(index);
            let cell = self.nodes[index].cell;
            let mid = cell.center();
            let quadrant = usize::from(center.x >= mid.x) + 2 * usize::from(center.y >= mid.y);
            index = children[quadrant];
        }

        SpatialPosition {
            depth,
            node: Some(NodeId(index)),
        }
    }

    /// Children of `index`, creating them on first use.
    /// Order: bottom-left, bottom-right, top-left, top-right.
    fn split(&mut self, index: usize) -> [usize; 4] {
        if let Some(children) = self.nodes[index].children {
            return children;
        }

        let cell = self.nodes[index].cell;
        let depth = self.nodes[index].depth + 1;
        let half = cell.size * 0.5;
        let base = self.nodes.len();
        for (dx, dy) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)] {
            let min = cell.min + Vec2::new(half.x * dx, half.y * dy);
            self.nodes.push(Node::new(Rect::new(min, half), depth));
        }

        let children = [base, base + 1, base + 2, base + 3];
        self.nodes[index].children = Some(children);
        children
    }

    fn detach(&mut self, node: usize, id: ColliderId) {
        if let Some(node) = self.nodes.get_mut(node) {
            if let Some(slot) = node.items.iter().position(|item| *item == id) {
                node.items.swap_remove(slot);
            }
        }
    }
}

impl RayQuery for QuadTree {
    fn query_ray(&self, ray: &Ray, layer_mask: u32) -> Vec<RayHit> {
        self.query(ray, layer_mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> QuadTree {
        QuadTree::new(Rect::from_xywh(0.0, 0.0, 100.0, 100.0), 4).expect("valid world rect")
    }

    #[test]
    fn depth_tracks_item_size() {
        let tree = tree();
        assert_eq!(tree.get_depth(Vec2::new(1.0, 1.0)), 4);
        assert_eq!(tree.get_depth(Vec2::new(6.25, 6.25)), 4);
        assert_eq!(tree.get_depth(Vec2::new(7.0, 1.0)), 3);
        assert_eq!(tree.get_depth(Vec2::new(30.0, 30.0)), 1);
        assert_eq!(tree.get_depth(Vec2::new(150.0, 1.0)), 0);
    }

    #[test]
    fn rejects_degenerate_world() {
        assert!(QuadTree::new(Rect::from_xywh(0.0, 0.0, 0.0, 10.0), 3).is_err());
        assert!(QuadTree::new(Rect::from_xywh(0.0, 0.0, f32::NAN, 10.0), 3).is_err());
    }

    #[test]
    fn round_trip_through_cells() {
        let mut tree = tree();
        let id = ColliderId::new(0, 0);
        let rect = Rect::from_xywh(10.0, 5.0, 1.0, 1.0);
        let placed = tree.update_item(id, rect, 0, false);

        assert_eq!(placed.depth, 4);
        assert!(tree.items_at(&placed).contains(&id));
        let cell = tree.cell_rect(&placed).expect("placed in a node");
        assert!(cell.contains_point(rect.center()));
        assert_eq!(tree.query_region(&cell, u32::MAX), vec![id]);

        let moved = tree.update_item(id, Rect::from_xywh(80.0, 80.0, 1.0, 1.0), 0, false);
        assert_ne!(moved.node, placed.node);
        assert_eq!(tree.last_position(id), Some(placed));
        assert!(!tree.items_at(&placed).contains(&id));
        assert!(tree.query_region(&cell, u32::MAX).is_empty());
        assert!(tree.items_at(&moved).contains(&id));
    }

    #[test]
    fn update_in_place_is_idempotent() {
        let mut tree = tree();
        let id = ColliderId::new(3, 1);
        let first = tree.update_item(id, Rect::from_xywh(10.0, 10.0, 1.0, 1.0), 0, false);
        let nodes = tree.node_count();
        let second = tree.update_item(id, Rect::from_xywh(10.2, 10.1, 1.0, 1.0), 0, false);

        assert_eq!(first, second);
        assert_eq!(tree.node_count(), nodes);
        assert_eq!(tree.items_at(&second).iter().filter(|item| **item == id).count(), 1);
    }

    #[test]
    fn items_outside_world_live_at_root() {
        let mut tree = tree();
        let id = ColliderId::new(1, 0);
        let placed = tree.update_item(id, Rect::from_xywh(-5.0, 50.0, 1.0, 1.0), 0, false);
        assert_eq!(placed.depth, 0);

        let hits = tree.query(&Ray::new(Vec2::new(-10.0, 50.5), Vec2::X, 20.0), u32::MAX);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].collider, id);
    }

    #[test]
    fn ray_query_sorts_and_respects_mask() {
        let mut tree = tree();
        let near = ColliderId::new(0, 0);
        let far = ColliderId::new(1, 0);
        let hidden = ColliderId::new(2, 0);
        tree.update_item(far, Rect::from_xywh(40.0, 9.0, 2.0, 2.0), 0, false);
        tree.update_item(near, Rect::from_xywh(20.0, 9.5, 1.0, 1.0), 0, true);
        tree.update_item(hidden, Rect::from_xywh(30.0, 9.0, 2.0, 2.0), 3, false);

        let ray = Ray::new(Vec2::new(0.0, 10.0), Vec2::X, 60.0);
        let hits = tree.query(&ray, 0b1);
        let order: Vec<_> = hits.iter().map(|hit| hit.collider).collect();
        assert_eq!(order, vec![near, far]);
        assert!(hits[0].is_trigger);
        assert!((hits[0].distance - 20.0).abs() < 1e-4);
        assert!((hits[1].distance - 40.0).abs() < 1e-4);

        let short = tree.query(&Ray::new(Vec2::new(0.0, 10.0), Vec2::X, 10.0), u32::MAX);
        assert!(short.is_empty());
    }

    #[test]
    fn item_straddling_a_cell_border_is_found_from_the_neighbour() {
        let mut tree = tree();
        let id = ColliderId::new(7, 0);
        // Center in the left half, but the right edge crosses x = 50.
        tree.update_item(id, Rect::from_xywh(48.0, 20.0, 3.0, 3.0), 0, false);

        let ray = Ray::new(Vec2::new(50.5, 40.0), Vec2::NEG_Y, 30.0);
        let hits = tree.query(&ray, u32::MAX);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].point.y - 23.0).abs() < 1e-4);
    }

    #[test]
    fn remove_and_retain() {
        let mut tree = tree();
        let a = ColliderId::new(0, 0);
        let b = ColliderId::new(1, 0);
        let pos_a = tree.update_item(a, Rect::from_xywh(1.0, 1.0, 1.0, 1.0), 0, false);
        tree.update_item(b, Rect::from_xywh(2.0, 1.0, 1.0, 1.0), 0, false);

        assert!(tree.remove_item(a));
        assert!(!tree.remove_item(a));
        assert!(!tree.items_at(&pos_a).contains(&a));

        assert_eq!(tree.retain(|id| id != b), 1);
        assert!(tree.is_empty());
    }
}
