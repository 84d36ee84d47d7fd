//! Region adjacency graph.
//!
//! Regions live in an arena and are addressed by [`RegionId`] handles. Each
//! node keeps the set of handles it touches, and every edge is stored on both
//! endpoints. Slots are `Option`s so removing a node never shifts other
//! handles; dead slots are reused by later inserts.
//!
//! The graph is the only place adjacency is tracked. Split and merge operations
//! go through it so that edges follow the geometry they describe.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::region::{BlockPos, Region};

/// Stable handle to a region inside one [`RegionGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(u32);

impl RegionId {
    const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
struct RegionNode {
    region: Region,
    adjacent: BTreeSet<RegionId>,
}

#[derive(Debug, Default)]
pub struct RegionGraph {
    nodes: Vec<Option<RegionNode>>,
    free_slots: Vec<u32>,
    live: usize,
}

impl RegionGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from plain regions, linking every adjacent pair.
    pub fn from_regions(regions: impl IntoIterator<Item = Region>) -> Self {
        let mut graph = Self::new();
        for region in regions {
            graph.insert_linked(region);
        }
        graph
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.live
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    #[must_use]
    pub fn contains(&self, id: RegionId) -> bool {
        self.node(id).is_some()
    }

    #[must_use]
    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.node(id).map(|n| &n.region)
    }

    /// Live handles in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| RegionId(i as u32))
    }

    pub fn iter(&self) -> impl Iterator<Item = (RegionId, &Region)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|n| (RegionId(i as u32), &n.region)))
    }

    /// Snapshot of every region, in handle order.
    #[must_use]
    pub fn regions(&self) -> Vec<Region> {
        self.iter().map(|(_, r)| *r).collect()
    }

    pub fn neighbors(&self, id: RegionId) -> impl Iterator<Item = RegionId> + '_ {
        self.node(id)
            .into_iter()
            .flat_map(|n| n.adjacent.iter().copied())
    }

    #[must_use]
    pub fn are_linked(&self, a: RegionId, b: RegionId) -> bool {
        self.node(a).is_some_and(|n| n.adjacent.contains(&b))
    }

    /// Total number of blocks covered, assuming the regions are disjoint.
    #[must_use]
    pub fn volume(&self) -> u64 {
        self.iter()
            .fold(0u64, |acc, (_, r)| acc.saturating_add(r.volume()))
    }

    #[must_use]
    pub fn find_containing(&self, pos: BlockPos) -> Option<RegionId> {
        self.iter().find(|(_, r)| r.contains(pos)).map(|(id, _)| id)
    }

    fn node(&self, id: RegionId) -> Option<&RegionNode> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: RegionId) -> Option<&mut RegionNode> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Add an isolated node.
    pub fn insert(&mut self, region: Region) -> RegionId {
        let node = RegionNode {
            region,
            adjacent: BTreeSet::new(),
        };
        self.live += 1;
        if let Some(slot) = self.free_slots.pop() {
            self.nodes[slot as usize] = Some(node);
            RegionId(slot)
        } else {
            self.nodes.push(Some(node));
            RegionId((self.nodes.len() - 1) as u32)
        }
    }

    /// Add a node and link it to every existing node it is adjacent to.
    pub fn insert_linked(&mut self, region: Region) -> RegionId {
        let id = self.insert(region);
        self.link_all_adjacent(id);
        id
    }

    /// Link `id` to every other node that geometrically touches it. Returns the
    /// number of new edges.
    pub fn link_all_adjacent(&mut self, id: RegionId) -> usize {
        let Some(region) = self.region(id).copied() else {
            return 0;
        };
        let touching: Vec<RegionId> = self
            .iter()
            .filter(|(other, r)| *other != id && r.is_adjacent_to(&region))
            .map(|(other, _)| other)
            .collect();
        touching
            .into_iter()
            .filter(|&other| self.link(id, other))
            .count()
    }

    /// Record that `a` and `b` touch. Refused unless the two regions are
    /// actually adjacent, so the graph never carries a non-geometric edge.
    /// Returns true only when a new edge was added.
    pub fn link(&mut self, a: RegionId, b: RegionId) -> bool {
        if a == b || self.are_linked(a, b) {
            return false;
        }
        let (Some(ra), Some(rb)) = (self.region(a), self.region(b)) else {
            return false;
        };
        if !ra.is_adjacent_to(rb) {
            return false;
        }
        if let Some(n) = self.node_mut(a) {
            n.adjacent.insert(b);
        }
        if let Some(n) = self.node_mut(b) {
            n.adjacent.insert(a);
        }
        true
    }

    pub fn unlink(&mut self, a: RegionId, b: RegionId) {
        if let Some(n) = self.node_mut(a) {
            n.adjacent.remove(&b);
        }
        if let Some(n) = self.node_mut(b) {
            n.adjacent.remove(&a);
        }
    }

    /// Drop every edge of `id`, including the back-references its neighbours hold.
    pub fn clear_adjacent(&mut self, id: RegionId) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        let neighbors = std::mem::take(&mut node.adjacent);
        for neighbor in neighbors {
            if let Some(n) = self.node_mut(neighbor) {
                n.adjacent.remove(&id);
            }
        }
    }

    /// Take a node out of play. Its edges are cleared first.
    pub fn remove(&mut self, id: RegionId) -> Option<Region> {
        self.clear_adjacent(id);
        let node = self.nodes.get_mut(id.index())?.take()?;
        self.free_slots.push(id.0);
        self.live -= 1;
        Some(node.region)
    }

    /// Breadth-first walk over adjacency edges: the connected component of `start`.
    #[must_use]
    pub fn bfs(&self, start: RegionId) -> BTreeSet<RegionId> {
        let mut seen = BTreeSet::new();
        if !self.contains(start) {
            return seen;
        }
        let mut queue = VecDeque::new();
        seen.insert(start);
        queue.push_back(start);
        while let Some(current) = queue.pop_front() {
            for next in self.neighbors(current) {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    /// All connected components, ordered by their lowest handle.
    #[must_use]
    pub fn components(&self) -> Vec<BTreeSet<RegionId>> {
        let mut assigned = BTreeSet::new();
        let mut components = Vec::new();
        for id in self.ids() {
            if assigned.contains(&id) {
                continue;
            }
            let component = self.bfs(id);
            assigned.extend(component.iter().copied());
            components.push(component);
        }
        components
    }

    /// True when one BFS reaches every node. An empty graph counts as contiguous.
    #[must_use]
    pub fn is_contiguous(&self) -> bool {
        self.ids()
            .next()
            .is_none_or(|start| self.bfs(start).len() == self.live)
    }

    /// Split node `id` around `cutter`.
    ///
    /// Returns `[id]` untouched when they do not overlap. Otherwise the
    /// remainder slabs are inserted as new nodes, linked to each other where
    /// they touch and to whichever of `id`'s neighbours they still touch. `id`
    /// itself is left in place with its edges; the caller retires it with
    /// [`remove`](Self::remove).
    pub fn subtract(&mut self, id: RegionId, cutter: &Region) -> Vec<RegionId> {
        let Some(region) = self.region(id).copied() else {
            return Vec::new();
        };
        if !region.overlaps(cutter) {
            return vec![id];
        }

        let pieces: Vec<RegionId> = region
            .subtract(cutter)
            .into_iter()
            .map(|slab| self.insert(slab))
            .collect();
        for (i, &a) in pieces.iter().enumerate() {
            for &b in &pieces[i + 1..] {
                self.link(a, b);
            }
        }
        let outside: Vec<RegionId> = self.neighbors(id).collect();
        for &piece in &pieces {
            for &neighbor in &outside {
                self.link(piece, neighbor);
            }
        }
        pieces
    }

    /// Fuse two coplanar neighbours into one node carrying the union of their
    /// edges. Both inputs are removed. `None` (and no change) if they cannot fuse.
    pub fn merge(&mut self, a: RegionId, b: RegionId) -> Option<RegionId> {
        let merged = self.region(a)?.merge(self.region(b)?)?;
        let neighbors: BTreeSet<RegionId> = self
            .neighbors(a)
            .chain(self.neighbors(b))
            .filter(|&n| n != a && n != b)
            .collect();
        self.remove(a);
        self.remove(b);
        let id = self.insert(merged);
        for neighbor in neighbors {
            self.link(id, neighbor);
        }
        Some(id)
    }

    /// Coalesce coplanar neighbours to keep the node count down.
    ///
    /// One pass walks the handles in order and fuses each live node with its
    /// first mergeable neighbour. With `until_stable` the pass repeats until a
    /// full pass merges nothing. Returns the number of merges performed.
    pub fn merge_pass(&mut self, until_stable: bool) -> usize {
        let mut total = 0;
        loop {
            let mut merged_this_pass = 0;
            let ids: Vec<RegionId> = self.ids().collect();
            for id in ids {
                let Some(region) = self.region(id).copied() else {
                    continue;
                };
                let partner = self.neighbors(id).find(|&n| {
                    self.region(n)
                        .is_some_and(|other| region.is_same_plane_as(other))
                });
                if let Some(partner) = partner {
                    if self.merge(id, partner).is_some() {
                        merged_this_pass += 1;
                    }
                }
            }
            total += merged_this_pass;
            if !until_stable || merged_this_pass == 0 {
                return total;
            }
        }
    }

    /// Deep copy of the component containing `start` into `dest`.
    ///
    /// Uses a worklist rather than recursion. Every reached node gets a fresh
    /// handle in `dest`; edges are mirrored once all nodes exist. Returns the
    /// map from handles in `self` to handles in `dest`.
    pub fn copy_component_into(
        &self,
        start: RegionId,
        dest: &mut Self,
    ) -> BTreeMap<RegionId, RegionId> {
        let mut mapping = BTreeMap::new();
        let Some(region) = self.region(start) else {
            return mapping;
        };
        let mut worklist = VecDeque::new();
        mapping.insert(start, dest.insert(*region));
        worklist.push_back(start);
        while let Some(current) = worklist.pop_front() {
            for next in self.neighbors(current) {
                if mapping.contains_key(&next) {
                    continue;
                }
                if let Some(r) = self.region(next) {
                    mapping.insert(next, dest.insert(*r));
                    worklist.push_back(next);
                }
            }
        }
        for (&old, &new) in &mapping {
            for neighbor in self.neighbors(old) {
                if let Some(&mapped) = mapping.get(&neighbor) {
                    if let Some(n) = dest.node_mut(new) {
                        n.adjacent.insert(mapped);
                    }
                }
            }
        }
        mapping
    }

    /// Standalone copy of the component containing `start`.
    #[must_use]
    pub fn copy_component(&self, start: RegionId) -> Self {
        let mut dest = Self::new();
        self.copy_component_into(start, &mut dest);
        dest
    }

    /// Independent copy of the whole graph, component by component.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        let mut dest = Self::new();
        let mut copied = BTreeSet::new();
        for id in self.ids() {
            if copied.contains(&id) {
                continue;
            }
            copied.extend(self.copy_component_into(id, &mut dest).into_keys());
        }
        dest
    }
}
