//! Selection wand state: per-player corner1/corner2 for defining regions.

use std::collections::HashMap;

use uuid::Uuid;

use crate::region::{BlockPos, Region};

#[derive(Debug, Clone, Copy, Default)]
struct Selection {
    corner1: Option<BlockPos>,
    corner2: Option<BlockPos>,
    completed: bool,
}

/// Per-player two-corner selection. A selection becomes usable once both
/// corners are set and the player completes it.
#[derive(Debug, Default)]
pub struct SelectionStore {
    selections: HashMap<Uuid, Selection>,
}

impl SelectionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Setting a corner reopens a completed selection.
    pub fn set_corner1(&mut self, player: Uuid, pos: BlockPos) {
        let entry = self.selections.entry(player).or_default();
        entry.corner1 = Some(pos);
        entry.completed = false;
    }

    pub fn set_corner2(&mut self, player: Uuid, pos: BlockPos) {
        let entry = self.selections.entry(player).or_default();
        entry.corner2 = Some(pos);
        entry.completed = false;
    }

    /// Mark the selection complete. No-op (false) unless both corners are set.
    pub fn complete(&mut self, player: Uuid) -> bool {
        match self.selections.get_mut(&player) {
            Some(sel) if sel.corner1.is_some() && sel.corner2.is_some() => {
                sel.completed = true;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn is_completed(&self, player: Uuid) -> bool {
        self.selections.get(&player).is_some_and(|s| s.completed)
    }

    /// The normalized region of a completed selection.
    #[must_use]
    pub fn selection(&self, player: Uuid) -> Option<Region> {
        let sel = self.selections.get(&player)?;
        if !sel.completed {
            return None;
        }
        Some(Region::new(sel.corner1?, sel.corner2?))
    }

    pub fn clear(&mut self, player: Uuid) {
        self.selections.remove(&player);
    }
}
