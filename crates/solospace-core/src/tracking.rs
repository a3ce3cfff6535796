//! Per-window tracking tables.
//!
//! `relocated` holds windows this engine moved onto a workspace of their own
//! and has not restored yet. `pending` holds the decision taken when a size
//! transition started, until the host reports the transition finished.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::window::WindowId;

/// Which way the workspace list was shifted when a window was relocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relocation {
    Forward,
    Backward,
}

/// Decision captured at the start of a size transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingTransition {
    ToPlace,
    ToPlaceBack,
}

#[derive(Debug, Default)]
pub struct TrackingTable {
    relocated: IndexMap<WindowId, Relocation>,
    pending: IndexMap<WindowId, PendingTransition>,
}

impl TrackingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_relocated(&mut self, id: WindowId, direction: Relocation) {
        self.relocated.insert(id, direction);
    }

    pub fn is_relocated(&self, id: WindowId) -> bool {
        self.relocated.contains_key(&id)
    }

    pub fn relocation(&self, id: WindowId) -> Option<Relocation> {
        self.relocated.get(&id).copied()
    }

    /// Forget a relocation. Returns the direction it had.
    pub fn clear_relocated(&mut self, id: WindowId) -> Option<Relocation> {
        self.relocated.shift_remove(&id)
    }

    pub fn mark_pending(&mut self, id: WindowId, kind: PendingTransition) {
        self.pending.insert(id, kind);
    }

    /// Read and forget the pending decision for `id`.
    pub fn consume_pending(&mut self, id: WindowId) -> Option<PendingTransition> {
        self.pending.shift_remove(&id)
    }

    pub fn relocated(&self) -> impl Iterator<Item = (WindowId, Relocation)> + '_ {
        self.relocated.iter().map(|(&id, &r)| (id, r))
    }

    pub fn pending(&self) -> impl Iterator<Item = (WindowId, PendingTransition)> + '_ {
        self.pending.iter().map(|(&id, &p)| (id, p))
    }

    pub fn clear(&mut self) {
        self.relocated.clear();
        self.pending.clear();
    }
}
