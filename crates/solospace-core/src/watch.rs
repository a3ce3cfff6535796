//! Per-workspace "window added" subscriptions.
//!
//! The watch list is index-aligned with the host's workspace list: slot `i`
//! holds the watch subscribed on the workspace currently at index `i`.
//! Every insertion, removal and reorder of workspaces must be mirrored here.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::event::CoreAction;
use crate::reorder::move_item;

/// Opaque subscription handle, allocated by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WatchId(pub u64);

impl std::fmt::Display for WatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "watch:{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct WorkspaceWatches {
    watches: Vec<WatchId>,
    next: u64,
}

impl WorkspaceWatches {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> WatchId {
        let id = WatchId(self.next);
        self.next += 1;
        id
    }

    /// Subscribe `n_workspaces` workspaces in index order.
    pub fn subscribe_all(&mut self, n_workspaces: usize) -> Vec<CoreAction> {
        let mut actions = self.clear();
        for index in 0..n_workspaces {
            let watch = self.allocate();
            self.watches.push(watch);
            actions.push(CoreAction::WatchWorkspace { index, watch });
        }
        actions
    }

    /// A workspace was inserted at `index`.
    pub fn insert(&mut self, index: usize) -> CoreAction {
        let watch = self.allocate();
        let index = if index > self.watches.len() {
            warn!(
                "Workspace added at {} but only {} are watched, appending",
                index,
                self.watches.len()
            );
            self.watches.len()
        } else {
            index
        };
        self.watches.insert(index, watch);
        debug!("Watching workspace {} with {}", index, watch);
        CoreAction::WatchWorkspace { index, watch }
    }

    /// The workspace at `index` was removed.
    pub fn remove(&mut self, index: usize) -> Option<CoreAction> {
        if index >= self.watches.len() {
            warn!(
                "Workspace {} removed but only {} are watched",
                index,
                self.watches.len()
            );
            return None;
        }
        let watch = self.watches.remove(index);
        debug!("Dropped {} for removed workspace {}", watch, index);
        Some(CoreAction::Unwatch { watch })
    }

    /// Mirror a workspace reorder.
    pub fn reorder(&mut self, from: usize, to: usize) {
        if !move_item(&mut self.watches, from, to) {
            warn!(
                "Watch list out of step: cannot move {} to {} ({} watched)",
                from,
                to,
                self.watches.len()
            );
        }
    }

    /// Current workspace index of `watch`.
    pub fn index_of(&self, watch: WatchId) -> Option<usize> {
        self.watches.iter().position(|&w| w == watch)
    }

    /// Unsubscribe everything.
    pub fn clear(&mut self) -> Vec<CoreAction> {
        self.watches
            .drain(..)
            .map(|watch| CoreAction::Unwatch { watch })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.watches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watches.is_empty()
    }

    pub fn as_slice(&self) -> &[WatchId] {
        &self.watches
    }
}
