//! Protocol-agnostic events and actions.
//!
//! [`CoreEvent`] represents what the backend tells core.
//! [`CoreAction`] represents what core tells the backend to do.

use serde::{Deserialize, Serialize};

use crate::watch::WatchId;
use crate::window::{Geometry, WindowId};

/// Kind of size transition a window is going through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeChange {
    Maximize,
    Unmaximize,
    Fullscreen,
    Unfullscreen,
}

/// Events that a backend sends to the core engine.
///
/// Backends translate compositor signals into these variants and deliver
/// them in the order the compositor emitted them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    /// A window has been mapped (appeared).
    WindowMapped { id: WindowId },

    WindowMinimized { id: WindowId },

    WindowUnminimized { id: WindowId },

    /// A window is being destroyed. The host still answers queries about it.
    WindowDestroyed { id: WindowId },

    /// A size transition started. Maximize flags already reflect the
    /// requested state; `old_rect` is the frame before the transition.
    SizeChange {
        id: WindowId,
        change: SizeChange,
        old_rect: Geometry,
    },

    /// The size transition of a window completed.
    SizeChanged { id: WindowId },

    /// A workspace was inserted at `index`.
    WorkspaceAdded { index: usize },

    /// The workspace at `index` was removed.
    WorkspaceRemoved { index: usize },

    /// A window was added to the workspace subscribed under `watch`.
    WindowAdded { watch: WatchId, id: WindowId },
}

/// Actions that core returns to the backend for execution.
///
/// Backends must apply them in order: indices in later actions assume the
/// earlier ones already took effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CoreAction {
    /// Move the workspace at `from` to `to`, shifting the ones in between.
    ReorderWorkspace { from: usize, to: usize },

    /// Reassign a window to the workspace at `workspace`.
    MoveWindow { id: WindowId, workspace: usize },

    /// Start delivering [`CoreEvent::WindowAdded`] for the workspace at
    /// `index`, tagged with `watch`.
    WatchWorkspace { index: usize, watch: WatchId },

    /// Stop delivering events for `watch`.
    Unwatch { watch: WatchId },
}
