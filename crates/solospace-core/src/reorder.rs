//! Workspace reordering.
//!
//! Decides how to shuffle the workspace list so a window ends up alone on
//! its monitor, and how to undo that later. Decisions are computed against a
//! single [`HostView`] snapshot and returned as a [`Plan`] of actions; the
//! host only offers "move one workspace to an index, shifting the others",
//! so swaps are composed from two of those moves.

use tracing::trace;

use crate::config::PlacementConfig;
use crate::event::CoreAction;
use crate::host::HostView;
use crate::topology::{first_free_slot, last_occupied_slot, TopologyMode};
use crate::tracking::Relocation;
use crate::window::{WindowId, WindowInfo};

/// Why a placement or restoration did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /// The window's workspace index is not in the workspace list.
    StaleWorkspace(usize),
    /// Nothing else shares the window's workspace on its monitor.
    NoPeers,
    /// Every workspace is occupied on the window's monitor.
    NoFreeSlot,
    /// Only the primary monitor has workspaces and the window is elsewhere.
    NotOnPrimary,
    /// Other windows moved onto the window's workspace since it was placed.
    NotAlone,
    /// No other workspace has anything on the window's monitor.
    NoOccupiedSlot,
}

/// Ordered actions the host must apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub actions: Vec<CoreAction>,
}

impl Plan {
    fn reorder(&mut self, from: usize, to: usize) {
        self.actions.push(CoreAction::ReorderWorkspace { from, to });
    }

    fn swap(&mut self, a: usize, b: usize) {
        for (from, to) in swap_moves(a, b) {
            self.reorder(from, to);
        }
    }

    fn move_windows(&mut self, windows: &[WindowId], workspace: usize) {
        self.actions.extend(
            windows
                .iter()
                .map(|&id| CoreAction::MoveWindow { id, workspace }),
        );
    }

    /// The workspace moves of this plan, in order.
    pub fn reorders(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.actions.iter().filter_map(|action| match *action {
            CoreAction::ReorderWorkspace { from, to } => Some((from, to)),
            _ => None,
        })
    }
}

/// A successful placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placed {
    pub plan: Plan,
    pub relocation: Relocation,
}

/// Move the element at `from` to `to`, shifting the ones in between by one.
/// Returns `false` and leaves `items` untouched if either index is out of
/// range.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

/// The two single-slot moves that exchange positions `a` and `b`.
///
/// After `a` moves to `b`, the element that was at `b` has shifted one step
/// towards `a`'s old position; it is moved from there to `a`.
pub const fn swap_moves(a: usize, b: usize) -> [(usize, usize); 2] {
    let shifted = if b > a { b - 1 } else { b + 1 };
    [(a, b), (shifted, a)]
}

fn current_workspace(view: &impl HostView, window: &WindowInfo) -> Result<usize, Skip> {
    let current = window
        .workspace
        .unwrap_or_else(|| view.active_workspace());
    if current < view.n_workspaces() {
        Ok(current)
    } else {
        Err(Skip::StaleWorkspace(current))
    }
}

fn others_on(
    view: &impl HostView,
    index: usize,
    window: &WindowInfo,
    filter: impl Fn(&WindowInfo) -> bool,
) -> Vec<WindowId> {
    view.workspace_window_infos(index)
        .into_iter()
        .filter(|w| w.id != window.id && !w.on_all_workspaces && filter(w))
        .map(|w| w.id)
        .collect()
}

/// Plan moving `window` onto a workspace where nothing else shares its
/// monitor. Windows that shared its workspace keep their workspace index.
///
/// The window itself is never moved: it stays on its workspace and the
/// workspace is what changes position.
pub fn place(
    view: &impl HostView,
    config: &PlacementConfig,
    window: &WindowInfo,
) -> Result<Placed, Skip> {
    let monitor = window.monitor;
    let current = current_workspace(view, window)?;

    let peers = others_on(view, current, window, |w| w.monitor == monitor);
    if peers.is_empty() {
        return Err(Skip::NoPeers);
    }

    // peers occupy `current` on this monitor, so `free` is never `current`
    let free = first_free_slot(view, monitor).ok_or(Skip::NoFreeSlot)?;

    let mut plan = Plan::default();
    let relocation = if current < free {
        Relocation::Forward
    } else {
        Relocation::Backward
    };

    match TopologyMode::detect(config, view) {
        TopologyMode::PrimaryOnly => {
            if monitor != view.primary_monitor() {
                return Err(Skip::NotOnPrimary);
            }
            match relocation {
                // the free workspace slides in front of the window's
                Relocation::Forward => plan.reorder(free, current),
                Relocation::Backward => plan.swap(current, free),
            }
            plan.move_windows(&peers, current);
        },
        TopologyMode::PerMonitor => {
            // other monitors show the same workspace index, so everything
            // on both workspaces has to stay where the user left it
            let peers_current = others_on(view, current, window, |_| true);
            let peers_free = others_on(view, free, window, |_| true);
            plan.swap(current, free);
            plan.move_windows(&peers_current, current);
            plan.move_windows(&peers_free, free);
        },
    }

    trace!(
        "Placing {} from workspace {} via free slot {}: {:?}",
        window.id,
        current,
        free,
        plan.actions
    );
    Ok(Placed { plan, relocation })
}

/// Plan collapsing the workspace of a previously placed `window` back next
/// to the nearest occupied workspace on its monitor.
pub fn restore(
    view: &impl HostView,
    config: &PlacementConfig,
    window: &WindowInfo,
) -> Result<Plan, Skip> {
    let monitor = window.monitor;
    let current = current_workspace(view, window)?;

    let mode = TopologyMode::detect(config, view);
    if mode == TopologyMode::PrimaryOnly && monitor != view.primary_monitor() {
        return Err(Skip::NotOnPrimary);
    }
    let counts = |w: &WindowInfo| mode == TopologyMode::PerMonitor || w.monitor == monitor;

    if !others_on(view, current, window, counts).is_empty() {
        return Err(Skip::NotAlone);
    }

    let last = last_occupied_slot(view, current, monitor).ok_or(Skip::NoOccupiedSlot)?;
    let peers_last = others_on(view, last, window, counts);

    let mut plan = Plan::default();
    plan.reorder(current, last);
    plan.move_windows(&peers_last, last);

    trace!(
        "Restoring {} from workspace {} next to {}: {:?}",
        window.id,
        current,
        last,
        plan.actions
    );
    Ok(plan)
}
