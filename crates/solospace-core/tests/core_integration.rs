//! Core-only integration tests.
//!
//! These tests drive solospace-core through its event API against the
//! in-memory desktop, applying every returned action the way a backend
//! would.

use pretty_assertions::assert_eq;
use solospace_core::config::{Config, PlacementConfig};
use solospace_core::desktop::{Desktop, Window};
use solospace_core::{
    Core, CoreAction, CoreEvent, Geometry, HostView, MaximizeFlags, Relocation, SizeChange,
    WindowId, WindowInfo, WindowType,
};

const A: WindowId = WindowId(1);
const B: WindowId = WindowId(2);
const C: WindowId = WindowId(3);

fn config(maximize: bool, primary_only: bool) -> Config {
    Config {
        placement: PlacementConfig {
            move_window_when_maximized: maximize,
            workspaces_only_on_primary: primary_only,
        },
    }
}

fn apply(desktop: &mut Desktop, actions: &[CoreAction]) {
    for action in actions {
        desktop.apply(action).unwrap();
    }
}

/// Helper: enable a core against a desktop.
fn enabled(config: Config, desktop: &mut Desktop) -> Core {
    let mut core = Core::new(config);
    let actions = core.enable(&*desktop);
    apply(desktop, &actions);
    core
}

fn put(desktop: &mut Desktop, id: WindowId, monitor: usize, workspace: usize) {
    desktop
        .insert_window(Window::new(id, monitor), workspace)
        .unwrap();
}

fn order(desktop: &Desktop) -> Vec<u32> {
    desktop.workspace_order().iter().map(|ws| ws.0).collect()
}

/// Helper: run a size transition the way a compositor reports it. Flags
/// flip first, then `size-change` with the old frame, then the frame
/// changes and `size-changed` follows.
fn transition(
    core: &mut Core,
    desktop: &mut Desktop,
    id: WindowId,
    change: SizeChange,
    maximized: MaximizeFlags,
    new_rect: Geometry,
) -> Vec<CoreAction> {
    let old_rect = desktop.get(id).unwrap().geometry;
    desktop.get_mut(id).unwrap().maximized = maximized;
    let early = core.handle_event(
        &*desktop,
        CoreEvent::SizeChange {
            id,
            change,
            old_rect,
        },
    );
    assert!(early.is_empty(), "size-change must not act: {early:?}");
    desktop.get_mut(id).unwrap().geometry = new_rect;
    let actions = core.handle_event(&*desktop, CoreEvent::SizeChanged { id });
    apply(desktop, &actions);
    actions
}

fn maximize(core: &mut Core, desktop: &mut Desktop, id: WindowId) -> Vec<CoreAction> {
    let monitor = desktop.get(id).unwrap().monitor;
    let area = desktop.work_area(monitor).unwrap();
    transition(core, desktop, id, SizeChange::Maximize, MaximizeFlags::BOTH, area)
}

fn unmaximize(core: &mut Core, desktop: &mut Desktop, id: WindowId) -> Vec<CoreAction> {
    transition(
        core,
        desktop,
        id,
        SizeChange::Unmaximize,
        MaximizeFlags::empty(),
        Geometry::new(100, 100, 800, 600),
    )
}

fn assert_watches_aligned(core: &Core, desktop: &Desktop) {
    let watched = core.watches().as_slice();
    assert_eq!(watched.len(), desktop.n_workspaces());
    for (index, &watch) in watched.iter().enumerate() {
        assert_eq!(desktop.watch_for(index), Some(watch), "watch {index} misaligned");
    }
}

// ── Test 1: the two-workspace walkthrough ────────────────────────

#[test]
fn maximize_then_unmaximize_round_trips() {
    let mut desktop = Desktop::single_monitor(2);
    put(&mut desktop, A, 0, 0);
    put(&mut desktop, B, 0, 0);
    let mut core = enabled(Config::default(), &mut desktop);

    let actions = maximize(&mut core, &mut desktop, A);
    assert_eq!(
        actions,
        vec![
            CoreAction::ReorderWorkspace { from: 1, to: 0 },
            CoreAction::MoveWindow { id: B, workspace: 0 },
        ]
    );
    assert_eq!(order(&desktop), vec![1, 0]);
    assert_eq!(desktop.workspace_windows(1), vec![A]);
    assert_eq!(desktop.workspace_windows(0), vec![B]);
    assert_eq!(core.tracking().relocation(A), Some(Relocation::Forward));
    assert_watches_aligned(&core, &desktop);

    unmaximize(&mut core, &mut desktop, A);
    assert_eq!(order(&desktop), vec![0, 1]);
    assert_eq!(desktop.workspace_of(A), Some(0));
    assert_eq!(desktop.workspace_of(B), Some(0));
    assert!(!core.tracking().is_relocated(A));
    assert_watches_aligned(&core, &desktop);
    solospace_core::invariants::validate(&core, &desktop).unwrap();
}

// ── Test 2: restore happens at most once ─────────────────────────

#[test]
fn restore_is_idempotent() {
    let mut desktop = Desktop::single_monitor(2);
    put(&mut desktop, A, 0, 0);
    put(&mut desktop, B, 0, 0);
    let mut core = enabled(Config::default(), &mut desktop);
    maximize(&mut core, &mut desktop, A);

    let first = core.handle_event(&desktop, CoreEvent::WindowMinimized { id: A });
    assert_eq!(first.len(), 2);
    apply(&mut desktop, &first);

    let second = core.handle_event(&desktop, CoreEvent::WindowMinimized { id: A });
    assert!(second.is_empty());
}

// ── Test 3: nothing to free up ───────────────────────────────────

#[test]
fn lone_window_is_left_alone() {
    let mut desktop = Desktop::single_monitor(3);
    put(&mut desktop, A, 0, 0);
    let mut core = enabled(Config::default(), &mut desktop);

    assert!(maximize(&mut core, &mut desktop, A).is_empty());
    assert_eq!(order(&desktop), vec![0, 1, 2]);
    assert!(!core.tracking().is_relocated(A));
}

#[test]
fn no_free_slot_means_no_reorder() {
    let mut desktop = Desktop::single_monitor(3);
    for ws in 0..3 {
        put(&mut desktop, WindowId(10 + ws as u64), 0, ws);
        put(&mut desktop, WindowId(20 + ws as u64), 0, ws);
    }
    let mut core = enabled(Config::default(), &mut desktop);

    for ws in 0..3u64 {
        assert!(maximize(&mut core, &mut desktop, WindowId(10 + ws)).is_empty());
    }
    assert_eq!(order(&desktop), vec![0, 1, 2]);
    assert_eq!(core.tracking().relocated().count(), 0);
}

// ── Test 4: topology modes ───────────────────────────────────────

#[test]
fn primary_only_ignores_secondary_monitor() {
    let mut desktop = Desktop::dual_monitor(2);
    put(&mut desktop, A, 1, 0);
    put(&mut desktop, B, 1, 0);
    let mut core = enabled(config(true, true), &mut desktop);

    assert!(maximize(&mut core, &mut desktop, A).is_empty());
    desktop.get_mut(B).unwrap().fullscreen = true;
    desktop.get_mut(B).unwrap().maximized = MaximizeFlags::BOTH;
    assert!(core
        .handle_event(&desktop, CoreEvent::WindowMapped { id: B })
        .is_empty());
    assert_eq!(order(&desktop), vec![0, 1]);
}

#[test]
fn per_monitor_swap_keeps_other_monitor_windows() {
    let mut desktop = Desktop::dual_monitor(2);
    put(&mut desktop, A, 0, 0);
    put(&mut desktop, B, 0, 0);
    put(&mut desktop, C, 1, 0);
    let mut core = enabled(config(true, false), &mut desktop);

    maximize(&mut core, &mut desktop, A);
    assert_eq!(order(&desktop), vec![1, 0]);
    assert_eq!(desktop.workspace_of(A), Some(1));
    assert_eq!(desktop.workspace_of(B), Some(0));
    assert_eq!(desktop.workspace_of(C), Some(0));
    assert_watches_aligned(&core, &desktop);

    unmaximize(&mut core, &mut desktop, A);
    assert_eq!(order(&desktop), vec![0, 1]);
    assert_eq!(desktop.workspace_of(A), Some(0));
    assert_eq!(desktop.workspace_of(B), Some(0));
    assert_eq!(desktop.workspace_of(C), Some(0));
}

// ── Test 5: policy through the event path ────────────────────────

#[test]
fn partial_unmaximize_does_not_restore() {
    let mut desktop = Desktop::single_monitor(2);
    put(&mut desktop, A, 0, 0);
    put(&mut desktop, B, 0, 0);
    let mut core = enabled(Config::default(), &mut desktop);
    maximize(&mut core, &mut desktop, A);

    // the window gets half-tiled first, so the frame no longer fills the work area
    desktop.get_mut(A).unwrap().geometry = Geometry::new(0, 32, 960, 1048);
    assert!(unmaximize(&mut core, &mut desktop, A).is_empty());
    assert!(core.tracking().is_relocated(A));
}

#[test]
fn fullscreen_on_map_with_maximize_tracking_off() {
    let mut desktop = Desktop::single_monitor(2);
    put(&mut desktop, A, 0, 0);
    put(&mut desktop, B, 0, 0);
    let mut core = enabled(config(false, true), &mut desktop);

    desktop.get_mut(A).unwrap().maximized = MaximizeFlags::BOTH;
    assert!(core
        .handle_event(&desktop, CoreEvent::WindowMapped { id: A })
        .is_empty());

    desktop.get_mut(A).unwrap().fullscreen = true;
    let actions = core.handle_event(&desktop, CoreEvent::WindowUnminimized { id: A });
    apply(&mut desktop, &actions);
    assert_eq!(desktop.workspace_windows(desktop.workspace_of(A).unwrap()), vec![A]);
    assert!(core.tracking().is_relocated(A));
}

#[test]
fn unfullscreen_back_into_maximized_keeps_placement() {
    let mut desktop = Desktop::single_monitor(2);
    put(&mut desktop, A, 0, 0);
    put(&mut desktop, B, 0, 0);
    let mut core = enabled(Config::default(), &mut desktop);
    maximize(&mut core, &mut desktop, A);

    let area = desktop.work_area(0).unwrap();
    let actions = transition(
        &mut core,
        &mut desktop,
        A,
        SizeChange::Unfullscreen,
        MaximizeFlags::BOTH,
        area,
    );
    assert!(actions.is_empty());
    assert!(core.tracking().is_relocated(A));
}

#[test]
fn size_changed_without_pending_decision_is_ignored() {
    let mut desktop = Desktop::single_monitor(2);
    put(&mut desktop, A, 0, 0);
    put(&mut desktop, B, 0, 0);
    let mut core = enabled(Config::default(), &mut desktop);
    desktop.get_mut(A).unwrap().maximized = MaximizeFlags::BOTH;

    assert!(core
        .handle_event(&desktop, CoreEvent::SizeChanged { id: A })
        .is_empty());
}

// ── Test 6: lifecycle of tracking entries ────────────────────────

#[test]
fn destroy_restores_and_forgets_pending_transition() {
    let mut desktop = Desktop::single_monitor(2);
    put(&mut desktop, A, 0, 0);
    put(&mut desktop, B, 0, 0);
    let mut core = enabled(Config::default(), &mut desktop);
    maximize(&mut core, &mut desktop, A);

    core.handle_event(
        &desktop,
        CoreEvent::SizeChange {
            id: A,
            change: SizeChange::Unmaximize,
            old_rect: desktop.work_area(0).unwrap(),
        },
    );
    let actions = core.handle_event(&desktop, CoreEvent::WindowDestroyed { id: A });
    apply(&mut desktop, &actions);
    desktop.remove_window(A).unwrap();

    assert_eq!(order(&desktop), vec![0, 1]);
    assert_eq!(desktop.workspace_of(B), Some(0));
    assert_eq!(core.tracking().pending().count(), 0);
    solospace_core::invariants::validate(&core, &desktop).unwrap();
}

#[test]
fn destroying_window_that_became_abnormal_forgets_it() {
    let mut desktop = Desktop::single_monitor(2);
    put(&mut desktop, A, 0, 0);
    put(&mut desktop, B, 0, 0);
    let mut core = enabled(Config::default(), &mut desktop);
    maximize(&mut core, &mut desktop, A);
    assert!(core.tracking().is_relocated(A));

    desktop.get_mut(A).unwrap().window_type = WindowType::Dialog;
    let actions = core.handle_event(&desktop, CoreEvent::WindowDestroyed { id: A });
    assert!(actions.is_empty());
    desktop.remove_window(A).unwrap();

    assert!(!core.tracking().is_relocated(A));
    solospace_core::invariants::validate(&core, &desktop).unwrap();
}

#[test]
fn window_added_elsewhere_invalidates_restore() {
    let mut desktop = Desktop::single_monitor(2);
    put(&mut desktop, A, 0, 0);
    put(&mut desktop, B, 0, 0);
    let mut core = enabled(Config::default(), &mut desktop);
    maximize(&mut core, &mut desktop, A);

    // the user drags the window back onto B's workspace
    desktop.change_workspace(A, 0).unwrap();
    let watch = desktop.watch_for(0).unwrap();
    core.handle_event(&desktop, CoreEvent::WindowAdded { watch, id: A });
    assert!(!core.tracking().is_relocated(A));

    let before = order(&desktop);
    assert!(unmaximize(&mut core, &mut desktop, A).is_empty());
    assert_eq!(order(&desktop), before);
}

#[test]
fn window_added_from_unknown_watch_is_ignored() {
    let mut desktop = Desktop::single_monitor(2);
    put(&mut desktop, A, 0, 0);
    put(&mut desktop, B, 0, 0);
    let mut core = enabled(Config::default(), &mut desktop);
    maximize(&mut core, &mut desktop, A);

    core.handle_event(
        &desktop,
        CoreEvent::WindowAdded {
            watch: solospace_core::WatchId(999),
            id: A,
        },
    );
    assert!(core.tracking().is_relocated(A));
}

#[test]
fn vanished_window_is_dropped_without_reorder() {
    let mut desktop = Desktop::single_monitor(2);
    put(&mut desktop, A, 0, 0);
    put(&mut desktop, B, 0, 0);
    let mut core = enabled(Config::default(), &mut desktop);
    maximize(&mut core, &mut desktop, A);

    desktop.remove_window(A).unwrap();
    assert!(core
        .handle_event(&desktop, CoreEvent::WindowDestroyed { id: A })
        .is_empty());
    assert!(!core.tracking().is_relocated(A));
}

/// A host that has lost track of where a window's workspace went.
struct StaleWorkspaces<'a>(&'a Desktop);

impl HostView for StaleWorkspaces<'_> {
    fn n_workspaces(&self) -> usize {
        self.0.n_workspaces()
    }

    fn workspace_windows(&self, index: usize) -> Vec<WindowId> {
        self.0.workspace_windows(index)
    }

    fn window(&self, id: WindowId) -> Option<WindowInfo> {
        self.0.window(id).map(|info| WindowInfo {
            workspace: Some(99),
            ..info
        })
    }

    fn work_area(&self, monitor: usize) -> Option<Geometry> {
        self.0.work_area(monitor)
    }

    fn active_workspace(&self) -> usize {
        self.0.active_workspace()
    }

    fn n_monitors(&self) -> usize {
        self.0.n_monitors()
    }

    fn primary_monitor(&self) -> usize {
        self.0.primary_monitor()
    }
}

#[test]
fn stale_workspace_index_drops_entry() {
    let mut desktop = Desktop::single_monitor(2);
    put(&mut desktop, A, 0, 0);
    put(&mut desktop, B, 0, 0);
    let mut core = enabled(Config::default(), &mut desktop);
    maximize(&mut core, &mut desktop, A);

    let stale = StaleWorkspaces(&desktop);
    assert!(core
        .handle_event(&stale, CoreEvent::WindowMinimized { id: A })
        .is_empty());
    assert!(!core.tracking().is_relocated(A));
}

// ── Test 7: workspace watch bookkeeping ──────────────────────────

#[test]
fn watches_stay_aligned_through_add_remove_and_reorder() {
    let mut desktop = Desktop::single_monitor(3);
    put(&mut desktop, A, 0, 0);
    put(&mut desktop, B, 0, 0);
    put(&mut desktop, C, 0, 2);
    let mut core = enabled(Config::default(), &mut desktop);
    assert_watches_aligned(&core, &desktop);

    desktop.insert_workspace(1).unwrap();
    let actions = core.handle_event(&desktop, CoreEvent::WorkspaceAdded { index: 1 });
    apply(&mut desktop, &actions);
    assert_watches_aligned(&core, &desktop);

    maximize(&mut core, &mut desktop, A);
    assert_watches_aligned(&core, &desktop);

    desktop.remove_workspace(2).unwrap();
    let actions = core.handle_event(&desktop, CoreEvent::WorkspaceRemoved { index: 2 });
    assert!(matches!(actions.as_slice(), [CoreAction::Unwatch { .. }]));
    apply(&mut desktop, &actions);
    assert_watches_aligned(&core, &desktop);

    desktop.remove_workspace(0).unwrap();
    let actions = core.handle_event(&desktop, CoreEvent::WorkspaceRemoved { index: 0 });
    apply(&mut desktop, &actions);
    assert_watches_aligned(&core, &desktop);
    solospace_core::invariants::validate(&core, &desktop).unwrap();
}

#[test]
fn disable_unwatches_and_forgets() {
    let mut desktop = Desktop::single_monitor(2);
    put(&mut desktop, A, 0, 0);
    put(&mut desktop, B, 0, 0);
    let mut core = enabled(Config::default(), &mut desktop);
    maximize(&mut core, &mut desktop, A);

    let actions = core.disable();
    assert_eq!(actions.len(), 2);
    apply(&mut desktop, &actions);
    assert_eq!(desktop.watch_count(), 0);
    assert_eq!(core.tracking().relocated().count(), 0);

    // events are ignored until re-enabled
    assert!(core
        .handle_event(&desktop, CoreEvent::WindowMinimized { id: A })
        .is_empty());
}

#[test]
fn set_config_takes_effect_on_next_event() {
    let mut desktop = Desktop::single_monitor(2);
    put(&mut desktop, A, 0, 0);
    put(&mut desktop, B, 0, 0);
    let mut core = enabled(config(false, true), &mut desktop);

    assert!(maximize(&mut core, &mut desktop, A).is_empty());
    core.set_config(config(true, true));
    let actions = core.handle_event(&desktop, CoreEvent::WindowMapped { id: A });
    assert_eq!(actions.len(), 2);
}
