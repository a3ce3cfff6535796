//! Solospace Core — Protocol-agnostic workspace placement engine
//!
//! When a window becomes fullscreen (or maximized, if enabled) while other
//! windows share its workspace, the workspace list is reordered so that the
//! window gets a workspace to itself on its monitor. When it leaves that
//! state, is minimized or destroyed, the reordering is undone.
//!
//! Backends translate compositor signals into [`CoreEvent`]s, feed them to
//! [`Core`] together with a read-only [`HostView`], and apply the returned
//! [`CoreAction`]s in order.
//!
//! # Quick Start
//! ```
//! use solospace_core::config::Config;
//! use solospace_core::desktop::{Desktop, Window};
//! use solospace_core::{Core, CoreEvent, HostView, MaximizeFlags, WindowId};
//!
//! let mut desktop = Desktop::single_monitor(2);
//! desktop.insert_window(Window::new(WindowId(1), 0), 0).unwrap();
//! desktop.insert_window(Window::new(WindowId(2), 0), 0).unwrap();
//!
//! let mut core = Core::new(Config::default());
//! for action in core.enable(&desktop) {
//!     desktop.apply(&action).unwrap();
//! }
//!
//! // Window 1 is maximized
//! desktop.get_mut(WindowId(1)).unwrap().maximized = MaximizeFlags::BOTH;
//! let actions = core.handle_event(&desktop, CoreEvent::WindowMapped { id: WindowId(1) });
//! for action in &actions {
//!     desktop.apply(action).unwrap();
//! }
//!
//! assert_eq!(desktop.workspace_windows(desktop.workspace_of(WindowId(1)).unwrap()), vec![WindowId(1)]);
//! ```

pub mod config;
pub mod desktop;
pub mod event;
pub mod host;
pub mod invariants;
pub mod policy;
pub mod reorder;
pub mod topology;
pub mod tracking;
pub mod watch;
pub mod window;

// Re-export primary API types at crate root
pub use event::{CoreAction, CoreEvent, SizeChange};
pub use host::HostView;
pub use tracking::{PendingTransition, Relocation};
pub use watch::WatchId;
pub use window::{Geometry, MaximizeFlags, WindowId, WindowInfo, WindowType};

use tracing::{debug, info, trace, warn};

use config::Config;
use reorder::Plan;
use tracking::TrackingTable;
use watch::WorkspaceWatches;

/// The placement engine.
///
/// Owns the tracking tables and the workspace watch list for as long as it
/// is enabled. Everything else lives in the host.
#[derive(Debug)]
pub struct Core {
    config: Config,
    tracking: TrackingTable,
    watches: WorkspaceWatches,
    enabled: bool,
}

impl Core {
    /// Create a disabled engine with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            tracking: TrackingTable::new(),
            watches: WorkspaceWatches::new(),
            enabled: false,
        }
    }

    /// Start handling events. Subscribes every existing workspace.
    pub fn enable(&mut self, view: &impl HostView) -> Vec<CoreAction> {
        self.enabled = true;
        self.tracking.clear();
        let actions = self.watches.subscribe_all(view.n_workspaces());
        info!("Enabled, watching {} workspaces", self.watches.len());
        actions
    }

    /// Stop handling events, drop all subscriptions and forget every window.
    pub fn disable(&mut self) -> Vec<CoreAction> {
        self.enabled = false;
        self.tracking.clear();
        let actions = self.watches.clear();
        info!("Disabled");
        actions
    }

    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Replace the configuration (settings store changed).
    pub fn set_config(&mut self, config: Config) {
        debug!("Configuration changed: {:?}", config);
        self.config = config;
    }

    pub const fn tracking(&self) -> &TrackingTable {
        &self.tracking
    }

    pub const fn watches(&self) -> &WorkspaceWatches {
        &self.watches
    }

    // ── Event handling (backend → core) ──────────────────────────────

    /// Process a backend event. Returns actions the backend must apply.
    pub fn handle_event(&mut self, view: &impl HostView, event: CoreEvent) -> Vec<CoreAction> {
        if !self.enabled {
            trace!("Ignoring {:?} while disabled", event);
            return Vec::new();
        }

        match event {
            CoreEvent::WindowMapped { id } | CoreEvent::WindowUnminimized { id } => {
                self.on_window_shown(view, id)
            },

            CoreEvent::WindowMinimized { id } => self.on_window_hidden(view, id),

            CoreEvent::WindowDestroyed { id } => {
                self.tracking.consume_pending(id);
                let actions = self.on_window_hidden(view, id);
                // windows that stopped being normal are never restored
                self.tracking.clear_relocated(id);
                actions
            },

            CoreEvent::SizeChange {
                id,
                change,
                old_rect,
            } => {
                self.on_size_change(view, id, change, old_rect);
                Vec::new()
            },

            CoreEvent::SizeChanged { id } => self.on_size_changed(view, id),

            CoreEvent::WorkspaceAdded { index } => vec![self.watches.insert(index)],

            CoreEvent::WorkspaceRemoved { index } => {
                self.watches.remove(index).into_iter().collect()
            },

            CoreEvent::WindowAdded { watch, id } => {
                self.on_window_added(watch, id);
                Vec::new()
            },
        }
    }

    // ── Event handlers ───────────────────────────────────────────────

    fn on_window_shown(&mut self, view: &impl HostView, id: WindowId) -> Vec<CoreAction> {
        let Some(window) = view.window(id) else {
            return Vec::new();
        };
        if policy::should_place(&window, &self.config.placement) {
            self.place_on_workspace(view, &window)
        } else {
            Vec::new()
        }
    }

    fn on_window_hidden(&mut self, view: &impl HostView, id: WindowId) -> Vec<CoreAction> {
        match view.window(id) {
            Some(window) if window.is_normal() => self.back_to(view, &window),
            Some(_) => Vec::new(),
            None => {
                if self.tracking.clear_relocated(id).is_some() {
                    warn!("{} vanished before it could be restored", id);
                }
                Vec::new()
            },
        }
    }

    fn on_size_change(
        &mut self,
        view: &impl HostView,
        id: WindowId,
        change: SizeChange,
        old_rect: Geometry,
    ) {
        let Some(window) = view.window(id) else {
            return;
        };
        let placement = &self.config.placement;
        if policy::should_place_on_change(&window, placement, change) {
            trace!("{} will be placed once {:?} completes", id, change);
            self.tracking.mark_pending(id, PendingTransition::ToPlace);
        } else if policy::should_place_back_on_change(
            &window,
            placement,
            change,
            old_rect,
            view.work_area(window.monitor),
        ) {
            trace!("{} will be placed back once {:?} completes", id, change);
            self.tracking.mark_pending(id, PendingTransition::ToPlaceBack);
        }
    }

    fn on_size_changed(&mut self, view: &impl HostView, id: WindowId) -> Vec<CoreAction> {
        let Some(pending) = self.tracking.consume_pending(id) else {
            return Vec::new();
        };
        let Some(window) = view.window(id) else {
            return Vec::new();
        };
        match pending {
            PendingTransition::ToPlace => self.place_on_workspace(view, &window),
            PendingTransition::ToPlaceBack => self.back_to(view, &window),
        }
    }

    fn on_window_added(&mut self, watch: WatchId, id: WindowId) {
        let Some(index) = self.watches.index_of(watch) else {
            trace!("Ignoring window-added from unknown {}", watch);
            return;
        };
        // a tracked window landing on a workspace means someone moved it
        // by hand; its old arrangement is no longer ours to restore
        if self.tracking.clear_relocated(id).is_some() {
            info!("{} was added to workspace {}, no longer restoring it", id, index);
        }
    }

    // ── Placement ────────────────────────────────────────────────────

    fn place_on_workspace(&mut self, view: &impl HostView, window: &WindowInfo) -> Vec<CoreAction> {
        match reorder::place(view, &self.config.placement, window) {
            Ok(placed) => {
                info!("Placing {} on its own workspace ({:?})", window.id, placed.relocation);
                self.tracking.mark_relocated(window.id, placed.relocation);
                self.commit(placed.plan)
            },
            Err(skip) => {
                debug!("Not placing {}: {:?}", window.id, skip);
                Vec::new()
            },
        }
    }

    fn back_to(&mut self, view: &impl HostView, window: &WindowInfo) -> Vec<CoreAction> {
        // consumed up front: a restore is attempted at most once
        let Some(relocation) = self.tracking.clear_relocated(window.id) else {
            return Vec::new();
        };
        match reorder::restore(view, &self.config.placement, window) {
            Ok(plan) => {
                info!("Restoring {} (placed {:?})", window.id, relocation);
                self.commit(plan)
            },
            Err(reorder::Skip::StaleWorkspace(index)) => {
                warn!("Dropping {}: workspace {} no longer exists", window.id, index);
                Vec::new()
            },
            Err(skip) => {
                debug!("Not restoring {}: {:?}", window.id, skip);
                Vec::new()
            },
        }
    }

    /// Mirror the plan's workspace moves on the watch list and hand the
    /// actions over.
    fn commit(&mut self, plan: Plan) -> Vec<CoreAction> {
        for (from, to) in plan.reorders() {
            self.watches.reorder(from, to);
        }
        plan.actions
    }
}
