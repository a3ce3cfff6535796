//! Read-only view of the host environment.
//!
//! Backends implement [`HostView`] over whatever the display server exposes.
//! Every mutation goes the other way, as a [`CoreAction`](crate::CoreAction).

use crate::window::{Geometry, WindowId, WindowInfo};

/// Queries the core needs from the windowing environment.
pub trait HostView {
    /// Number of workspaces in the ordered workspace list.
    fn n_workspaces(&self) -> usize;

    /// Windows that belong to the workspace at `index`. Empty for an
    /// out-of-range index.
    fn workspace_windows(&self, index: usize) -> Vec<WindowId>;

    /// Snapshot of a window, or `None` if the host no longer knows it.
    fn window(&self, id: WindowId) -> Option<WindowInfo>;

    /// Work area (monitor minus panels) of the monitor at `monitor`.
    fn work_area(&self, monitor: usize) -> Option<Geometry>;

    /// Index of the active workspace.
    fn active_workspace(&self) -> usize;

    fn n_monitors(&self) -> usize;

    fn primary_monitor(&self) -> usize;

    /// Snapshots of every window on the workspace at `index`.
    fn workspace_window_infos(&self, index: usize) -> Vec<WindowInfo> {
        self.workspace_windows(index)
            .into_iter()
            .filter_map(|id| self.window(id))
            .collect()
    }
}
