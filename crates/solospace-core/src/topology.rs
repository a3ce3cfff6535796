//! Monitor/workspace slot queries.
//!
//! A workspace is *occupied* on a monitor when at least one of its windows
//! that is not shown on all workspaces sits on that monitor.

use crate::config::PlacementConfig;
use crate::host::HostView;

/// How workspaces are spread over monitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyMode {
    /// Only the primary monitor switches workspaces (this includes the
    /// single-monitor case).
    PrimaryOnly,
    /// Every monitor has its own view of every workspace.
    PerMonitor,
}

impl TopologyMode {
    pub fn detect(config: &PlacementConfig, view: &impl HostView) -> Self {
        if config.workspaces_only_on_primary || view.n_monitors() == 1 {
            Self::PrimaryOnly
        } else {
            Self::PerMonitor
        }
    }
}

/// Number of windows occupying the workspace at `index` on `monitor`.
pub fn occupancy(view: &impl HostView, index: usize, monitor: usize) -> usize {
    view.workspace_window_infos(index)
        .iter()
        .filter(|w| w.occupies(monitor))
        .count()
}

/// First workspace, in ascending order, with nothing on `monitor`.
pub fn first_free_slot(view: &impl HostView, monitor: usize) -> Option<usize> {
    (0..view.n_workspaces()).find(|&i| occupancy(view, i, monitor) == 0)
}

/// Nearest occupied workspace on `monitor`, looking below `from` (closest
/// first) before looking above it.
pub fn last_occupied_slot(view: &impl HostView, from: usize, monitor: usize) -> Option<usize> {
    let n = view.n_workspaces();
    (0..from.min(n))
        .rev()
        .chain(from.saturating_add(1)..n)
        .find(|&i| occupancy(view, i, monitor) > 0)
}
