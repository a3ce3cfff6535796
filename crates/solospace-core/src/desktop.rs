//! In-memory desktop.
//!
//! A reference [`HostView`] that models monitors, an ordered workspace list
//! with stable identities, and windows. Backends for real display servers
//! do not need it; the sim backend and the test-suite drive the core
//! against it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::event::CoreAction;
use crate::host::HostView;
use crate::watch::WatchId;
use crate::window::{Geometry, MaximizeFlags, WindowId, WindowInfo, WindowType};

/// Stable identity of a workspace, independent of its position in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkspaceId(pub u32);

impl std::fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ws:{}", self.0)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DesktopError {
    #[error("Workspace index {index} out of range ({count} workspaces)")]
    WorkspaceOutOfRange { index: usize, count: usize },

    #[error("Window {0} does not exist")]
    UnknownWindow(WindowId),

    #[error("Window {0} already exists")]
    DuplicateWindow(WindowId),

    #[error("Workspace {0} is listed twice")]
    DuplicateWorkspace(WorkspaceId),

    #[error("Monitor {0} does not exist")]
    UnknownMonitor(usize),

    #[error("Cannot remove the last workspace")]
    LastWorkspace,
}

/// Monitor geometry and the work area left over by panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monitor {
    pub geometry: Geometry,
    pub work_area: Geometry,
}

impl Monitor {
    pub const fn new(geometry: Geometry, work_area: Geometry) -> Self {
        Self {
            geometry,
            work_area,
        }
    }
}

/// A window as the desktop stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub id: WindowId,
    #[serde(default)]
    pub monitor: usize,
    #[serde(default)]
    pub window_type: WindowType,
    #[serde(default)]
    pub maximized: MaximizeFlags,
    #[serde(default)]
    pub fullscreen: bool,
    #[serde(default)]
    pub on_all_workspaces: bool,
    #[serde(default)]
    pub minimized: bool,
    #[serde(default)]
    pub geometry: Geometry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_geometry: Option<Geometry>,
}

impl Window {
    pub fn new(id: WindowId, monitor: usize) -> Self {
        Self {
            id,
            monitor,
            window_type: WindowType::Normal,
            maximized: MaximizeFlags::empty(),
            fullscreen: false,
            on_all_workspaces: false,
            minimized: false,
            geometry: Geometry::new(0, 0, 800, 600),
            saved_geometry: None,
        }
    }
}

/// One slot of the ordered workspace list.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Workspace {
    id: WorkspaceId,
    windows: Vec<WindowId>,
}

/// Serializable description of a desktop: what scenarios load and what the
/// CLI prints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesktopLayout {
    #[serde(default = "default_monitors")]
    pub monitors: Vec<Monitor>,
    #[serde(default)]
    pub primary_monitor: usize,
    #[serde(default)]
    pub active_workspace: usize,
    #[serde(default)]
    pub workspaces: Vec<WorkspaceLayout>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkspaceLayout {
    /// Identity; assigned from the position when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<WorkspaceId>,
    #[serde(default)]
    pub windows: Vec<Window>,
}

impl Default for DesktopLayout {
    fn default() -> Self {
        Self {
            monitors: default_monitors(),
            primary_monitor: 0,
            active_workspace: 0,
            workspaces: vec![WorkspaceLayout::default()],
        }
    }
}

fn default_monitors() -> Vec<Monitor> {
    vec![Monitor::new(
        Geometry::new(0, 0, 1920, 1080),
        Geometry::new(0, 32, 1920, 1048),
    )]
}

/// The in-memory desktop.
#[derive(Debug, Clone)]
pub struct Desktop {
    monitors: Vec<Monitor>,
    primary: usize,
    workspaces: Vec<Workspace>,
    windows: IndexMap<WindowId, Window>,
    /// Windows shown on every workspace.
    sticky: Vec<WindowId>,
    active: WorkspaceId,
    watches: IndexMap<WatchId, WorkspaceId>,
    next_workspace: u32,
}

impl Desktop {
    /// A desktop with `n_workspaces` empty workspaces on the given monitors.
    pub fn new(monitors: Vec<Monitor>, n_workspaces: usize) -> Self {
        let n = n_workspaces.max(1);
        let workspaces: Vec<Workspace> = (0..n)
            .map(|i| Workspace {
                id: WorkspaceId(i as u32),
                windows: Vec::new(),
            })
            .collect();
        Self {
            monitors,
            primary: 0,
            active: workspaces[0].id,
            workspaces,
            windows: IndexMap::new(),
            sticky: Vec::new(),
            watches: IndexMap::new(),
            next_workspace: n as u32,
        }
    }

    /// Single 1920×1080 monitor with a top panel.
    pub fn single_monitor(n_workspaces: usize) -> Self {
        Self::new(default_monitors(), n_workspaces)
    }

    /// Two side-by-side 1920×1080 monitors, the left one primary.
    pub fn dual_monitor(n_workspaces: usize) -> Self {
        let left = Geometry::new(0, 0, 1920, 1080);
        let right = Geometry::new(1920, 0, 1920, 1080);
        Self::new(
            vec![
                Monitor::new(left, Geometry::new(0, 32, 1920, 1048)),
                Monitor::new(right, right),
            ],
            n_workspaces,
        )
    }

    pub fn from_layout(layout: DesktopLayout) -> Result<Self, DesktopError> {
        let mut desktop = Self::new(layout.monitors, layout.workspaces.len());
        if layout.primary_monitor >= desktop.monitors.len() {
            return Err(DesktopError::UnknownMonitor(layout.primary_monitor));
        }
        desktop.primary = layout.primary_monitor;

        let mut next = 0;
        for (index, ws) in layout.workspaces.into_iter().enumerate() {
            let id = ws.id.unwrap_or(WorkspaceId(index as u32));
            if desktop.workspaces[..index].iter().any(|w| w.id == id) {
                return Err(DesktopError::DuplicateWorkspace(id));
            }
            desktop.workspaces[index].id = id;
            next = next.max(id.0 + 1);
            for window in ws.windows {
                desktop.insert_window(window, index)?;
            }
        }
        desktop.next_workspace = next.max(desktop.workspaces.len() as u32);
        desktop.set_active(layout.active_workspace)?;
        Ok(desktop)
    }

    /// Snapshot of the current arrangement. Sticky windows are listed once,
    /// under the first workspace, so the snapshot loads back unchanged.
    pub fn layout(&self) -> DesktopLayout {
        DesktopLayout {
            monitors: self.monitors.clone(),
            primary_monitor: self.primary,
            active_workspace: self.active_workspace(),
            workspaces: self
                .workspaces
                .iter()
                .enumerate()
                .map(|(index, ws)| {
                    let sticky = if index == 0 { &self.sticky[..] } else { &[] };
                    WorkspaceLayout {
                        id: Some(ws.id),
                        windows: ws
                            .windows
                            .iter()
                            .chain(sticky)
                            .filter_map(|id| self.windows.get(id).cloned())
                            .collect(),
                    }
                })
                .collect(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn monitor(&self, index: usize) -> Option<&Monitor> {
        self.monitors.get(index)
    }

    pub fn get(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(&id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Result<&mut Window, DesktopError> {
        self.windows
            .get_mut(&id)
            .ok_or(DesktopError::UnknownWindow(id))
    }

    /// Current index of the workspace a window belongs to.
    pub fn workspace_of(&self, id: WindowId) -> Option<usize> {
        self.workspaces
            .iter()
            .position(|ws| ws.windows.contains(&id))
    }

    pub fn workspace_id(&self, index: usize) -> Option<WorkspaceId> {
        self.workspaces.get(index).map(|ws| ws.id)
    }

    /// Workspace identities in list order.
    pub fn workspace_order(&self) -> Vec<WorkspaceId> {
        self.workspaces.iter().map(|ws| ws.id).collect()
    }

    /// The watch subscribed on the workspace currently at `index`.
    pub fn watch_for(&self, index: usize) -> Option<WatchId> {
        let ws = self.workspace_id(index)?;
        self.watches
            .iter()
            .find_map(|(&watch, &target)| (target == ws).then_some(watch))
    }

    pub fn watch_count(&self) -> usize {
        self.watches.len()
    }

    // ── Mutations (host-side primitives) ─────────────────────────────

    pub fn set_primary_monitor(&mut self, monitor: usize) -> Result<(), DesktopError> {
        if monitor >= self.monitors.len() {
            return Err(DesktopError::UnknownMonitor(monitor));
        }
        self.primary = monitor;
        Ok(())
    }

    pub fn set_active(&mut self, index: usize) -> Result<(), DesktopError> {
        self.active = self.checked(index)?.id;
        Ok(())
    }

    /// Add a window to the workspace at `index` (sticky windows join every
    /// workspace).
    pub fn insert_window(&mut self, window: Window, index: usize) -> Result<(), DesktopError> {
        if self.windows.contains_key(&window.id) {
            return Err(DesktopError::DuplicateWindow(window.id));
        }
        if window.monitor >= self.monitors.len() {
            return Err(DesktopError::UnknownMonitor(window.monitor));
        }
        self.checked(index)?;
        let id = window.id;
        if window.on_all_workspaces {
            self.sticky.push(id);
        } else {
            self.workspaces[index].windows.push(id);
        }
        self.windows.insert(id, window);
        trace!("Inserted {} on workspace {}", id, index);
        Ok(())
    }

    pub fn remove_window(&mut self, id: WindowId) -> Result<Window, DesktopError> {
        let window = self
            .windows
            .shift_remove(&id)
            .ok_or(DesktopError::UnknownWindow(id))?;
        for ws in &mut self.workspaces {
            ws.windows.retain(|&w| w != id);
        }
        self.sticky.retain(|&w| w != id);
        Ok(window)
    }

    /// Reassign a window to the workspace at `index`.
    pub fn change_workspace(&mut self, id: WindowId, index: usize) -> Result<(), DesktopError> {
        self.checked(index)?;
        let window = self.windows.get(&id).ok_or(DesktopError::UnknownWindow(id))?;
        if window.on_all_workspaces {
            return Ok(());
        }
        for ws in &mut self.workspaces {
            ws.windows.retain(|&w| w != id);
        }
        self.workspaces[index].windows.push(id);
        Ok(())
    }

    /// Move the workspace at `from` to `to`, shifting the ones in between
    /// by one.
    pub fn reorder_workspace(&mut self, from: usize, to: usize) -> Result<(), DesktopError> {
        self.checked(from)?;
        self.checked(to)?;
        let ws = self.workspaces.remove(from);
        debug!("Reordering {} from {} to {}", ws.id, from, to);
        self.workspaces.insert(to, ws);
        Ok(())
    }

    /// Insert a fresh, empty workspace at `index` and return its identity.
    pub fn insert_workspace(&mut self, index: usize) -> Result<WorkspaceId, DesktopError> {
        if index > self.workspaces.len() {
            return Err(DesktopError::WorkspaceOutOfRange {
                index,
                count: self.workspaces.len(),
            });
        }
        let id = WorkspaceId(self.next_workspace);
        self.next_workspace += 1;
        self.workspaces.insert(
            index,
            Workspace {
                id,
                windows: Vec::new(),
            },
        );
        Ok(id)
    }

    /// Remove the workspace at `index`. Its windows fall back to the
    /// neighbouring workspace, the way compositors rescue them.
    pub fn remove_workspace(&mut self, index: usize) -> Result<WorkspaceId, DesktopError> {
        self.checked(index)?;
        if self.workspaces.len() == 1 {
            return Err(DesktopError::LastWorkspace);
        }
        let removed = self.workspaces.remove(index);
        let fallback = index.saturating_sub(1).min(self.workspaces.len() - 1);
        self.workspaces[fallback].windows.extend(removed.windows);
        if self.active == removed.id {
            self.active = self.workspaces[fallback].id;
        }
        self.watches.retain(|_, ws| *ws != removed.id);
        Ok(removed.id)
    }

    /// Apply one action returned by the core.
    pub fn apply(&mut self, action: &CoreAction) -> Result<(), DesktopError> {
        match *action {
            CoreAction::ReorderWorkspace { from, to } => self.reorder_workspace(from, to),
            CoreAction::MoveWindow { id, workspace } => self.change_workspace(id, workspace),
            CoreAction::WatchWorkspace { index, watch } => {
                let ws = self.checked(index)?.id;
                self.watches.insert(watch, ws);
                Ok(())
            },
            CoreAction::Unwatch { watch } => {
                self.watches.shift_remove(&watch);
                Ok(())
            },
        }
    }

    fn checked(&self, index: usize) -> Result<&Workspace, DesktopError> {
        self.workspaces
            .get(index)
            .ok_or(DesktopError::WorkspaceOutOfRange {
                index,
                count: self.workspaces.len(),
            })
    }
}

impl HostView for Desktop {
    fn n_workspaces(&self) -> usize {
        self.workspaces.len()
    }

    fn workspace_windows(&self, index: usize) -> Vec<WindowId> {
        self.workspaces
            .get(index)
            .map(|ws| ws.windows.iter().chain(self.sticky.iter()).copied().collect())
            .unwrap_or_default()
    }

    fn window(&self, id: WindowId) -> Option<WindowInfo> {
        let window = self.windows.get(&id)?;
        Some(WindowInfo {
            id,
            monitor: window.monitor,
            workspace: self.workspace_of(id),
            window_type: window.window_type,
            maximized: window.maximized,
            fullscreen: window.fullscreen,
            on_all_workspaces: window.on_all_workspaces,
        })
    }

    fn work_area(&self, monitor: usize) -> Option<Geometry> {
        self.monitors.get(monitor).map(|m| m.work_area)
    }

    fn active_workspace(&self) -> usize {
        self.workspaces
            .iter()
            .position(|ws| ws.id == self.active)
            .unwrap_or(0)
    }

    fn n_monitors(&self) -> usize {
        self.monitors.len()
    }

    fn primary_monitor(&self) -> usize {
        self.primary
    }
}
