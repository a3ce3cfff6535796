//! Solospace Sim Backend — Adapter between an in-memory desktop and
//! solospace-core.
//!
//! This crate:
//! - Owns the [`Desktop`] standing in for a compositor.
//! - Performs host operations (maximize, minimize, workspace changes...) on
//!   it and emits the [`CoreEvent`]s a compositor would, in the same order.
//! - Applies returned [`CoreAction`]s back to the desktop.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use solospace_core::config::{Config, PlacementConfig};
use solospace_core::desktop::{Desktop, DesktopError, Window};
use solospace_core::{
    Core, CoreAction, CoreEvent, Geometry, HostView, MaximizeFlags, SizeChange, WindowId,
};

/// One host operation in a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Map {
        window: Window,
        #[serde(default)]
        workspace: usize,
    },
    Maximize {
        id: WindowId,
        #[serde(default = "both")]
        directions: MaximizeFlags,
    },
    Unmaximize {
        id: WindowId,
    },
    Fullscreen {
        id: WindowId,
    },
    Unfullscreen {
        id: WindowId,
    },
    Minimize {
        id: WindowId,
    },
    Unminimize {
        id: WindowId,
    },
    Destroy {
        id: WindowId,
    },
    MoveToWorkspace {
        id: WindowId,
        workspace: usize,
    },
    AddWorkspace {
        #[serde(default)]
        index: Option<usize>,
    },
    RemoveWorkspace {
        index: usize,
    },
    Activate {
        workspace: usize,
    },
    Configure {
        placement: PlacementConfig,
    },
}

const fn both() -> MaximizeFlags {
    MaximizeFlags::BOTH
}

/// The backend adapter.
pub struct SimBackend {
    core: Core,
    desktop: Desktop,
}

impl SimBackend {
    /// Wrap `desktop` and enable a core on it.
    pub fn new(config: Config, desktop: Desktop) -> Self {
        let mut backend = Self {
            core: Core::new(config),
            desktop,
        };
        let actions = backend.core.enable(&backend.desktop);
        backend.apply_actions(&actions);
        backend
    }

    pub const fn core(&self) -> &Core {
        &self.core
    }

    pub const fn desktop(&self) -> &Desktop {
        &self.desktop
    }

    /// Disable the core and hand the desktop back.
    pub fn shutdown(mut self) -> Desktop {
        let actions = self.core.disable();
        self.apply_actions(&actions);
        self.desktop
    }

    /// Feed an event to the core and apply what it returns.
    pub fn dispatch(&mut self, event: CoreEvent) -> Vec<CoreAction> {
        debug!("-> {:?}", event);
        let actions = self.core.handle_event(&self.desktop, event);
        self.apply_actions(&actions);
        actions
    }

    /// Apply a list of core actions to the desktop.
    pub fn apply_actions(&mut self, actions: &[CoreAction]) {
        for action in actions {
            // reassigning a window fires the target workspace's window-added
            // signal, just like a user moving it would
            let added = match *action {
                CoreAction::MoveWindow { id, workspace }
                    if self.desktop.workspace_of(id) != Some(workspace) =>
                {
                    Some((id, workspace))
                },
                _ => None,
            };

            if let Err(e) = self.desktop.apply(action) {
                warn!("Failed to apply {:?}: {}", action, e);
                continue;
            }

            if let Some((id, workspace)) = added {
                self.notify_window_added(id, workspace);
            }
        }

        #[cfg(debug_assertions)]
        if let Err(e) = solospace_core::invariants::validate(&self.core, &self.desktop) {
            warn!("Invariant violation after applying actions: {}", e);
        }
    }

    fn notify_window_added(&mut self, id: WindowId, workspace: usize) {
        if let Some(watch) = self.desktop.watch_for(workspace) {
            self.dispatch(CoreEvent::WindowAdded { watch, id });
        }
    }

    /// Perform one host operation. Returns every action the core asked for
    /// while it ran.
    pub fn run(&mut self, step: &Step) -> Result<Vec<CoreAction>, DesktopError> {
        info!("Step: {:?}", step);
        match *step {
            Step::Map {
                ref window,
                workspace,
            } => self.map(window.clone(), workspace),
            Step::Maximize { id, directions } => self.maximize(id, directions),
            Step::Unmaximize { id } => self.unmaximize(id),
            Step::Fullscreen { id } => self.fullscreen(id),
            Step::Unfullscreen { id } => self.unfullscreen(id),
            Step::Minimize { id } => self.minimize(id),
            Step::Unminimize { id } => self.unminimize(id),
            Step::Destroy { id } => self.destroy(id),
            Step::MoveToWorkspace { id, workspace } => self.move_to_workspace(id, workspace),
            Step::AddWorkspace { index } => self.add_workspace(index),
            Step::RemoveWorkspace { index } => self.remove_workspace(index),
            Step::Activate { workspace } => {
                self.desktop.set_active(workspace)?;
                Ok(Vec::new())
            },
            Step::Configure { ref placement } => {
                self.core.set_config(Config {
                    placement: placement.clone(),
                });
                Ok(Vec::new())
            },
        }
    }

    // ── Host operations ──────────────────────────────────────────────

    pub fn map(&mut self, window: Window, workspace: usize) -> Result<Vec<CoreAction>, DesktopError> {
        let id = window.id;
        let sticky = window.on_all_workspaces;
        self.desktop.insert_window(window, workspace)?;
        if !sticky {
            self.notify_window_added(id, workspace);
        }
        Ok(self.dispatch(CoreEvent::WindowMapped { id }))
    }

    pub fn maximize(
        &mut self,
        id: WindowId,
        directions: MaximizeFlags,
    ) -> Result<Vec<CoreAction>, DesktopError> {
        let area = self.work_area_of(id)?;
        self.resize(
            id,
            SizeChange::Maximize,
            |window| {
                window.maximized = directions;
            },
            |frame, _| maximized_rect(area, frame, directions),
        )
    }

    pub fn unmaximize(&mut self, id: WindowId) -> Result<Vec<CoreAction>, DesktopError> {
        self.resize(
            id,
            SizeChange::Unmaximize,
            |window| window.maximized = MaximizeFlags::empty(),
            |frame, saved| saved.unwrap_or(frame),
        )
    }

    pub fn fullscreen(&mut self, id: WindowId) -> Result<Vec<CoreAction>, DesktopError> {
        let monitor = self.desktop.get_mut(id)?.monitor;
        let screen = self
            .desktop
            .monitor(monitor)
            .ok_or(DesktopError::UnknownMonitor(monitor))?
            .geometry;
        self.resize(
            id,
            SizeChange::Fullscreen,
            |window| window.fullscreen = true,
            |_, _| screen,
        )
    }

    pub fn unfullscreen(&mut self, id: WindowId) -> Result<Vec<CoreAction>, DesktopError> {
        let area = self.work_area_of(id)?;
        let maximized = self.desktop.get_mut(id)?.maximized;
        self.resize(
            id,
            SizeChange::Unfullscreen,
            |window| window.fullscreen = false,
            |frame, saved| {
                if maximized.is_empty() {
                    saved.unwrap_or(frame)
                } else {
                    maximized_rect(area, saved.unwrap_or(frame), maximized)
                }
            },
        )
    }

    pub fn minimize(&mut self, id: WindowId) -> Result<Vec<CoreAction>, DesktopError> {
        self.desktop.get_mut(id)?.minimized = true;
        Ok(self.dispatch(CoreEvent::WindowMinimized { id }))
    }

    pub fn unminimize(&mut self, id: WindowId) -> Result<Vec<CoreAction>, DesktopError> {
        self.desktop.get_mut(id)?.minimized = false;
        Ok(self.dispatch(CoreEvent::WindowUnminimized { id }))
    }

    pub fn destroy(&mut self, id: WindowId) -> Result<Vec<CoreAction>, DesktopError> {
        self.desktop.get_mut(id)?;
        let actions = self.dispatch(CoreEvent::WindowDestroyed { id });
        self.desktop.remove_window(id)?;
        Ok(actions)
    }

    pub fn move_to_workspace(
        &mut self,
        id: WindowId,
        workspace: usize,
    ) -> Result<Vec<CoreAction>, DesktopError> {
        self.desktop.change_workspace(id, workspace)?;
        self.notify_window_added(id, workspace);
        Ok(Vec::new())
    }

    pub fn add_workspace(&mut self, index: Option<usize>) -> Result<Vec<CoreAction>, DesktopError> {
        let index = index.unwrap_or_else(|| self.desktop.n_workspaces());
        self.desktop.insert_workspace(index)?;
        Ok(self.dispatch(CoreEvent::WorkspaceAdded { index }))
    }

    pub fn remove_workspace(&mut self, index: usize) -> Result<Vec<CoreAction>, DesktopError> {
        let rescued: Vec<WindowId> = self
            .desktop
            .workspace_window_infos(index)
            .into_iter()
            .filter(|w| !w.on_all_workspaces)
            .map(|w| w.id)
            .collect();
        self.desktop.remove_workspace(index)?;
        let actions = self.dispatch(CoreEvent::WorkspaceRemoved { index });

        for id in rescued {
            if let Some(workspace) = self.desktop.workspace_of(id) {
                self.notify_window_added(id, workspace);
            }
        }
        Ok(actions)
    }

    // ── Helpers ──────────────────────────────────────────────────────

    fn work_area_of(&mut self, id: WindowId) -> Result<Geometry, DesktopError> {
        let monitor = self.desktop.get_mut(id)?.monitor;
        self.desktop
            .work_area(monitor)
            .ok_or(DesktopError::UnknownMonitor(monitor))
    }

    /// Run a size transition: flags change, `size-change` is emitted with the
    /// old frame, the frame changes, then `size-changed`.
    fn resize(
        &mut self,
        id: WindowId,
        change: SizeChange,
        set_state: impl FnOnce(&mut Window),
        new_frame: impl FnOnce(Geometry, Option<Geometry>) -> Geometry,
    ) -> Result<Vec<CoreAction>, DesktopError> {
        let window = self.desktop.get_mut(id)?;
        let old_rect = window.geometry;
        let was_plain = window.maximized.is_empty() && !window.fullscreen;
        if was_plain {
            window.saved_geometry = Some(old_rect);
        }
        set_state(window);

        let mut actions = self.dispatch(CoreEvent::SizeChange {
            id,
            change,
            old_rect,
        });

        let window = self.desktop.get_mut(id)?;
        let saved = window.saved_geometry;
        window.geometry = new_frame(old_rect, saved);
        if window.maximized.is_empty() && !window.fullscreen {
            window.saved_geometry = None;
        }

        actions.extend(self.dispatch(CoreEvent::SizeChanged { id }));
        Ok(actions)
    }
}

/// Frame of a window maximized in `directions` within `area`.
fn maximized_rect(area: Geometry, frame: Geometry, directions: MaximizeFlags) -> Geometry {
    let mut rect = frame;
    if directions.contains(MaximizeFlags::HORIZONTAL) {
        rect.x = area.x;
        rect.width = area.width;
    }
    if directions.contains(MaximizeFlags::VERTICAL) {
        rect.y = area.y;
        rect.height = area.height;
    }
    rect
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const A: WindowId = WindowId(1);
    const B: WindowId = WindowId(2);

    fn backend(desktop: Desktop) -> SimBackend {
        SimBackend::new(Config::default(), desktop)
    }

    fn order(backend: &SimBackend) -> Vec<u32> {
        backend
            .desktop()
            .workspace_order()
            .iter()
            .map(|ws| ws.0)
            .collect()
    }

    fn two_windows() -> SimBackend {
        let mut sim = backend(Desktop::single_monitor(2));
        sim.map(Window::new(A, 0), 0).unwrap();
        sim.map(Window::new(B, 0), 0).unwrap();
        sim
    }

    #[test]
    fn test_maximize_and_unmaximize() {
        let mut sim = two_windows();
        let actions = sim.maximize(A, MaximizeFlags::BOTH).unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(order(&sim), vec![1, 0]);
        assert_eq!(
            sim.desktop().get(A).unwrap().geometry,
            sim.desktop().work_area(0).unwrap()
        );

        sim.unmaximize(A).unwrap();
        assert_eq!(order(&sim), vec![0, 1]);
        assert_eq!(sim.desktop().workspace_of(B), Some(0));
        assert_eq!(
            sim.desktop().get(A).unwrap().geometry,
            Geometry::new(0, 0, 800, 600)
        );
    }

    #[test]
    fn test_vertical_maximize_does_nothing() {
        let mut sim = two_windows();
        assert!(sim.maximize(A, MaximizeFlags::VERTICAL).unwrap().is_empty());
        assert!(sim.unmaximize(A).unwrap().is_empty());
        assert_eq!(order(&sim), vec![0, 1]);
    }

    #[test]
    fn test_fullscreen_cycle() {
        let mut sim = two_windows();
        sim.fullscreen(A).unwrap();
        assert_eq!(sim.desktop().workspace_windows(1), vec![A]);
        sim.unfullscreen(A).unwrap();
        assert_eq!(order(&sim), vec![0, 1]);
    }

    #[test]
    fn test_moving_peer_back_blocks_restore() {
        let mut sim = two_windows();
        sim.maximize(A, MaximizeFlags::BOTH).unwrap();
        // B joins A on its workspace, so A is no longer alone
        sim.move_to_workspace(B, 1).unwrap();
        assert!(sim.minimize(A).unwrap().is_empty());
        assert!(!sim.core().tracking().is_relocated(A));
    }

    #[test]
    fn test_user_moving_placed_window_forgets_it() {
        let mut sim = two_windows();
        sim.maximize(A, MaximizeFlags::BOTH).unwrap();
        sim.move_to_workspace(A, 0).unwrap();
        assert!(!sim.core().tracking().is_relocated(A));
    }

    #[test]
    fn test_destroy_restores() {
        let mut sim = two_windows();
        sim.maximize(A, MaximizeFlags::BOTH).unwrap();
        sim.destroy(A).unwrap();
        assert_eq!(order(&sim), vec![0, 1]);
        assert!(sim.desktop().get(A).is_none());
    }

    #[test]
    fn test_workspace_churn_keeps_watches_aligned() {
        let mut sim = two_windows();
        sim.add_workspace(Some(0)).unwrap();
        sim.add_workspace(None).unwrap();
        sim.remove_workspace(1).unwrap();
        let desktop = sim.desktop();
        for (index, &watch) in sim.core().watches().as_slice().iter().enumerate() {
            assert_eq!(desktop.watch_for(index), Some(watch));
        }
        assert_eq!(sim.core().watches().len(), desktop.n_workspaces());
    }

    #[test]
    fn test_steps_parse_from_toml() {
        #[derive(Deserialize)]
        struct Steps {
            steps: Vec<Step>,
        }
        let steps: Steps = toml::from_str(
            r#"
                [[steps]]
                op = "map"
                window = { id = 3, monitor = 0 }

                [[steps]]
                op = "maximize"
                id = 3

                [[steps]]
                op = "configure"
                placement = { workspaces_only_on_primary = false }
            "#,
        )
        .unwrap();
        assert_eq!(
            steps.steps[1],
            Step::Maximize {
                id: WindowId(3),
                directions: MaximizeFlags::BOTH
            }
        );
        assert!(matches!(steps.steps[0], Step::Map { workspace: 0, .. }));
    }

    #[test]
    fn test_shutdown_unwatches() {
        let sim = two_windows();
        let desktop = sim.shutdown();
        assert_eq!(desktop.watch_count(), 0);
    }
}
