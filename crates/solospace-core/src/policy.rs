//! Placement policy.
//!
//! Pure predicates deciding whether a window event should move a window to a
//! workspace of its own, or put it back.

use crate::config::PlacementConfig;
use crate::event::SizeChange;
use crate::window::{Geometry, WindowInfo};

/// Whether a window in its current state deserves a workspace of its own.
/// Used on map and unminimize, where the state is already final.
pub fn should_place(window: &WindowInfo, config: &PlacementConfig) -> bool {
    window.is_normal()
        && if config.move_window_when_maximized {
            // fullscreen windows report both maximize directions as well
            window.is_fully_maximized()
        } else {
            window.fullscreen
        }
}

/// Whether a size transition that is starting should end with the window
/// placed on its own workspace.
pub fn should_place_on_change(
    window: &WindowInfo,
    config: &PlacementConfig,
    change: SizeChange,
) -> bool {
    window.is_normal()
        && ((config.move_window_when_maximized
            && change == SizeChange::Maximize
            && window.is_fully_maximized())
            || change == SizeChange::Fullscreen)
}

/// Whether a size transition that is starting should end with the window
/// restored to where it came from.
///
/// An unmaximize only counts if the window was really filling the work area
/// before; a half-tiled window being resized is not coming back from a
/// maximize.
pub fn should_place_back_on_change(
    window: &WindowInfo,
    config: &PlacementConfig,
    change: SizeChange,
    old_rect: Geometry,
    work_area: Option<Geometry>,
) -> bool {
    if !window.is_normal() {
        return false;
    }
    match change {
        SizeChange::Unmaximize => {
            config.move_window_when_maximized && work_area == Some(old_rect)
        },
        SizeChange::Unfullscreen => {
            !config.move_window_when_maximized || !window.is_fully_maximized()
        },
        SizeChange::Maximize | SizeChange::Fullscreen => false,
    }
}
