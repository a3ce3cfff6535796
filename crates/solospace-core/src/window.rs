//! Window types.
//!
//! Protocol-agnostic view of a host window. The core never owns windows; it
//! reads these snapshots through [`HostView`](crate::host::HostView).

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Unique, opaque identifier for a host window.
///
/// Backends maintain a mapping from their protocol-specific handle to this
/// ID. Core never sees protocol handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(pub u64);

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "win:{}", self.0)
    }
}

bitflags! {
    /// Maximize directions currently applied to a window.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct MaximizeFlags: u8 {
        const HORIZONTAL = 0b01;
        const VERTICAL   = 0b10;
        const BOTH       = Self::HORIZONTAL.bits() | Self::VERTICAL.bits();
    }
}

/// Window type hints. Only [`WindowType::Normal`] windows are ever placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowType {
    #[default]
    Normal,
    Dialog,
    ModalDialog,
    Utility,
    Toolbar,
    Splash,
    Menu,
    DropdownMenu,
    PopupMenu,
    Tooltip,
    Notification,
    Dock,
    Desktop,
}

/// A rectangular region in layout coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Snapshot of the window properties the placement engine consults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    pub id: WindowId,
    /// Monitor index the window sits on.
    pub monitor: usize,
    /// Index of the workspace the window belongs to, if it belongs to one.
    pub workspace: Option<usize>,
    pub window_type: WindowType,
    pub maximized: MaximizeFlags,
    pub fullscreen: bool,
    pub on_all_workspaces: bool,
}

impl WindowInfo {
    /// Normal-type window that lives on a single workspace.
    pub fn is_normal(&self) -> bool {
        self.window_type == WindowType::Normal && !self.on_all_workspaces
    }

    pub fn is_fully_maximized(&self) -> bool {
        self.maximized == MaximizeFlags::BOTH
    }

    /// Whether this window counts towards a workspace's occupancy on `monitor`.
    pub fn occupies(&self, monitor: usize) -> bool {
        !self.on_all_workspaces && self.monitor == monitor
    }
}
