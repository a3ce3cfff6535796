//! Invariant validation for the core state.
//!
//! Only meaningful once the backend has applied every action returned by
//! the last call into [`Core`].

use crate::host::HostView;
use crate::window::WindowId;
use crate::Core;

/// Error indicating which invariant was violated.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvariantError {
    #[error("Watching {watched} workspaces but the host has {workspaces}")]
    WatchCountMismatch { watched: usize, workspaces: usize },

    #[error("Relocated window {0} no longer exists")]
    RelocatedWindowMissing(WindowId),

    #[error("Window {0} has a pending transition but no longer exists")]
    PendingWindowMissing(WindowId),
}

/// Validate all core invariants. Returns the first violation found.
pub fn validate(core: &Core, view: &impl HostView) -> Result<(), InvariantError> {
    // 1. One watch per workspace while enabled
    if core.is_enabled() && core.watches().len() != view.n_workspaces() {
        return Err(InvariantError::WatchCountMismatch {
            watched: core.watches().len(),
            workspaces: view.n_workspaces(),
        });
    }

    // 2. Tracked windows exist
    if let Some((id, _)) = core
        .tracking()
        .relocated()
        .find(|&(id, _)| view.window(id).is_none())
    {
        return Err(InvariantError::RelocatedWindowMissing(id));
    }

    if let Some((id, _)) = core
        .tracking()
        .pending()
        .find(|&(id, _)| view.window(id).is_none())
    {
        return Err(InvariantError::PendingWindowMissing(id));
    }

    Ok(())
}
