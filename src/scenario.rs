//! Scenario files: a starting desktop plus a list of host operations,
//! replayed against the placement engine.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use solospace_backend_sim::{SimBackend, Step};
use solospace_core::config::{Config, PlacementConfig};
use solospace_core::desktop::{Desktop, DesktopLayout};
use solospace_core::{CoreAction, Relocation, WindowId};

/// A replayable session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Overrides the `[placement]` section of the loaded configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<PlacementConfig>,
    pub desktop: DesktopLayout,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario: {path:?}"))?;
        Self::parse(&content).with_context(|| format!("Failed to parse scenario: {path:?}"))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: Step,
    pub actions: Vec<CoreAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of a replay.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub steps: Vec<StepReport>,
    pub desktop: DesktopLayout,
    pub relocated: Vec<(WindowId, Relocation)>,
}

/// Replay `scenario`. A step the desktop rejects is recorded and skipped.
pub fn replay(scenario: &Scenario, mut config: Config) -> Result<Report> {
    if let Some(placement) = &scenario.placement {
        config.placement = placement.clone();
    }
    let desktop =
        Desktop::from_layout(scenario.desktop.clone()).context("Invalid starting desktop")?;
    let mut backend = SimBackend::new(config, desktop);

    let mut steps = Vec::with_capacity(scenario.steps.len());
    for (n, step) in scenario.steps.iter().enumerate() {
        let report = match backend.run(step) {
            Ok(actions) => StepReport {
                step: step.clone(),
                actions,
                error: None,
            },
            Err(e) => {
                warn!("Step {} failed: {}", n, e);
                StepReport {
                    step: step.clone(),
                    actions: Vec::new(),
                    error: Some(e.to_string()),
                }
            },
        };
        steps.push(report);
    }

    let relocated = backend.core().tracking().relocated().collect();
    let desktop = backend.shutdown().layout();
    info!("Replayed {} steps", steps.len());

    Ok(Report {
        steps,
        desktop,
        relocated,
    })
}

impl Report {
    /// Human-readable rendering.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (n, step) in self.steps.iter().enumerate() {
            let _ = writeln!(out, "step {n}: {:?}", step.step);
            if let Some(error) = &step.error {
                let _ = writeln!(out, "  error: {error}");
            }
            for action in &step.actions {
                let _ = writeln!(out, "  {}", describe(action));
            }
        }

        out.push_str("workspaces:\n");
        for (index, workspace) in self.desktop.workspaces.iter().enumerate() {
            let windows: Vec<String> = workspace
                .windows
                .iter()
                .map(|w| w.id.to_string())
                .collect();
            let id = workspace
                .id
                .map_or_else(|| "?".to_string(), |id| id.to_string());
            let _ = writeln!(out, "  {index} ({id}): [{}]", windows.join(", "));
        }

        for (id, relocation) in &self.relocated {
            let _ = writeln!(out, "relocated: {id} ({relocation:?})");
        }
        out
    }
}

fn describe(action: &CoreAction) -> String {
    match *action {
        CoreAction::ReorderWorkspace { from, to } => format!("reorder workspace {from} -> {to}"),
        CoreAction::MoveWindow { id, workspace } => format!("move {id} to workspace {workspace}"),
        CoreAction::WatchWorkspace { index, watch } => format!("watch workspace {index} ({watch})"),
        CoreAction::Unwatch { watch } => format!("unwatch {watch}"),
    }
}
