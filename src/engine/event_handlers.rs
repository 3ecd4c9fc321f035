// src/engine/event_handlers.rs

//! Event handling logic for the dev core.

use tracing::{error, info};

use crate::engine::BindingId;
use crate::engine::state::{BuildState, ChangeDecision};
use crate::graph::Outcome;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Start an execution of the binding's graph node.
    Execute(BindingId),
    /// Ask the preview server to reload connected clients.
    Reload,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub(crate) fn keep(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Handle a change notification for `binding`.
///
/// - Reload-only bindings reload immediately.
/// - Idle bindings start an execution.
/// - Bindings with an execution in flight record a single pending rerun.
pub fn handle_change(state: &mut BuildState, binding: BindingId, path: &str) -> CoreStep {
    let name = state
        .binding(binding)
        .map(|b| b.name().to_string())
        .unwrap_or_default();

    let commands = match state.on_change(binding) {
        ChangeDecision::Start => {
            info!(binding = %name, path, "change detected; running");
            vec![CoreCommand::Execute(binding)]
        }
        ChangeDecision::Coalesced => Vec::new(),
        ChangeDecision::Reload => {
            info!(binding = %name, path, "change detected; reloading");
            vec![CoreCommand::Reload]
        }
        ChangeDecision::Ignored => Vec::new(),
    };

    CoreStep::keep(commands)
}

/// Handle completion of `binding`'s execution.
///
/// A failure is reported and dev mode keeps waiting for the next change. A
/// success triggers a reload. A pending rerun starts right away in both cases.
pub fn handle_finished(state: &mut BuildState, binding: BindingId, outcome: &Outcome) -> CoreStep {
    let name = state
        .binding(binding)
        .map(|b| b.name().to_string())
        .unwrap_or_default();

    let mut commands = Vec::new();

    match outcome {
        Ok(report) => {
            info!(binding = %name, files = report.len(), "rebuild finished");
            commands.push(CoreCommand::Reload);
        }
        Err(failure) => {
            error!(
                binding = %name,
                step = %failure.step,
                error = %format!("{:#}", failure.cause),
                "rebuild failed; waiting for next change"
            );
        }
    }

    if state.on_finished(binding) {
        info!(binding = %name, "changes arrived during run; running again");
        commands.push(CoreCommand::Execute(binding));
    }

    CoreStep::keep(commands)
}
