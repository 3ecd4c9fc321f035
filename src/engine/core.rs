// src/engine/core.rs

//! Pure dev-mode state machine.
//!
//! [`DevCore`] consumes [`RuntimeEvent`]s and produces:
//! - an updated per-binding state
//! - a list of commands describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Runtime`) is responsible for reading
//! events from channels, spawning executions and talking to the preview
//! server. The core is unit tested without Tokio, channels or files.

use crate::engine::event_handlers::{CoreStep, handle_change, handle_finished};
use crate::engine::state::{BindingKind, BindingState, BuildState};
use crate::engine::{BindingId, RuntimeEvent};
use crate::watch::WatchBinding;

/// Pure core state. Owns no channels, no Tokio types, and performs no IO.
#[derive(Debug, Default)]
pub struct DevCore {
    state: BuildState,
}

impl DevCore {
    pub fn new(state: BuildState) -> Self {
        Self { state }
    }

    /// One [`BindingState`] per binding, in registration order.
    pub fn from_bindings(bindings: &[WatchBinding]) -> Self {
        let states = bindings
            .iter()
            .map(|b| {
                let kind = if b.is_reload_only() {
                    BindingKind::ReloadOnly
                } else {
                    BindingKind::Rebuild
                };
                BindingState::new(b.name(), kind)
            })
            .collect();
        Self::new(BuildState::new(states))
    }

    pub fn state(&self) -> &BuildState {
        &self.state
    }

    /// Expose whether `binding` has an execution in flight (for tests).
    pub fn is_in_flight(&self, binding: BindingId) -> bool {
        self.state
            .binding(binding)
            .is_some_and(|b| b.is_in_flight())
    }

    /// Expose whether `binding` has a coalesced rerun pending (for tests).
    pub fn rerun_requested(&self, binding: BindingId) -> bool {
        self.state
            .binding(binding)
            .is_some_and(|b| b.rerun_requested())
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::Changed { binding, path } => {
                handle_change(&mut self.state, binding, &path)
            }
            RuntimeEvent::ExecutionFinished { binding, outcome } => {
                handle_finished(&mut self.state, binding, &outcome)
            }
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}
