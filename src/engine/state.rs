// src/engine/state.rs

use tracing::debug;

use crate::engine::BindingId;

/// How a binding reacts to a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// Re-execute the binding's graph node.
    Rebuild,
    /// Only reload the preview.
    ReloadOnly,
}

/// Per-binding execution state.
///
/// Invariant: `rerun_requested` is only ever true while `in_flight` is true.
#[derive(Debug, Clone)]
pub struct BindingState {
    name: String,
    kind: BindingKind,
    in_flight: bool,
    rerun_requested: bool,
}

impl BindingState {
    pub fn new(name: impl Into<String>, kind: BindingKind) -> Self {
        Self {
            name: name.into(),
            kind,
            in_flight: false,
            rerun_requested: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> BindingKind {
        self.kind
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn rerun_requested(&self) -> bool {
        self.rerun_requested
    }
}

/// What to do with a change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeDecision {
    /// Nothing in flight: start an execution now.
    Start,
    /// An execution is in flight: remember that another run is needed.
    Coalesced,
    /// Reload-only binding: no execution, just reload.
    Reload,
    /// Unknown binding id.
    Ignored,
}

/// Process-wide dev state: one [`BindingState`] per watch binding.
///
/// Guarantees at most one execution per binding at a time, and that any
/// number of changes arriving during an execution collapse into exactly one
/// follow-up run.
#[derive(Debug, Default)]
pub struct BuildState {
    bindings: Vec<BindingState>,
}

impl BuildState {
    pub fn new(bindings: Vec<BindingState>) -> Self {
        Self { bindings }
    }

    pub fn binding(&self, id: BindingId) -> Option<&BindingState> {
        self.bindings.get(id)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// True when no binding has an execution in flight.
    pub fn is_idle(&self) -> bool {
        self.bindings.iter().all(|b| !b.in_flight)
    }

    /// Record a change notification for `id`.
    pub fn on_change(&mut self, id: BindingId) -> ChangeDecision {
        let Some(state) = self.bindings.get_mut(id) else {
            return ChangeDecision::Ignored;
        };

        match state.kind {
            BindingKind::ReloadOnly => ChangeDecision::Reload,
            BindingKind::Rebuild if !state.in_flight => {
                state.in_flight = true;
                ChangeDecision::Start
            }
            BindingKind::Rebuild => {
                let first = !state.rerun_requested;
                state.rerun_requested = true;
                debug!(
                    binding = %state.name,
                    first,
                    "execution in flight; change coalesced into next run"
                );
                ChangeDecision::Coalesced
            }
        }
    }

    /// Record that the in-flight execution of `id` finished.
    ///
    /// Returns true if a coalesced rerun must start now; the binding then
    /// stays in flight.
    pub fn on_finished(&mut self, id: BindingId) -> bool {
        let Some(state) = self.bindings.get_mut(id) else {
            return false;
        };

        if state.rerun_requested {
            state.rerun_requested = false;
            state.in_flight = true;
            true
        } else {
            state.in_flight = false;
            false
        }
    }
}
