// src/engine/mod.rs

//! Dev-mode engine.
//!
//! This module ties together:
//! - the per-binding coalescing state ([`state::BuildState`])
//! - the main runtime event loop that reacts to:
//!   - file-watch change notifications
//!   - completion of a binding's execution
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use crate::graph::Outcome;

/// Index of a watch binding in the list registered by `dev`.
pub type BindingId = usize;

/// Events flowing into the runtime from the watcher and from executions.
#[derive(Debug)]
pub enum RuntimeEvent {
    /// A file matching the binding's patterns changed.
    Changed { binding: BindingId, path: String },
    /// An execution of the binding's target finished.
    ExecutionFinished { binding: BindingId, outcome: Outcome },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod runtime;
pub mod state;

pub use self::core::DevCore;
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::Runtime;
pub use state::{BindingKind, BindingState, BuildState, ChangeDecision};
