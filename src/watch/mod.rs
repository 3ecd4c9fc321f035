// src/watch/mod.rs

//! File watching for `dev`.
//!
//! This module is responsible for:
//! - Compiling each watch binding's glob patterns against its base directory.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Turning raw filesystem events into `RuntimeEvent::Changed` per binding.
//!
//! It does **not** decide whether a change starts a run; coalescing lives in
//! the engine.

pub mod event_handler;
pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use patterns::{BindingAction, WatchBinding};
pub use watcher::{spawn_watcher, WatcherHandle};
