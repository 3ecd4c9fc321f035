// src/server/mod.rs

//! Preview server seam used by `dev`.
//!
//! The dev runtime only ever calls `init` once and `reload` after changes;
//! everything else about serving is up to the implementation.

pub mod http;

pub use http::{ServerOptions, StaticPreviewServer, RELOAD_ENDPOINT};

use crate::errors::Result;

/// Lifecycle of the live-reloading preview.
pub trait PreviewServer: Send {
    /// Start serving. Called once, after the watch bindings are registered.
    fn init(&mut self) -> Result<()>;

    /// Ask connected clients to reload.
    fn reload(&self);
}
