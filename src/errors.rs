// src/errors.rs

//! Crate-wide error taxonomy.
//!
//! - Configuration problems (`ConfigError`, `Io`, `Toml` while loading) are
//!   fatal and abort before any graph is built.
//! - Step failures never escape the executor as errors; they are captured as
//!   a [`StepFailure`] outcome and only become a `PageflowError` at the top
//!   level when `build`/`clean` report their result.
//! - `Filesystem` keeps the offending path next to the I/O error so `clean`
//!   can report exactly what it could not remove.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageflowError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Filesystem error at {path:?}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Step(#[from] StepFailure),

    #[error("Watch error: {0}")]
    Watch(String),

    #[error("Preview server error: {0}")]
    Server(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure of a single step, carried up through `Series`/`Parallel` nodes.
///
/// `step` is the name of the leaf that failed, so the top-level report
/// always points at the originating step even when the failure came from
/// deep inside a composed graph.
#[derive(Error, Debug)]
#[error("step '{step}' failed: {cause:#}")]
pub struct StepFailure {
    pub step: String,
    #[source]
    pub cause: anyhow::Error,
}

impl StepFailure {
    pub fn new(step: impl Into<String>, cause: anyhow::Error) -> Self {
        Self {
            step: step.into(),
            cause,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PageflowError>;
