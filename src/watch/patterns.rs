// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::graph::GraphNode;

/// What a binding does when one of its files changes.
#[derive(Debug, Clone)]
pub enum BindingAction {
    /// Re-execute this graph node (coalesced, at most one in flight).
    Execute(Arc<GraphNode>),
    /// Only ask the preview server to reload.
    Reload,
}

/// Compiled patterns + base directory + action for one watch binding.
///
/// Patterns are relative to `base_dir`; the watcher passes base-relative
/// paths (e.g. `"assets/styles/main.scss"`) into `matches`.
#[derive(Clone)]
pub struct WatchBinding {
    name: String,
    base_dir: PathBuf,
    patterns: Vec<String>,
    set: GlobSet,
    action: BindingAction,
}

impl fmt::Debug for WatchBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchBinding")
            .field("name", &self.name)
            .field("base_dir", &self.base_dir)
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl WatchBinding {
    pub fn new(
        name: impl Into<String>,
        base_dir: &Path,
        patterns: &[&str],
        action: BindingAction,
    ) -> Result<Self> {
        let name = name.into();
        let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        let set = build_globset(&patterns)
            .with_context(|| format!("building globset for watch binding {name}"))?;

        Ok(Self {
            name,
            base_dir: base_dir.to_path_buf(),
            patterns,
            set,
            action,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn action(&self) -> &BindingAction {
        &self.action
    }

    pub fn is_reload_only(&self) -> bool {
        matches!(self.action, BindingAction::Reload)
    }

    /// Returns true if `rel_path` (relative to `base_dir`) belongs to this binding.
    pub fn matches(&self, rel_path: &str) -> bool {
        !rel_path.is_empty() && self.set.is_match(rel_path)
    }
}

/// Build a GlobSet where `*` does not cross `/`, matching how steps select
/// their sources.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
