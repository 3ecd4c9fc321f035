// src/watch/watcher.rs

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::RuntimeEvent;
use crate::errors::{PageflowError, Result};
use crate::watch::event_handler::process_event;
use crate::watch::patterns::WatchBinding;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    watched: Vec<PathBuf>,
}

impl WatcherHandle {
    /// Directories actually being watched (bindings with missing base
    /// directories are skipped).
    pub fn watched_dirs(&self) -> &[PathBuf] {
        &self.watched
    }
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("watched", &self.watched)
            .finish_non_exhaustive()
    }
}

/// Spawn a filesystem watcher over every binding's base directory and send
/// `RuntimeEvent::Changed` for each binding whose patterns match a changed
/// path.
///
/// - Failing to create the watcher is fatal.
/// - A base directory that does not exist (or cannot be watched) is skipped
///   with a warning; the remaining bindings keep working.
/// - Errors reported for individual events are logged and do not stop the
///   event loop.
pub fn spawn_watcher(
    bindings: Arc<Vec<WatchBinding>>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            // The receiver only disappears during shutdown.
            let _ = event_tx.send(res);
        },
        Config::default(),
    )
    .map_err(|e| PageflowError::Watch(format!("creating file watcher: {e}")))?;

    let base_dirs: BTreeSet<PathBuf> = bindings.iter().map(|b| b.base_dir().to_path_buf()).collect();
    let mut watched = Vec::new();
    for dir in base_dirs {
        if !dir.is_dir() {
            warn!(dir = ?dir, "watch base directory does not exist; skipping");
            continue;
        }
        match watcher.watch(&dir, RecursiveMode::Recursive) {
            Ok(()) => {
                info!("file watcher started on {:?}", dir);
                watched.push(dir);
            }
            Err(err) => warn!(dir = ?dir, error = %err, "failed to watch directory; skipping"),
        }
    }

    tokio::spawn(async move {
        while let Some(res) = event_rx.recv().await {
            match res {
                Ok(event) => {
                    debug!(?event, "received notify event");
                    if !process_event(&bindings, &event, &runtime_tx).await {
                        break;
                    }
                }
                Err(err) => warn!(error = %err, "file watch error"),
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle {
        _inner: watcher,
        watched,
    })
}
