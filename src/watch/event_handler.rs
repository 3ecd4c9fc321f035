// src/watch/event_handler.rs

//! Event processing logic for file system changes.

use notify::{Event, EventKind};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::engine::RuntimeEvent;
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::WatchBinding;

/// Binding indices whose base directory contains `path` and whose patterns
/// match it.
pub fn matching_bindings(bindings: &[WatchBinding], path: &std::path::Path) -> Vec<(usize, String)> {
    bindings
        .iter()
        .enumerate()
        .filter_map(|(idx, binding)| {
            let rel = relative_str(binding.base_dir(), path)?;
            binding.matches(&rel).then_some((idx, rel))
        })
        .collect()
}

/// Forward one notify event to the runtime as per-binding `Changed` events.
///
/// Access-only events are ignored. Returns `false` once the runtime channel
/// is closed, telling the caller to stop its loop.
pub async fn process_event(
    bindings: &[WatchBinding],
    event: &Event,
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
) -> bool {
    if matches!(event.kind, EventKind::Access(_)) {
        return true;
    }

    for path in &event.paths {
        for (binding, rel) in matching_bindings(bindings, path) {
            debug!(
                binding = %bindings[binding].name(),
                path = %rel,
                "watch match -> change notification"
            );
            if let Err(err) = runtime_tx
                .send(RuntimeEvent::Changed { binding, path: rel })
                .await
            {
                warn!("failed to send RuntimeEvent::Changed: {err}");
                return false;
            }
        }
    }

    true
}
