// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::graph::execute;
use crate::server::PreviewServer;
use crate::watch::{BindingAction, WatchBinding};

use super::core::DevCore;
use super::{BindingId, CoreCommand, RuntimeEvent};

/// Drives [`DevCore`] in response to `RuntimeEvent`s, spawning executions
/// and forwarding reloads to the preview server.
///
/// This is a pure IO shell: every decision about when to run or reload is
/// made by the core.
pub struct Runtime<S: PreviewServer> {
    core: DevCore,
    bindings: Arc<Vec<WatchBinding>>,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    event_tx: mpsc::Sender<RuntimeEvent>,
    server: S,
}

impl<S: PreviewServer> fmt::Debug for Runtime<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("bindings", &self.bindings.len())
            .finish_non_exhaustive()
    }
}

impl<S: PreviewServer> Runtime<S> {
    /// `event_tx` must feed `event_rx`; finished executions report back
    /// through it.
    pub fn new(
        core: DevCore,
        bindings: Arc<Vec<WatchBinding>>,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        event_tx: mpsc::Sender<RuntimeEvent>,
        server: S,
    ) -> Self {
        Self {
            core,
            bindings,
            event_rx,
            event_tx,
            server,
        }
    }

    /// Main event loop.
    ///
    /// - Consumes `RuntimeEvent`s from `event_rx`.
    /// - Feeds them into the core.
    /// - Executes commands returned by the core (spawn executions, reload).
    pub async fn run(mut self) -> Result<()> {
        info!("dev runtime started");

        loop {
            let Some(event) = self.event_rx.recv().await else {
                info!("runtime event channel closed; exiting");
                break;
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command);
            }

            if !step.keep_running {
                info!("shutdown requested; stopping runtime");
                break;
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    fn execute_command(&mut self, command: CoreCommand) {
        match command {
            CoreCommand::Execute(binding) => self.spawn_execution(binding),
            CoreCommand::Reload => self.server.reload(),
        }
    }

    fn spawn_execution(&self, binding: BindingId) {
        let Some(node) = self.bindings.get(binding).and_then(|b| match b.action() {
            BindingAction::Execute(node) => Some(Arc::clone(node)),
            BindingAction::Reload => None,
        }) else {
            warn!(binding, "no graph node for binding; ignoring");
            return;
        };

        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let outcome = execute(node).await;
            if tx
                .send(RuntimeEvent::ExecutionFinished { binding, outcome })
                .await
                .is_err()
            {
                debug!(binding, "runtime gone before execution finished");
            }
        });
    }
}
