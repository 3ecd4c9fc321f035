// src/graph/executor.rs

//! Executor for task graphs.
//!
//! `execute` is stateless: everything it needs lives in the (immutable)
//! node it is given. Leaves run on Tokio's blocking pool because steps do
//! synchronous filesystem work; `Parallel` children are spawned as separate
//! Tokio tasks and joined in declaration order.

use std::collections::HashSet;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use tracing::{debug, error, info, warn};

use crate::artifact::RunReport;
use crate::errors::StepFailure;
use crate::graph::{GraphNode, Step};

/// Result of executing a node: the paths written, or the failure of the
/// originating step.
pub type Outcome = Result<RunReport, StepFailure>;

/// Execute a graph node.
///
/// - `Leaf`: run the step, mapping its error (or panic) to a [`StepFailure`].
/// - `Series`: run children in order; stop at the first failure and never
///   start the remaining children.
/// - `Parallel`: start every child, wait for all of them, and report the
///   failure of the lowest-index failed child (if any).
pub fn execute(node: Arc<GraphNode>) -> Pin<Box<dyn Future<Output = Outcome> + Send>> {
    Box::pin(async move {
        match &*node {
            GraphNode::Leaf(step) => run_leaf(step.clone()).await,
            GraphNode::Series(children) => run_series(children).await,
            GraphNode::Parallel(children) => run_parallel(children).await,
        }
    })
}

async fn run_leaf(step: Step) -> Outcome {
    let name = step.name().to_string();
    let started = Instant::now();
    info!(step = %name, "starting step");

    let joined = tokio::task::spawn_blocking(move || step.run()).await;

    let result = match joined {
        Ok(Ok(report)) => Ok(report),
        Ok(Err(cause)) => Err(StepFailure::new(&name, cause)),
        Err(join_err) => Err(StepFailure::new(
            &name,
            anyhow!("step task did not complete: {join_err}"),
        )),
    };

    match &result {
        Ok(report) => info!(
            step = %name,
            files = report.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "finished step"
        ),
        Err(failure) => error!(
            step = %name,
            error = %format!("{:#}", failure.cause),
            "step failed"
        ),
    }

    result
}

async fn run_series(children: &[Arc<GraphNode>]) -> Outcome {
    let mut report = RunReport::default();
    for (idx, child) in children.iter().enumerate() {
        match execute(Arc::clone(child)).await {
            Ok(child_report) => report.extend(child_report),
            Err(failure) => {
                let skipped = children.len() - idx - 1;
                if skipped > 0 {
                    debug!(
                        failed = %failure.step,
                        skipped,
                        "series stopped; remaining children not started"
                    );
                }
                return Err(failure);
            }
        }
    }
    Ok(report)
}

async fn run_parallel(children: &[Arc<GraphNode>]) -> Outcome {
    let handles: Vec<_> = children
        .iter()
        .map(|child| {
            let label = child.label();
            (label, tokio::spawn(execute(Arc::clone(child))))
        })
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    let mut first_failure: Option<StepFailure> = None;

    for (label, handle) in handles {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(join_err) => Err(StepFailure::new(
                label,
                anyhow!("parallel branch did not complete: {join_err}"),
            )),
        };

        match outcome {
            Ok(report) => reports.push(report),
            Err(failure) => {
                if first_failure.is_none() {
                    first_failure = Some(failure);
                } else {
                    debug!(
                        step = %failure.step,
                        "additional parallel failure (lower-index failure wins)"
                    );
                }
            }
        }
    }

    if let Some(failure) = first_failure {
        return Err(failure);
    }

    warn_on_overlapping_outputs(&reports);

    let mut merged = RunReport::default();
    for report in reports {
        merged.extend(report);
    }
    Ok(merged)
}

/// Concurrent siblings must write disjoint paths; report any overlap.
fn warn_on_overlapping_outputs(reports: &[RunReport]) {
    let mut seen: HashSet<&PathBuf> = HashSet::new();
    for report in reports {
        let own: HashSet<&PathBuf> = report.written.iter().collect();
        for path in own {
            if !seen.insert(path) {
                warn!(path = ?path, "path written by more than one parallel branch");
            }
        }
    }
}
