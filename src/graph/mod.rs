// src/graph/mod.rs

//! Task graph: named steps composed with `series` / `parallel`.
//!
//! - [`Step`] is a named, idempotent unit of work.
//! - [`GraphNode`] is either a leaf step or an ordered (`Series`) / concurrent
//!   (`Parallel`) composition of child nodes.
//! - [`executor`] walks a node and produces a single [`executor::Outcome`].
//!
//! Nodes are immutable once built and shared through `Arc`, so the same
//! graph can be executed repeatedly (and concurrently on disjoint nodes)
//! without any locking.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;

use crate::artifact::RunReport;

pub mod executor;

pub use executor::{execute, Outcome};

type StepFn = dyn Fn() -> Result<RunReport> + Send + Sync;

/// A named unit of work.
///
/// The closure owns whatever context it needs (usually an
/// `Arc<BuildContext>`); it is invoked on the blocking thread pool.
#[derive(Clone)]
pub struct Step {
    name: String,
    run: Arc<StepFn>,
}

impl Step {
    pub fn new<F>(name: impl Into<String>, run: F) -> Self
    where
        F: Fn() -> Result<RunReport> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            run: Arc::new(run),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn run(&self) -> Result<RunReport> {
        (self.run)()
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum GraphNode {
    Leaf(Step),
    Series(Vec<Arc<GraphNode>>),
    Parallel(Vec<Arc<GraphNode>>),
}

impl GraphNode {
    /// Short label for logs: the step name, or `series[..]` / `parallel[..]`.
    pub fn label(&self) -> String {
        match self {
            GraphNode::Leaf(step) => step.name().to_string(),
            GraphNode::Series(children) => format!("series[{}]", join_labels(children)),
            GraphNode::Parallel(children) => format!("parallel[{}]", join_labels(children)),
        }
    }

    /// Names of every leaf step, in declaration order.
    pub fn step_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_step_names(&mut names);
        names
    }

    fn collect_step_names(&self, out: &mut Vec<String>) {
        match self {
            GraphNode::Leaf(step) => out.push(step.name().to_string()),
            GraphNode::Series(children) | GraphNode::Parallel(children) => {
                for child in children {
                    child.collect_step_names(out);
                }
            }
        }
    }
}

fn join_labels(children: &[Arc<GraphNode>]) -> String {
    children
        .iter()
        .map(|c| c.label())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn leaf(step: Step) -> Arc<GraphNode> {
    Arc::new(GraphNode::Leaf(step))
}

/// Children run strictly in order; the first failure stops the sequence.
pub fn series(children: impl IntoIterator<Item = Arc<GraphNode>>) -> Arc<GraphNode> {
    Arc::new(GraphNode::Series(children.into_iter().collect()))
}

/// Children all start concurrently; the node completes once every child has.
pub fn parallel(children: impl IntoIterator<Item = Arc<GraphNode>>) -> Arc<GraphNode> {
    Arc::new(GraphNode::Parallel(children.into_iter().collect()))
}
