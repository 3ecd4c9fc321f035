#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use pageflow::orchestrator::BuildContext;
use pageflow_test_utils::builders::ConfigFileBuilder;

pub use pageflow_test_utils::{init_tracing, with_timeout};

/// Real-filesystem context for a site rooted at `root` with default layout.
pub fn real_context(root: &Path) -> Arc<BuildContext> {
    BuildContext::real(ConfigFileBuilder::new(root).build())
}

/// Poll `cond` every 10ms until it holds (bounded by the caller's timeout).
pub async fn wait_until<F>(mut cond: F)
where
    F: FnMut() -> bool,
{
    while !cond() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
