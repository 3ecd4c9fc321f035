pub mod builders;
pub mod fake_server;
pub mod fake_steps;

use std::sync::Once;
use pageflow::logging::{build_filter, LOG_ENV_VAR};
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
/// - Honours the same `PAGEFLOW_LOG` directives as the binary.
///
/// Enable levels with e.g.:
/// `PAGEFLOW_LOG=pageflow=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let env_value = std::env::var(LOG_ENV_VAR).ok();
        let filter = build_filter(None, env_value.as_deref())
            .unwrap_or_else(|_| EnvFilter::new("warn,pageflow=info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}
