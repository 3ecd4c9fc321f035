// src/lib.rs

pub mod artifact;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod graph;
pub mod logging;
pub mod orchestrator;
pub mod server;
pub mod steps;
pub mod types;
pub mod watch;

use std::sync::Arc;

use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::config::load_and_validate;
use crate::errors::Result;
use crate::graph::Outcome;
use crate::orchestrator::BuildContext;
use crate::server::StaticPreviewServer;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (a missing or invalid config is fatal)
/// - the build context over the real filesystem
/// - dispatch to `clean`, `build` or `dev`
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;
    debug!(root = ?cfg.root(), command = ?args.command, "configuration loaded");

    let ctx = BuildContext::real(cfg);

    match args.command {
        Command::Clean => report("clean", orchestrator::clean(&ctx).await),
        Command::Build => report("build", orchestrator::build(&ctx).await),
        Command::Dev => {
            let server = StaticPreviewServer::from_config(ctx.config());
            orchestrator::dev(Arc::clone(&ctx), server).await
        }
    }
}

fn report(command: &str, outcome: Outcome) -> Result<()> {
    let written = outcome?;
    info!(command, files = written.len(), "finished");
    Ok(())
}
