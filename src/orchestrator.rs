// src/orchestrator.rs

//! Fixed compositions behind the three commands.
//!
//! ```text
//! clean   = clean
//! compile = parallel(styles, scripts, pages)
//! build   = series(clean,
//!                  parallel(series(compile, post-process), images, fonts, extras),
//!                  [purge-staging])
//! dev     = series(compile, start watch bindings + preview server)
//! ```
//!
//! Graphs are built once from an immutable [`BuildContext`] and never
//! mutated afterwards. Concurrent branches write disjoint trees: `compile`
//! writes only staging, while images/fonts/extras write distinct source
//! patterns into the output directory.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::config::ConfigFile;
use crate::engine::{DevCore, Runtime, RuntimeEvent};
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::graph::{execute, leaf, parallel, series, GraphNode, Outcome};
use crate::server::PreviewServer;
use crate::steps::StepKind;
use crate::watch::{spawn_watcher, BindingAction, WatchBinding};

/// Everything a step may consult: the validated configuration and the
/// filesystem it should read and write through.
#[derive(Debug)]
pub struct BuildContext {
    config: ConfigFile,
    fs: Arc<dyn FileSystem>,
}

impl BuildContext {
    pub fn new(config: ConfigFile, fs: Arc<dyn FileSystem>) -> Arc<Self> {
        Arc::new(Self { config, fs })
    }

    /// Context backed by the real filesystem.
    pub fn real(config: ConfigFile) -> Arc<Self> {
        Self::new(config, Arc::new(RealFileSystem))
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }
}

fn step_node(ctx: &Arc<BuildContext>, kind: StepKind) -> Arc<GraphNode> {
    leaf(kind.step(ctx))
}

pub fn clean_graph(ctx: &Arc<BuildContext>) -> Arc<GraphNode> {
    step_node(ctx, StepKind::Clean)
}

pub fn compile_graph(ctx: &Arc<BuildContext>) -> Arc<GraphNode> {
    parallel([
        step_node(ctx, StepKind::Styles),
        step_node(ctx, StepKind::Scripts),
        step_node(ctx, StepKind::Pages),
    ])
}

pub fn build_graph(ctx: &Arc<BuildContext>) -> Arc<GraphNode> {
    let assemble = parallel([
        series([compile_graph(ctx), step_node(ctx, StepKind::PostProcess)]),
        step_node(ctx, StepKind::Images),
        step_node(ctx, StepKind::Fonts),
        step_node(ctx, StepKind::Extras),
    ]);

    let mut stages = vec![clean_graph(ctx), assemble];
    if ctx.config().purge_staging() {
        stages.push(step_node(ctx, StepKind::PurgeStaging));
    }
    series(stages)
}

pub async fn clean(ctx: &Arc<BuildContext>) -> Outcome {
    execute(clean_graph(ctx)).await
}

pub async fn build(ctx: &Arc<BuildContext>) -> Outcome {
    execute(build_graph(ctx)).await
}

/// Watch bindings registered by `dev`.
pub fn dev_bindings(ctx: &Arc<BuildContext>) -> Result<Vec<WatchBinding>> {
    let cfg = ctx.config();
    let paths = cfg.paths();
    let src = cfg.src_dir();

    Ok(vec![
        WatchBinding::new(
            "styles",
            &src,
            &[paths.styles.as_str()],
            BindingAction::Execute(step_node(ctx, StepKind::Styles)),
        )?,
        WatchBinding::new(
            "scripts",
            &src,
            &[paths.scripts.as_str()],
            BindingAction::Execute(step_node(ctx, StepKind::Scripts)),
        )?,
        WatchBinding::new(
            "pages",
            &src,
            &[paths.html.as_str()],
            BindingAction::Execute(step_node(ctx, StepKind::Pages)),
        )?,
        WatchBinding::new(
            "assets",
            &src,
            &[paths.images.as_str(), paths.fonts.as_str()],
            BindingAction::Reload,
        )?,
        WatchBinding::new("public", &cfg.public_dir(), &["**"], BindingAction::Reload)?,
    ])
}

/// `dev`: compile into staging, then watch and serve until Ctrl-C.
///
/// A failing initial compile ends `dev` before anything is watched, like any
/// other series whose first child fails.
pub async fn dev<S>(ctx: Arc<BuildContext>, server: S) -> Result<()>
where
    S: PreviewServer + 'static,
{
    execute(compile_graph(&ctx)).await?;
    start_watch_bindings_and_server(ctx, server).await
}

/// Register watch bindings, start the preview server and drive the dev
/// runtime. Returns only after a shutdown request.
pub async fn start_watch_bindings_and_server<S>(ctx: Arc<BuildContext>, mut server: S) -> Result<()>
where
    S: PreviewServer + 'static,
{
    let bindings = Arc::new(dev_bindings(&ctx)?);
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let _watcher_handle = spawn_watcher(Arc::clone(&bindings), rt_tx.clone())?;

    server.init()?;

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let names: Vec<&str> = bindings.iter().map(|b| b.name()).collect();
    info!(bindings = ?names, "watching for changes");

    let core = DevCore::from_bindings(&bindings);
    let runtime = Runtime::new(core, bindings, rt_rx, rt_tx, server);
    runtime.run().await
}
