// src/steps/assets.rs

//! Asset steps that write straight into the output directory.
//!
//! Images and fonts are passed through losslessly; public extras are copied
//! verbatim with the public directory as their base.

use std::path::Path;

use anyhow::Result;

use crate::artifact::{dest, ArtifactSet, RunReport};
use crate::fs::FileSystem;
use crate::orchestrator::BuildContext;

pub fn optimize_images(ctx: &BuildContext) -> Result<RunReport> {
    let cfg = ctx.config();
    copy_matching(ctx.fs(), &cfg.src_dir(), &cfg.paths().images, &cfg.dist_dir())
}

pub fn optimize_fonts(ctx: &BuildContext) -> Result<RunReport> {
    let cfg = ctx.config();
    copy_matching(ctx.fs(), &cfg.src_dir(), &cfg.paths().fonts, &cfg.dist_dir())
}

pub fn copy_extras(ctx: &BuildContext) -> Result<RunReport> {
    let cfg = ctx.config();
    let mut report = RunReport::default();
    for record in ArtifactSet::all(ctx.fs(), &cfg.public_dir()) {
        report.push(dest(ctx.fs(), &cfg.dist_dir(), &record?)?);
    }
    Ok(report)
}

fn copy_matching(fs: &dyn FileSystem, base: &Path, pattern: &str, out: &Path) -> Result<RunReport> {
    let mut report = RunReport::default();
    for record in ArtifactSet::source(fs, base, pattern)? {
        report.push(dest(fs, out, &record?)?);
    }
    Ok(report)
}
