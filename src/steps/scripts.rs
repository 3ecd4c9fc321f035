// src/steps/scripts.rs

use anyhow::Result;

use crate::artifact::{dest, ArtifactSet, RunReport};
use crate::orchestrator::BuildContext;

/// Stage scripts matching `paths.scripts` into `temp`.
///
/// Scripts are staged as-is after a UTF-8 check; minification happens in
/// post-processing.
pub fn compile_scripts(ctx: &BuildContext) -> Result<RunReport> {
    let cfg = ctx.config();
    let mut report = RunReport::default();

    for record in ArtifactSet::source(ctx.fs(), &cfg.src_dir(), &cfg.paths().scripts)? {
        let record = record?;
        record.text()?;
        report.push(dest(ctx.fs(), &cfg.temp_dir(), &record)?);
    }

    Ok(report)
}
