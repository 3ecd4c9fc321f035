// src/steps/clean.rs

use std::io;
use std::path::Path;

use anyhow::Result;
use tracing::{debug, info};

use crate::artifact::RunReport;
use crate::errors::PageflowError;
use crate::fs::FileSystem;
use crate::orchestrator::BuildContext;

/// Remove the output and staging directories.
///
/// Idempotent: directories that do not exist are not an error.
pub fn clean(ctx: &BuildContext) -> Result<RunReport> {
    let cfg = ctx.config();
    remove_dir_if_present(ctx.fs(), &cfg.dist_dir())?;
    remove_dir_if_present(ctx.fs(), &cfg.temp_dir())?;
    Ok(RunReport::default())
}

/// Remove the staging directory once a build has succeeded.
pub fn purge_staging(ctx: &BuildContext) -> Result<RunReport> {
    remove_dir_if_present(ctx.fs(), &ctx.config().temp_dir())?;
    Ok(RunReport::default())
}

pub fn remove_dir_if_present(
    fs: &dyn FileSystem,
    dir: &Path,
) -> std::result::Result<(), PageflowError> {
    match fs.remove_dir_all(dir) {
        Ok(()) => {
            info!(dir = ?dir, "removed directory");
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(dir = ?dir, "directory not present; nothing to remove");
            Ok(())
        }
        Err(source) => Err(PageflowError::Filesystem {
            path: dir.to_path_buf(),
            source,
        }),
    }
}
