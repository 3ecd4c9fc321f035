// src/config/validate.rs

use std::path::{Component, Path, PathBuf};

use globset::Glob;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{PageflowError, Result};

impl ConfigFile {
    /// Validate a raw config and freeze it, resolving directories against `root`.
    pub fn from_raw(raw: RawConfigFile, root: impl Into<PathBuf>) -> Result<Self> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw, root.into()))
    }
}

pub fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_dir_names(cfg)?;
    validate_layout(cfg)?;
    validate_patterns(cfg)?;
    validate_server(cfg)?;
    Ok(())
}

fn validate_dir_names(cfg: &RawConfigFile) -> Result<()> {
    let b = &cfg.build;
    for (key, value) in [
        ("src", &b.src),
        ("dist", &b.dist),
        ("temp", &b.temp),
        ("public", &b.public),
    ] {
        if value.trim().is_empty() {
            return Err(PageflowError::ConfigError(format!(
                "[build].{key} must not be empty"
            )));
        }
    }
    Ok(())
}

/// `dist` and `temp` are wiped by `clean` and written concurrently by
/// independent steps, so they must not alias each other or any input
/// directory, and must not live inside a watched input directory.
fn validate_layout(cfg: &RawConfigFile) -> Result<()> {
    let b = &cfg.build;
    let src = normalize(&b.src);
    let dist = normalize(&b.dist);
    let temp = normalize(&b.temp);
    let public = normalize(&b.public);

    if dist == temp {
        return Err(PageflowError::ConfigError(format!(
            "[build].dist and [build].temp must differ (both are '{}')",
            b.dist
        )));
    }

    for (out_key, out) in [("dist", &dist), ("temp", &temp)] {
        for (in_key, input) in [("src", &src), ("public", &public)] {
            if out == input {
                return Err(PageflowError::ConfigError(format!(
                    "[build].{out_key} must differ from [build].{in_key}"
                )));
            }
            if input.as_os_str().is_empty() || out.starts_with(input) {
                return Err(PageflowError::ConfigError(format!(
                    "[build].{out_key} must not be inside [build].{in_key}"
                )));
            }
        }
        if out.as_os_str().is_empty() {
            return Err(PageflowError::ConfigError(format!(
                "[build].{out_key} must not be the project root"
            )));
        }
    }

    Ok(())
}

fn validate_patterns(cfg: &RawConfigFile) -> Result<()> {
    for (name, pattern) in cfg.build.paths.named() {
        if pattern.trim().is_empty() {
            return Err(PageflowError::ConfigError(format!(
                "[build.paths].{name} must not be empty"
            )));
        }
        Glob::new(pattern).map_err(|e| {
            PageflowError::ConfigError(format!(
                "[build.paths].{name} is not a valid glob ('{pattern}'): {e}"
            ))
        })?;
    }
    Ok(())
}

fn validate_server(cfg: &RawConfigFile) -> Result<()> {
    if cfg.server.port == 0 {
        return Err(PageflowError::ConfigError(
            "[server].port must be >= 1 (got 0)".to_string(),
        ));
    }
    for prefix in cfg.server.routes.keys() {
        if !prefix.starts_with('/') {
            return Err(PageflowError::ConfigError(format!(
                "[server.routes] prefix '{prefix}' must start with '/'"
            )));
        }
    }
    Ok(())
}

/// Lexically normalise a relative directory name ("./dist/" -> "dist").
fn normalize(dir: &str) -> PathBuf {
    Path::new(dir.trim())
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
