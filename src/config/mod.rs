// src/config/mod.rs

//! Configuration loading and validation for pageflow.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate the directory layout and patterns (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{config_root_dir, default_config_path, load_and_validate, load_from_path};
pub use model::{BuildSection, ConfigFile, PathPatterns, RawConfigFile, ServerSection};
pub use validate::validate_raw_config;
