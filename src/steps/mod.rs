// src/steps/mod.rs

//! Concrete build steps and the static registry that names them.
//!
//! Every step is a plain function `fn(&BuildContext) -> Result<RunReport>`.
//! [`StepKind`] maps a name to its function at compile time; graph
//! construction goes through [`StepKind::step`], so there is no string-based
//! lookup that could fail at runtime.
//!
//! - [`clean`]: remove output and staging directories.
//! - [`styles`], [`scripts`], [`pages`]: compile sources into staging.
//! - [`assets`]: images, fonts and public extras straight into the output.
//! - [`postprocess`]: bundle build-comment references and minify staging
//!   into the output.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;

use crate::artifact::RunReport;
use crate::graph::Step;
use crate::orchestrator::BuildContext;

pub mod assets;
pub mod clean;
pub mod minify;
pub mod pages;
pub mod postprocess;
pub mod scripts;
pub mod styles;

pub type StepFn = fn(&BuildContext) -> Result<RunReport>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    Clean,
    Styles,
    Scripts,
    Pages,
    Images,
    Fonts,
    Extras,
    PostProcess,
    PurgeStaging,
}

impl StepKind {
    pub const ALL: [StepKind; 9] = [
        StepKind::Clean,
        StepKind::Styles,
        StepKind::Scripts,
        StepKind::Pages,
        StepKind::Images,
        StepKind::Fonts,
        StepKind::Extras,
        StepKind::PostProcess,
        StepKind::PurgeStaging,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StepKind::Clean => "clean",
            StepKind::Styles => "styles",
            StepKind::Scripts => "scripts",
            StepKind::Pages => "pages",
            StepKind::Images => "images",
            StepKind::Fonts => "fonts",
            StepKind::Extras => "extras",
            StepKind::PostProcess => "post-process",
            StepKind::PurgeStaging => "purge-staging",
        }
    }

    pub fn runner(self) -> StepFn {
        match self {
            StepKind::Clean => clean::clean,
            StepKind::Styles => styles::compile_styles,
            StepKind::Scripts => scripts::compile_scripts,
            StepKind::Pages => pages::render_pages,
            StepKind::Images => assets::optimize_images,
            StepKind::Fonts => assets::optimize_fonts,
            StepKind::Extras => assets::copy_extras,
            StepKind::PostProcess => postprocess::post_process,
            StepKind::PurgeStaging => clean::purge_staging,
        }
    }

    /// Bind this step to a build context.
    pub fn step(self, ctx: &Arc<BuildContext>) -> Step {
        let ctx = Arc::clone(ctx);
        let run = self.runner();
        Step::new(self.name(), move || run(&ctx))
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
