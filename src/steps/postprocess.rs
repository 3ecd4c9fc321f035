// src/steps/postprocess.rs

//! Reference rewriting and minification from staging into the output.
//!
//! Every staged file is copied to `dist`. HTML pages are scanned for build
//! blocks:
//!
//! ```html
//! <!-- build:css assets/styles/vendor.css -->
//! <link rel="stylesheet" href="/node_modules/normalize.css/normalize.css">
//! <!-- endbuild -->
//! ```
//!
//! The referenced files are concatenated into `dist/assets/styles/vendor.css`
//! and the block is replaced with a single reference to the bundle. HTML,
//! CSS and JS outputs are then minified.

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use tracing::debug;

use crate::artifact::{dest, ArtifactSet, RunReport};
use crate::fs::FileSystem;
use crate::orchestrator::BuildContext;
use crate::steps::minify::minify;
use crate::types::ContentKind;

static BUILD_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--\s*build:(css|js)\s+(\S+?)\s*-->(.*?)<!--\s*endbuild\s*-->")
        .expect("valid regex")
});
static CSS_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href\s*=\s*["']([^"']+)["']"#).expect("valid regex"));
static JS_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"src\s*=\s*["']([^"']+)["']"#).expect("valid regex"));

/// A concatenated bundle produced from one build block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub kind: ContentKind,
    /// Output path relative to `dist`.
    pub relative: PathBuf,
    pub contents: String,
}

pub fn post_process(ctx: &BuildContext) -> Result<RunReport> {
    let cfg = ctx.config();
    let fs = ctx.fs();
    let dist = cfg.dist_dir();
    let search_path = [cfg.temp_dir(), cfg.root().to_path_buf()];
    let mut report = RunReport::default();

    for record in ArtifactSet::all(fs, &cfg.temp_dir()) {
        let record = record?;
        let kind = ContentKind::from_path(&record.relative);

        let record = match kind {
            ContentKind::Html => {
                let rel = record.relative_str();
                let (html, bundles) = rewrite_build_blocks(fs, record.text()?, &search_path)
                    .with_context(|| format!("processing build blocks in {rel}"))?;
                for bundle in bundles {
                    let target = dist.join(&bundle.relative);
                    fs.write(&target, minify(bundle.kind, &bundle.contents).as_bytes())?;
                    debug!(bundle = ?target, "wrote bundle");
                    if !report.written.contains(&target) {
                        report.push(target);
                    }
                }
                record.with_contents(minify(kind, &html))
            }
            ContentKind::Css | ContentKind::Js => {
                let text = minify(kind, record.text()?);
                record.with_contents(text)
            }
            ContentKind::Other => record,
        };

        let target = dest(fs, &dist, &record)?;
        if !report.written.contains(&target) {
            report.push(target);
        }
    }

    Ok(report)
}

/// Replace every build block in `html` with a reference to its bundle.
///
/// Returns the rewritten page and the bundles it references, in document
/// order.
pub fn rewrite_build_blocks(
    fs: &dyn FileSystem,
    html: &str,
    search_path: &[PathBuf],
) -> Result<(String, Vec<Bundle>)> {
    let mut out = String::with_capacity(html.len());
    let mut bundles = Vec::new();
    let mut last = 0;

    for caps in BUILD_BLOCK.captures_iter(html) {
        let whole = caps.get(0).expect("group 0 always matches");
        let target = &caps[2];
        let relative = bundle_target(target)?;
        let (kind, refs_re) = match &caps[1] {
            "css" => (ContentKind::Css, &*CSS_REF),
            _ => (ContentKind::Js, &*JS_REF),
        };

        let mut parts = Vec::new();
        for reference in refs_re.captures_iter(&caps[3]) {
            let reference = &reference[1];
            let file = resolve_reference(fs, reference, search_path)?;
            let bytes = fs.read(&file)?;
            let text = String::from_utf8(bytes)
                .map_err(|_| anyhow!("{reference} is not valid UTF-8"))?;
            parts.push(text);
        }

        let separator = if kind == ContentKind::Js { ";\n" } else { "\n" };
        bundles.push(Bundle {
            kind,
            relative,
            contents: parts.join(separator),
        });

        out.push_str(&html[last..whole.start()]);
        out.push_str(&match kind {
            ContentKind::Css => format!(r#"<link rel="stylesheet" href="{target}">"#),
            _ => format!(r#"<script src="{target}"></script>"#),
        });
        last = whole.end();
    }

    out.push_str(&html[last..]);
    Ok((out, bundles))
}

/// Bundle paths are relative to `dist` and may not climb out of it.
fn bundle_target(target: &str) -> Result<PathBuf> {
    let relative = PathBuf::from(target.trim_start_matches('/'));
    let inside = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !inside || relative.as_os_str().is_empty() {
        bail!("bundle target '{target}' must stay inside the output directory");
    }
    Ok(relative)
}

/// Find a referenced file in the first search directory that has it.
fn resolve_reference(fs: &dyn FileSystem, reference: &str, search_path: &[PathBuf]) -> Result<PathBuf> {
    let clean = reference
        .split(['?', '#'])
        .next()
        .unwrap_or(reference)
        .trim_start_matches('/');
    let rel = Path::new(clean);

    search_path
        .iter()
        .map(|dir| dir.join(rel))
        .find(|candidate| fs.is_file(candidate))
        .ok_or_else(|| anyhow!("unresolved reference '{reference}' (searched {search_path:?})"))
}
